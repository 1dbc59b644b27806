//! String validation for values returned through a proxy.
//!
//! All functions here are pure and total. They work on raw bytes (or `&str`
//! for the hostname filter) so that nothing is lost to a UTF-8 decoding step
//! before inspection.
//!
//! # Example
//! ```rust
//! use nullprobe_core::validation::{clean_hostname, count_nulls, hex_dump};
//!
//! assert_eq!(count_nulls(b"max\0scale"), 1);
//! assert_eq!(hex_dump(b"ab\0"), "61 62 00");
//! assert_eq!(clean_hostname("db-01.example.com:3306"), "db-01.example.com3306");
//! ```

use std::fmt::Write as _;

/// Returns true for bytes allowed in a cleaned hostname: `[0-9a-zA-Z\-_.]`.
const fn is_hostname_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.')
}

/// Strips every character outside `[0-9a-zA-Z\-_.]`, keeping the order of
/// the rest.
///
/// Non-ASCII characters are removed entirely, as are NUL and other control
/// characters. The result is always a valid display-safe identifier
/// (possibly empty).
pub fn clean_hostname(dirty: &str) -> String {
    dirty
        .bytes()
        .filter(|&b| is_hostname_byte(b))
        .map(char::from)
        .collect()
}

/// Counts NUL (`0x00`) bytes anywhere in `value`.
pub fn count_nulls(value: &[u8]) -> usize {
    value.iter().filter(|&&b| b == 0).count()
}

/// Byte offsets of every NUL in `value`, in ascending order.
pub fn null_offsets(value: &[u8]) -> Vec<usize> {
    value
        .iter()
        .enumerate()
        .filter_map(|(offset, &b)| (b == 0).then_some(offset))
        .collect()
}

/// Renders `value` as space separated lowercase hex pairs (`6d 61 78 00`).
pub fn hex_dump(value: &[u8]) -> String {
    let mut out = String::with_capacity(value.len().saturating_mul(3));
    for (i, byte) in value.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_count_nulls_clean_value() {
        assert_eq!(count_nulls(b"maxscale"), 0);
        assert_eq!(count_nulls(b""), 0);
    }

    #[test]
    fn test_count_nulls_embedded() {
        assert_eq!(count_nulls(b"max\0scale"), 1);
        assert_eq!(count_nulls(b"\0\0\0"), 3);
        assert_eq!(count_nulls(b"trailing\0"), 1);
    }

    #[test]
    fn test_null_offsets() {
        assert_eq!(null_offsets(b"max\0scale"), vec![3]);
        assert_eq!(null_offsets(b"\0a\0"), vec![0, 2]);
        assert!(null_offsets(b"clean").is_empty());
    }

    #[test]
    fn test_hex_dump() {
        assert_eq!(hex_dump(b"max\0scale"), "6d 61 78 00 73 63 61 6c 65");
        assert_eq!(hex_dump(b""), "");
        assert_eq!(hex_dump(&[0xff, 0x0a]), "ff 0a");
    }

    #[test]
    fn test_clean_hostname_keeps_allowed_characters() {
        assert_eq!(clean_hostname("db-01_replica.example.com"), "db-01_replica.example.com");
    }

    #[test]
    fn test_clean_hostname_strips_others() {
        assert_eq!(clean_hostname("db\u{0}01"), "db01");
        assert_eq!(clean_hostname("host name:3306/"), "hostname3306");
        assert_eq!(clean_hostname("hôte"), "hte");
        assert_eq!(clean_hostname(""), "");
        assert_eq!(clean_hostname("\0\0"), "");
    }

    proptest! {
        #[test]
        fn prop_count_matches_zero_bytes(value in proptest::collection::vec(any::<u8>(), 0..256)) {
            let expected = value.iter().filter(|b| **b == 0).count();
            prop_assert_eq!(count_nulls(&value), expected);
            prop_assert_eq!(null_offsets(&value).len(), expected);
        }

        #[test]
        fn prop_hex_dump_marks_nulls_at_offsets(value in proptest::collection::vec(any::<u8>(), 1..128)) {
            let dump = hex_dump(&value);
            let pairs: Vec<&str> = dump.split(' ').collect();
            prop_assert_eq!(pairs.len(), value.len());
            for offset in null_offsets(&value) {
                prop_assert_eq!(pairs[offset], "00");
            }
        }

        #[test]
        fn prop_clean_hostname_only_allowed(dirty in any::<String>()) {
            let clean = clean_hostname(&dirty);
            prop_assert!(clean.len() <= dirty.len());
            prop_assert!(clean.bytes().all(is_hostname_byte));
        }

        #[test]
        fn prop_clean_hostname_preserves_order(dirty in any::<String>()) {
            let clean = clean_hostname(&dirty);
            let expected: Vec<u8> = dirty.bytes().filter(|&b| is_hostname_byte(b)).collect();
            prop_assert_eq!(clean.as_bytes(), expected.as_slice());
        }

        #[test]
        fn prop_clean_hostname_idempotent(dirty in any::<String>()) {
            let once = clean_hostname(&dirty);
            prop_assert_eq!(clean_hostname(&once), once.clone());
        }
    }
}
