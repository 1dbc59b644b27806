//! Report lines and run summary.
//!
//! Every named value that reaches the validator produces exactly one
//! [`ValidationReport`]; a check whose query fails produces one
//! [`ValidationReport::QueryFailed`] instead. The `Display` implementation is
//! the operator-facing line format.

use crate::validation::{count_nulls, hex_dump};
use std::borrow::Cow;
use std::fmt;

/// Classification of one named value, or of a failed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReport {
    /// The value contains no NUL bytes
    Ok {
        /// Field name
        name: String,
        /// Raw value
        value: Vec<u8>,
    },
    /// The value contains `count` NUL bytes
    Warning {
        /// Field name
        name: String,
        /// Raw value
        value: Vec<u8>,
        /// Number of NUL bytes
        count: usize,
    },
    /// The query behind `name` failed; `message` is the driver's text
    QueryFailed {
        /// Check name
        name: String,
        /// Driver error text
        message: String,
    },
}

impl ValidationReport {
    /// Runs the null-byte detector over `value` and classifies it.
    pub fn check(name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        let value = value.into();
        match count_nulls(&value) {
            0 => Self::Ok { name, value },
            count => Self::Warning { name, value, count },
        }
    }

    /// Report for a query that could not produce a value.
    pub fn query_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QueryFailed {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Field name the report is about
    pub fn name(&self) -> &str {
        match self {
            Self::Ok { name, .. } | Self::Warning { name, .. } | Self::QueryFailed { name, .. } => {
                name
            }
        }
    }

    /// Returns true for `OK` lines
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

/// Lossy text rendering of a raw value. NUL is kept as-is.
fn display_value(value: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(value)
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok { name, value } => {
                write!(f, "OK: {name} ('{}') has no nulls", display_value(value))
            }
            Self::Warning { name, value, count } => write!(
                f,
                "WARNING: {name} ('{}') has {count} nulls ({})",
                display_value(value),
                hex_dump(value)
            ),
            Self::QueryFailed { name, message } => {
                write!(f, "WARNING: {name} gave an error: '{message}'")
            }
        }
    }
}

/// Tally of report lines emitted during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeSummary {
    /// Values without nulls
    pub ok: usize,
    /// Values with one or more nulls
    pub warnings: usize,
    /// Checks whose query failed
    pub failed: usize,
}

impl ProbeSummary {
    /// Counts one report.
    pub fn record(&mut self, report: &ValidationReport) {
        match report {
            ValidationReport::Ok { .. } => self.ok = self.ok.saturating_add(1),
            ValidationReport::Warning { .. } => self.warnings = self.warnings.saturating_add(1),
            ValidationReport::QueryFailed { .. } => self.failed = self.failed.saturating_add(1),
        }
    }

    /// Total number of report lines
    pub const fn total(&self) -> usize {
        self.ok
            .saturating_add(self.warnings)
            .saturating_add(self.failed)
    }

    /// True when every line was `OK`
    pub const fn is_clean(&self) -> bool {
        self.warnings == 0 && self.failed == 0
    }
}
