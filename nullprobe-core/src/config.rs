//! Probe configuration.
//!
//! The connection descriptor comes from the `MYSQL_DSN` environment
//! variable, falling back to a documented default. Everything else is set
//! explicitly by the caller; there is no process-wide mutable state.

use crate::{Result, error::ProbeError};
use std::env;

/// Environment variable holding the connection descriptor
pub const DSN_ENV_VAR: &str = "MYSQL_DSN";

/// Descriptor used when `MYSQL_DSN` is unset or empty
pub const DEFAULT_DSN: &str = "user:host@tcp(127.0.0.1:3306)/mydb";

/// Variable name pattern matching MaxScale's server variables
pub const DEFAULT_VARIABLE_PATTERN: &str = "maxscale%";

/// Where the connection descriptor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DsnSource {
    /// Read from `MYSQL_DSN`
    Environment,
    /// `DEFAULT_DSN`
    Default,
}

/// Configuration for one probe run.
///
/// # Example
/// ```rust
/// use nullprobe_core::config::{DsnSource, ProbeConfig};
///
/// let config = ProbeConfig::new("probe:secret@tcp(proxy:4006)/", DsnSource::Environment)
///     .with_verbose(1)
///     .with_variable_pattern("maxscale%");
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Connection descriptor (may contain a password, never log it raw)
    pub dsn: String,
    /// Where `dsn` came from
    pub dsn_source: DsnSource,
    /// Verbosity level (0=INFO, 1=DEBUG, 2+=TRACE)
    pub verbose: u8,
    /// `LIKE` pattern for the proxy variable scan
    pub variable_pattern: String,
}

impl std::fmt::Debug for ProbeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeConfig")
            .field("dsn", &crate::dsn::redact_dsn(&self.dsn))
            .field("dsn_source", &self.dsn_source)
            .field("verbose", &self.verbose)
            .field("variable_pattern", &self.variable_pattern)
            .finish()
    }
}

impl ProbeConfig {
    /// Creates a configuration with default verbosity and variable pattern.
    pub fn new(dsn: impl Into<String>, dsn_source: DsnSource) -> Self {
        Self {
            dsn: dsn.into(),
            dsn_source,
            verbose: 0,
            variable_pattern: DEFAULT_VARIABLE_PATTERN.to_string(),
        }
    }

    /// Reads the descriptor from `MYSQL_DSN`, falling back to `DEFAULT_DSN`.
    pub fn from_env() -> Self {
        let (dsn, source) = resolve_dsn(env::var(DSN_ENV_VAR).ok());
        Self::new(dsn, source)
    }

    /// Builder method to set verbosity.
    pub const fn with_verbose(mut self, verbose: u8) -> Self {
        self.verbose = verbose;
        self
    }

    /// Builder method to set the variable scan pattern.
    pub fn with_variable_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.variable_pattern = pattern.into();
        self
    }

    /// Line announcing which descriptor is in use, printed before any query.
    pub fn dsn_announcement(&self) -> String {
        match self.dsn_source {
            DsnSource::Environment => {
                format!("Using dsn defined in environment variable {DSN_ENV_VAR}")
            }
            DsnSource::Default => {
                format!("Using default dsn {}", crate::dsn::redact_dsn(&self.dsn))
            }
        }
    }

    /// Validates configuration values.
    ///
    /// # Errors
    /// Returns error if the descriptor is empty or the variable pattern
    /// could break out of its quoted `LIKE` literal.
    pub fn validate(&self) -> Result<()> {
        if self.dsn.trim().is_empty() {
            return Err(ProbeError::configuration("dsn cannot be empty"));
        }

        if self.variable_pattern.is_empty() {
            return Err(ProbeError::configuration(
                "variable pattern cannot be empty",
            ));
        }

        if self
            .variable_pattern
            .chars()
            .any(|c| matches!(c, '\'' | '"' | '\\' | ';'))
        {
            return Err(ProbeError::configuration(
                "variable pattern contains invalid characters",
            ));
        }

        Ok(())
    }
}

/// Picks the descriptor to use given the value of `MYSQL_DSN`.
///
/// An unset or empty variable selects `DEFAULT_DSN`.
pub fn resolve_dsn(env_value: Option<String>) -> (String, DsnSource) {
    match env_value {
        Some(dsn) if !dsn.is_empty() => (dsn, DsnSource::Environment),
        _ => (DEFAULT_DSN.to_string(), DsnSource::Default),
    }
}
