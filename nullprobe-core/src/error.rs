//! Error types for fatal probe failures.
//!
//! Only failures that end the run are represented here. Per-check failures
//! (a scalar query returning no rows, a broken replication status query) are
//! reported as warning lines and never become a `ProbeError`.
//!
//! Driver errors are carried as the source and their text is part of the
//! displayed message, so the operator sees exactly what the driver said.
//! Connection descriptors are never included; callers pass a redacted form
//! as context when they need to name the target.

use thiserror::Error;

/// Main error type for nullprobe operations.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Opening or pinging the connection failed
    #[error("{context}: {source}")]
    Connection {
        /// Which step failed
        context: String,
        /// Driver error
        #[source]
        source: sqlx::Error,
    },

    /// A query whose failure aborts the run failed
    #[error("{context}: {source}")]
    Query {
        /// Name of the failed check
        context: String,
        /// Driver or scalar error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration or connection descriptor error
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is wrong
        message: String,
    },

    /// Writing the report failed
    #[error("I/O operation failed: {context}: {source}")]
    Io {
        /// What was being written
        context: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results with `ProbeError`
pub type Result<T> = std::result::Result<T, ProbeError>;

impl ProbeError {
    /// Creates a connection error with context
    pub fn connection_failed(context: impl Into<String>, error: sqlx::Error) -> Self {
        Self::Connection {
            context: context.into(),
            source: error,
        }
    }

    /// Creates a fatal query error with context
    pub fn query_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Query {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an I/O error for report output
    pub fn io(context: impl Into<String>, error: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source: error,
        }
    }
}
