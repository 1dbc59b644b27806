//! Core library for nullprobe.
//!
//! nullprobe connects to a MySQL-compatible server, usually through a proxy
//! such as MaxScale, and checks that string results come back without
//! embedded NUL bytes. It exists to confirm a proxy forwards result columns
//! intact before that proxy is trusted by replication topology discovery.
//!
//! # Architecture
//! - `validation`: pure byte-level checks (null count, hex dump, hostname filter)
//! - `checks`: the ordered, data-driven probe plan
//! - `source`: the query seam and its sqlx MySQL implementation
//! - `probe`: the orchestrator that runs the plan and writes report lines
//!
//! # Guarantees
//! - Only `SHOW` and `SELECT` statements are issued
//! - Every query is attempted exactly once
//! - Passwords in the connection descriptor never reach logs or errors

pub mod checks;
pub mod config;
pub mod dsn;
pub mod error;
pub mod logging;
pub mod probe;
pub mod report;
pub mod scalar;
pub mod source;
pub mod validation;

// Re-export commonly used types
pub use checks::{Check, CheckShape, FailurePolicy, default_checks};
pub use config::{DsnSource, ProbeConfig};
pub use error::{ProbeError, Result};
pub use logging::init_logging;
pub use probe::Probe;
pub use report::{ProbeSummary, ValidationReport};
pub use scalar::{ScalarError, run_scalar};
pub use source::{MySqlSource, QuerySource, ReplicationStatus, VariablePair};
pub use validation::{clean_hostname, count_nulls, hex_dump};
