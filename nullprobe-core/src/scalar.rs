//! Single-value query execution.

use crate::source::QuerySource;
use thiserror::Error;

/// Why a scalar query produced no value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScalarError {
    /// The query returned zero rows
    #[error("sql: no rows in result set")]
    NoRows,
    /// Execution or scan failed; carries the driver's message
    #[error("{0}")]
    Query(String),
}

impl From<sqlx::Error> for ScalarError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::NoRows,
            other => Self::Query(other.to_string()),
        }
    }
}

/// Runs a query expected to return exactly one row and one column.
///
/// # Errors
/// [`ScalarError::NoRows`] for an empty result, [`ScalarError::Query`] for
/// everything else.
pub async fn run_scalar<S: QuerySource>(
    source: &mut S,
    query: &str,
) -> Result<Vec<u8>, ScalarError> {
    Ok(source.fetch_scalar(query).await?)
}
