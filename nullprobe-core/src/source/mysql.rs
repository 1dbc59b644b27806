//! MySQL query source over a single sqlx connection.
//!
//! # Wire behaviour
//! - One `MySqlConnection`, no pool: one session, one query at a time
//! - Queries are sent as plain `&str` so sqlx uses the text protocol
//!   (COM_QUERY) rather than prepared statements; the bytes inspected are
//!   exactly the bytes the proxy forwarded
//! - sqlx's post-handshake `SET sql_mode, time_zone, NAMES` is disabled, so
//!   the session charset is the one the server negotiated
//! - Columns are read as raw bytes with `try_get_unchecked`, skipping type
//!   compatibility checks, so no decoding step can hide corruption

use super::{QuerySource, ReplicationStatus, VariablePair};
use crate::dsn::{redact_dsn, without_session_setup};
use crate::{Result, error::ProbeError};
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{ConnectOptions, Connection, Executor, FromRow, Row};
use tracing::{debug, trace};

/// Query source backed by one MySQL session.
pub struct MySqlSource {
    conn: MySqlConnection,
}

impl std::fmt::Debug for MySqlSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlSource").finish_non_exhaustive()
    }
}

impl MySqlSource {
    /// Opens a session described by `dsn` and pings it.
    ///
    /// # Errors
    /// Returns a configuration error for a malformed descriptor, or a
    /// connection error (with the driver's message) when the server cannot
    /// be reached or does not answer the ping.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let options = crate::dsn::parse_dsn(dsn)?;
        debug!("Connecting to {}", redact_dsn(dsn));
        Self::connect_with(&options).await
    }

    /// Opens a session from prepared options and pings it.
    ///
    /// # Errors
    /// Returns a connection error when connecting or pinging fails.
    pub async fn connect_with(options: &MySqlConnectOptions) -> Result<Self> {
        let conn = without_session_setup(options.clone())
            .connect()
            .await
            .map_err(|e| ProbeError::connection_failed("Connection failure", e))?;

        let mut source = Self { conn };
        if let Err(e) = source.ping().await {
            // best-effort release before the fatal error propagates
            let _ = source.conn.close().await;
            return Err(ProbeError::connection_failed("Ping failure", e));
        }

        Ok(source)
    }
}

/// Reads a column as raw bytes. NULL reads as empty.
fn column_bytes(row: &MySqlRow, index: usize) -> std::result::Result<Vec<u8>, sqlx::Error> {
    let value: Option<Vec<u8>> = row.try_get_unchecked(index)?;
    Ok(value.unwrap_or_default())
}

/// Reads a named column as raw bytes. A missing column or NULL reads as
/// empty.
fn named_column_bytes(row: &MySqlRow, column: &str) -> std::result::Result<Vec<u8>, sqlx::Error> {
    match row.try_get_unchecked::<Option<Vec<u8>>, _>(column) {
        Ok(value) => Ok(value.unwrap_or_default()),
        Err(sqlx::Error::ColumnNotFound(_)) => {
            trace!("Column {} not present in replication status", column);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

impl<'r> FromRow<'r, MySqlRow> for ReplicationStatus {
    fn from_row(row: &'r MySqlRow) -> std::result::Result<Self, sqlx::Error> {
        let mut status = Self::default();
        for (slot, (column, _)) in status.values_mut().into_iter().zip(Self::FIELDS) {
            *slot = named_column_bytes(row, column)?;
        }
        Ok(status)
    }
}

#[async_trait]
impl QuerySource for MySqlSource {
    async fn ping(&mut self) -> std::result::Result<(), sqlx::Error> {
        self.conn.ping().await
    }

    async fn fetch_pairs(
        &mut self,
        query: &str,
    ) -> std::result::Result<Vec<VariablePair>, sqlx::Error> {
        let rows = (&mut self.conn).fetch_all(query).await?;
        debug!("{} returned {} rows", query, rows.len());

        rows.iter()
            .map(|row| -> std::result::Result<VariablePair, sqlx::Error> {
                Ok(VariablePair {
                    name: column_bytes(row, 0)?,
                    value: column_bytes(row, 1)?,
                })
            })
            .collect()
    }

    async fn fetch_replication_status(
        &mut self,
        query: &str,
    ) -> std::result::Result<Vec<ReplicationStatus>, sqlx::Error> {
        let rows = (&mut self.conn).fetch_all(query).await?;
        debug!("{} returned {} rows", query, rows.len());

        rows.iter().map(ReplicationStatus::from_row).collect()
    }

    async fn fetch_scalar(&mut self, query: &str) -> std::result::Result<Vec<u8>, sqlx::Error> {
        let row = (&mut self.conn)
            .fetch_optional(query)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let value: Option<Vec<u8>> = row.try_get_unchecked(0)?;
        value.ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "0".to_string(),
            source: "converting NULL to string is unsupported".into(),
        })
    }

    async fn close(self) -> std::result::Result<(), sqlx::Error> {
        self.conn.close().await
    }
}
