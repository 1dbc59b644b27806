//! Query source abstraction over one database session.
//!
//! # Module Structure
//! - `mysql`: sqlx-backed implementation over a single `MySqlConnection`
//!
//! The orchestrator only needs "run this query and hand me the string
//! columns as raw bytes"; this trait is that seam. Errors stay the driver's
//! own `sqlx::Error` so that report lines can quote the driver verbatim.

pub mod mysql;

use async_trait::async_trait;

pub use mysql::MySqlSource;

/// One `(Variable_name, Value)` row of a variable scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariablePair {
    /// First column
    pub name: Vec<u8>,
    /// Second column
    pub value: Vec<u8>,
}

impl VariablePair {
    /// Creates a pair from anything byte-like.
    pub fn new(name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The replication status fields the probe inspects.
///
/// Populated by explicit column binding; a column the server does not
/// expose (MySQL has no `Using_Gtid`, MariaDB has no `Executed_Gtid_Set`)
/// or a NULL value binds as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplicationStatus {
    /// `Slave_IO_Running`
    pub slave_io_running: Vec<u8>,
    /// `Slave_SQL_Running`
    pub slave_sql_running: Vec<u8>,
    /// `Master_Log_File`
    pub master_log_file: Vec<u8>,
    /// `Relay_Master_Log_File`
    pub relay_master_log_file: Vec<u8>,
    /// `Relay_Log_File`
    pub relay_log_file: Vec<u8>,
    /// `Executed_Gtid_Set` (MySQL only)
    pub executed_gtid_set: Vec<u8>,
    /// `Using_Gtid` (MariaDB only)
    pub using_gtid: Vec<u8>,
    /// `Master_Host`
    pub master_host: Vec<u8>,
}

impl ReplicationStatus {
    /// `(result column, report label)` for each field, in report order.
    pub const FIELDS: [(&'static str, &'static str); 8] = [
        ("Slave_IO_Running", "Slave_IO_Running"),
        ("Slave_SQL_Running", "Slave_SQL_Running"),
        ("Master_Log_File", "Master_Log_File"),
        ("Relay_Master_Log_File", "Relay_Master_Log_File"),
        ("Relay_Log_File", "Relay_Log_File"),
        ("Executed_Gtid_Set", "Executed_Gtid_Set"),
        ("Using_Gtid", "UsingMariaDBGTID"),
        ("Master_Host", "Master_Host"),
    ];

    /// Field values in [`Self::FIELDS`] order.
    pub fn values(&self) -> [&[u8]; 8] {
        [
            self.slave_io_running.as_slice(),
            self.slave_sql_running.as_slice(),
            self.master_log_file.as_slice(),
            self.relay_master_log_file.as_slice(),
            self.relay_log_file.as_slice(),
            self.executed_gtid_set.as_slice(),
            self.using_gtid.as_slice(),
            self.master_host.as_slice(),
        ]
    }

    /// Mutable field slots in [`Self::FIELDS`] order.
    pub fn values_mut(&mut self) -> [&mut Vec<u8>; 8] {
        [
            &mut self.slave_io_running,
            &mut self.slave_sql_running,
            &mut self.master_log_file,
            &mut self.relay_master_log_file,
            &mut self.relay_log_file,
            &mut self.executed_gtid_set,
            &mut self.using_gtid,
            &mut self.master_host,
        ]
    }

    /// `(report label, value)` for each field, in report order.
    pub fn fields(&self) -> [(&'static str, &[u8]); 8] {
        let values = self.values();
        std::array::from_fn(|i| (Self::FIELDS[i].1, values[i]))
    }
}

/// A single exclusively-owned session that can answer the probe's queries.
///
/// Implementations issue each query exactly once; there is no retry.
#[async_trait]
pub trait QuerySource: Send + Sized {
    /// Verifies the session is alive.
    async fn ping(&mut self) -> Result<(), sqlx::Error>;

    /// Runs a two-column query and returns every row in server order.
    async fn fetch_pairs(&mut self, query: &str) -> Result<Vec<VariablePair>, sqlx::Error>;

    /// Runs a replication status query and binds every returned row.
    async fn fetch_replication_status(
        &mut self,
        query: &str,
    ) -> Result<Vec<ReplicationStatus>, sqlx::Error>;

    /// Runs a one-row one-column query.
    ///
    /// # Errors
    /// `sqlx::Error::RowNotFound` when the query returns no rows; any other
    /// error for execution or decoding failures (including a NULL value).
    async fn fetch_scalar(&mut self, query: &str) -> Result<Vec<u8>, sqlx::Error>;

    /// Releases the session.
    async fn close(self) -> Result<(), sqlx::Error>;
}
