//! sql — execution seam between the storage engine and a concrete driver.
//!
//! The engine speaks parameterized statement text (produced by a Dialect)
//! plus positional parameters; a driver turns that into real backend calls.
//! Only the SQLite driver ships, but the engine never touches rusqlite
//! directly, so a MySQL or Postgres driver plugs in behind `SqlDriver`
//! without changing engine logic.
//!
//! Submodules:
//! - sqlite.rs — rusqlite-backed driver (WAL, busy timeout, FK enforcement)
//! - pool.rs   — bounded connection pool with scoped RAII checkout

pub mod pool;
pub mod sqlite;

use crate::dialect::Dialect;
use crate::error::{Result, StorageError};

/// Positional statement parameter. Borrowed; drivers copy what they need.
#[derive(Debug, Clone, Copy)]
pub enum SqlParam<'a> {
    I64(i64),
    Text(&'a str),
    Bytes(&'a [u8]),
}

/// One result cell. Drivers map their native types onto this small set.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    I64(i64),
    F64(f64),
    Text(String),
    Bytes(Vec<u8>),
}

pub type SqlRow = Vec<SqlValue>;

impl SqlValue {
    pub fn as_i64(&self) -> Result<i64> {
        match self {
            SqlValue::I64(v) => Ok(*v),
            SqlValue::F64(v) => Ok(*v as i64),
            other => Err(StorageError::Backend(format!(
                "expected integer column, got {:?}",
                other
            ))),
        }
    }

    pub fn into_text(self) -> Result<String> {
        match self {
            SqlValue::Text(s) => Ok(s),
            other => Err(StorageError::Backend(format!(
                "expected text column, got {:?}",
                other
            ))),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            SqlValue::Bytes(b) => Ok(b),
            // Some backends hand small blobs back as text.
            SqlValue::Text(s) => Ok(s.into_bytes()),
            other => Err(StorageError::Backend(format!(
                "expected blob column, got {:?}",
                other
            ))),
        }
    }
}

/// One live backend connection. Implementations map their native error type
/// onto StorageError, reporting uniqueness violations as `Conflict` so the
/// surrogate-key resolution loop can retry them.
pub trait SqlConnection: Send {
    /// Execute a non-query statement; returns the affected row count.
    fn execute(&mut self, sql: &str, params: &[SqlParam<'_>]) -> Result<usize>;

    /// Execute a query expected to yield at most one row.
    fn query_row(&mut self, sql: &str, params: &[SqlParam<'_>]) -> Result<Option<SqlRow>>;

    /// Execute a query and collect every row.
    fn query_all(&mut self, sql: &str, params: &[SqlParam<'_>]) -> Result<Vec<SqlRow>>;
}

/// Factory for connections, paired with the dialect that renders statements
/// for this backend.
pub trait SqlDriver: Send + Sync + 'static {
    type Conn: SqlConnection;

    fn dialect(&self) -> &'static dyn Dialect;

    fn connect(&self) -> Result<Self::Conn>;
}
