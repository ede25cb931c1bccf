//! rusqlite-backed driver.
//!
//! Connection setup: WAL journal mode and a busy timeout so concurrent
//! pooled connections on one database file wait instead of failing, and
//! foreign_keys=ON because SQLite leaves FK enforcement off by default
//! (the schema's RESTRICT semantics depend on it).

use std::path::PathBuf;
use std::time::Duration;

use rusqlite::Connection;

use crate::dialect::{Dialect, SQLITE};
use crate::error::{Result, StorageError};
use crate::sql::{SqlConnection, SqlDriver, SqlParam, SqlRow, SqlValue};

pub struct SqliteDriver {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteDriver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Duration::from_secs(5),
        }
    }

    pub fn busy_timeout(mut self, t: Duration) -> Self {
        self.busy_timeout = t;
        self
    }
}

impl SqlDriver for SqliteDriver {
    type Conn = SqliteConn;

    fn dialect(&self) -> &'static dyn Dialect {
        &SQLITE
    }

    fn connect(&self) -> Result<Self::Conn> {
        let conn = Connection::open(&self.path).map_err(map_err)?;
        conn.busy_timeout(self.busy_timeout).map_err(map_err)?;
        // journal_mode returns a result row, so pragma_update is not usable here
        conn.query_row("PRAGMA journal_mode=WAL", [], |_| Ok(()))
            .map_err(map_err)?;
        conn.pragma_update(None, "foreign_keys", true)
            .map_err(map_err)?;
        Ok(SqliteConn { conn })
    }
}

pub struct SqliteConn {
    conn: Connection,
}

impl SqlConnection for SqliteConn {
    fn execute(&mut self, sql: &str, params: &[SqlParam<'_>]) -> Result<usize> {
        self.conn
            .execute(sql, rusqlite::params_from_iter(params.iter().map(to_value)))
            .map_err(map_err)
    }

    fn query_row(&mut self, sql: &str, params: &[SqlParam<'_>]) -> Result<Option<SqlRow>> {
        let mut rows = self.query_all(sql, params)?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.swap_remove(0)))
        }
    }

    fn query_all(&mut self, sql: &str, params: &[SqlParam<'_>]) -> Result<Vec<SqlRow>> {
        let mut stmt = self.conn.prepare(sql).map_err(map_err)?;
        let ncols = stmt.column_count();
        let mut rows = stmt
            .query(rusqlite::params_from_iter(params.iter().map(to_value)))
            .map_err(map_err)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(map_err)? {
            let mut cells = Vec::with_capacity(ncols);
            for i in 0..ncols {
                let cell = match row.get_ref(i).map_err(map_err)? {
                    rusqlite::types::ValueRef::Null => SqlValue::Null,
                    rusqlite::types::ValueRef::Integer(v) => SqlValue::I64(v),
                    rusqlite::types::ValueRef::Real(v) => SqlValue::F64(v),
                    rusqlite::types::ValueRef::Text(t) => {
                        SqlValue::Text(String::from_utf8_lossy(t).into_owned())
                    }
                    rusqlite::types::ValueRef::Blob(b) => SqlValue::Bytes(b.to_vec()),
                };
                cells.push(cell);
            }
            out.push(cells);
        }
        Ok(out)
    }
}

fn to_value(p: &SqlParam<'_>) -> rusqlite::types::Value {
    match p {
        SqlParam::I64(v) => rusqlite::types::Value::Integer(*v),
        SqlParam::Text(s) => rusqlite::types::Value::Text((*s).to_string()),
        SqlParam::Bytes(b) => rusqlite::types::Value::Blob(b.to_vec()),
    }
}

// SQLITE_CONSTRAINT_UNIQUE / SQLITE_CONSTRAINT_PRIMARYKEY extended codes;
// only these mean "a concurrent writer won a creation race".
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;
const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;

fn map_err(e: rusqlite::Error) -> StorageError {
    if let rusqlite::Error::SqliteFailure(err, _) = &e {
        if err.extended_code == SQLITE_CONSTRAINT_UNIQUE
            || err.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY
        {
            return StorageError::Conflict;
        }
    }
    StorageError::Backend(e.to_string())
}
