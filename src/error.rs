//! Storage error taxonomy.
//!
//! NotFound is deliberately absent: a missing tile/meta/map key is a normal
//! result and is modeled as `Option::None` by the storage API. Transient
//! uniqueness conflicts (`Conflict`) are internal to the surrogate-key
//! resolution loop and never escape `SqlStorage`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// A uniqueness constraint rejected an insert (concurrent writer won a
    /// creation race). Resolved internally by re-lookup; callers only see
    /// this if the retry budget is exhausted.
    #[error("unique constraint conflict")]
    Conflict,

    /// Backend unreachable or statement execution failed. Not retried by the
    /// engine; retry policy belongs to the caller.
    #[error("backend error: {0}")]
    Backend(String),

    /// Schema initialization failed. Fatal at startup; the engine must not
    /// serve traffic with a partially-initialized schema.
    #[error("schema initialization failed: {0}")]
    Init(String),

    /// The connection pool did not yield a connection within its timeout.
    #[error("connection pool acquire timed out")]
    PoolTimeout,
}

pub type Result<T> = std::result::Result<T, StorageError>;
