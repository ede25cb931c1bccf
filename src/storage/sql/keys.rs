//! Surrogate-key resolution for the map and compression registries.
//!
//! Algorithm (the concurrency-critical part of the engine): lookup; if
//! absent, insert; if the insert hits a uniqueness conflict a concurrent
//! writer won the race, so re-lookup. Bounded retry — the loop must converge
//! to the single existing row, never duplicate it and never surface the
//! conflict to callers. The resolved id is published to the cache only after
//! the backend confirmed the row, never speculatively.

use std::collections::HashMap;
use std::sync::RwLock;

use log::{debug, warn};

use crate::consts::FK_RESOLVE_MAX_RETRIES;
use crate::dialect::Dialect;
use crate::error::{Result, StorageError};
use crate::metrics;
use crate::sql::{SqlConnection, SqlParam};

/// Name -> surrogate id cache for one registry table. Shared by all engine
/// operations; read-mostly.
pub(crate) struct FkRegistry {
    table: &'static str,
    id_column: &'static str,
    value_column: &'static str,
    cache: RwLock<HashMap<String, i64>>,
}

impl FkRegistry {
    pub(crate) fn new(
        table: &'static str,
        id_column: &'static str,
        value_column: &'static str,
    ) -> Self {
        Self {
            table,
            id_column,
            value_column,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn cached(&self, value: &str) -> Option<i64> {
        let id = self
            .cache
            .read()
            .ok()
            .and_then(|c| c.get(value).copied());
        if id.is_some() {
            metrics::record_fk_cache_hit();
        }
        id
    }

    fn publish(&self, value: &str, id: i64) {
        if let Ok(mut c) = self.cache.write() {
            c.insert(value.to_string(), id);
        }
    }

    /// Drop a cached mapping (after purge removed the registry row).
    pub(crate) fn evict(&self, value: &str) {
        if let Ok(mut c) = self.cache.write() {
            c.remove(value);
        }
    }

    fn lookup<C: SqlConnection>(
        &self,
        conn: &mut C,
        dialect: &dyn Dialect,
        value: &str,
    ) -> Result<Option<i64>> {
        let sql = dialect.lookup_fk(self.table, self.id_column, self.value_column);
        match conn.query_row(&sql, &[SqlParam::Text(value)])? {
            Some(row) => {
                let id = row
                    .first()
                    .ok_or_else(|| {
                        StorageError::Backend(format!("empty row from {} lookup", self.table))
                    })?
                    .as_i64()?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    /// Resolve without creating: cache, then registry lookup. Used by read
    /// paths so an unknown key short-circuits to NotFound.
    pub(crate) fn resolve_existing<C: SqlConnection>(
        &self,
        conn: &mut C,
        dialect: &dyn Dialect,
        value: &str,
    ) -> Result<Option<i64>> {
        if let Some(id) = self.cached(value) {
            return Ok(Some(id));
        }
        metrics::record_fk_cache_miss();
        let found = self.lookup(conn, dialect, value)?;
        if let Some(id) = found {
            self.publish(value, id);
        }
        Ok(found)
    }

    /// Resolve, creating the registry row on first use.
    pub(crate) fn resolve_or_create<C: SqlConnection>(
        &self,
        conn: &mut C,
        dialect: &dyn Dialect,
        value: &str,
    ) -> Result<i64> {
        if let Some(id) = self.cached(value) {
            return Ok(id);
        }
        metrics::record_fk_cache_miss();

        for attempt in 0..FK_RESOLVE_MAX_RETRIES {
            if let Some(id) = self.lookup(conn, dialect, value)? {
                self.publish(value, id);
                return Ok(id);
            }

            let insert = dialect.insert_fk(self.table, self.value_column);
            match conn.execute(&insert, &[SqlParam::Text(value)]) {
                Ok(_) => {
                    debug!("created {} row for '{}'", self.table, value);
                    // Re-lookup instead of trusting driver-specific
                    // last-insert-id; also covers a racing delete.
                }
                Err(StorageError::Conflict) => {
                    // Concurrent writer created the row between our lookup
                    // and insert; the next lookup finds it.
                    metrics::record_fk_conflict_retry();
                    debug!(
                        "creation race on {} '{}' (attempt {})",
                        self.table,
                        value,
                        attempt + 1
                    );
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            "surrogate-key resolution for {} '{}' did not converge after {} attempts",
            self.table, value, FK_RESOLVE_MAX_RETRIES
        );
        Err(StorageError::Conflict)
    }
}
