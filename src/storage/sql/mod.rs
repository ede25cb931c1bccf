//! SQL implementation of the storage contract.
//!
//! Split by submodule:
//! - keys.rs  — surrogate-key registries (lookup-or-create + caches)
//! - tiles.rs — tile write/read/info/delete
//! - meta.rs  — per-map meta and storage-wide meta
//!
//! SqlStorage owns a bounded connection pool plus exactly one Dialect; every
//! operation checks out one connection for its duration and holds no locks
//! across calls. Per-tile atomicity is delegated to the backend's
//! single-statement replace semantics on the composite primary key.

pub mod keys;
pub mod meta;
pub mod tiles;

use std::time::Duration;

use log::{info, warn};

use crate::config::TileVaultConfig;
use crate::consts::{
    COMPRESSION_ID_COLUMN, COMPRESSION_VALUE_COLUMN, MAP_ID_COLUMN, MAP_VALUE_COLUMN,
    META_KEY_SCHEMA_VERSION, SCHEMA_VERSION, TABLE_MAP, TABLE_MAP_TILE_COMPRESSION,
};
use crate::dialect::Dialect;
use crate::error::{Result, StorageError};
use crate::metrics;
use crate::sql::pool::ConnectionPool;
use crate::sql::{SqlConnection, SqlDriver, SqlParam};
use crate::storage::MapStorage;

use keys::FkRegistry;

pub struct SqlStorage<D: SqlDriver> {
    pub(crate) pool: ConnectionPool<D>,
    pub(crate) dialect: &'static dyn Dialect,
    pub(crate) maps: FkRegistry,
    pub(crate) compressions: FkRegistry,
}

impl<D: SqlDriver> SqlStorage<D> {
    /// Open the storage engine: build the pool and run idempotent schema
    /// initialization. An initialization failure is fatal — the engine never
    /// serves traffic over a partially-initialized schema.
    pub fn open(driver: D, cfg: &TileVaultConfig) -> Result<Self> {
        let dialect = driver.dialect();
        let storage = Self {
            pool: ConnectionPool::new(
                driver,
                cfg.pool_size,
                Duration::from_millis(cfg.pool_timeout_ms),
            ),
            dialect,
            maps: FkRegistry::new(TABLE_MAP, MAP_ID_COLUMN, MAP_VALUE_COLUMN),
            compressions: FkRegistry::new(
                TABLE_MAP_TILE_COMPRESSION,
                COMPRESSION_ID_COLUMN,
                COMPRESSION_VALUE_COLUMN,
            ),
        };
        storage.initialize()?;
        info!("sql storage open (dialect={})", dialect.name());
        Ok(storage)
    }

    fn initialize(&self) -> Result<()> {
        let mut conn = self.pool.acquire()?;

        // Parents before children (tile/meta reference the registries).
        for ddl in [
            self.dialect.initialize_storage_meta(),
            self.dialect.initialize_map(),
            self.dialect.initialize_map_tile_compression(),
            self.dialect.initialize_map_meta(),
            self.dialect.initialize_map_tile(),
        ] {
            conn.execute(ddl, &[])
                .map_err(|e| StorageError::Init(e.to_string()))?;
        }

        match self.storage_meta_get_on(&mut *conn, META_KEY_SCHEMA_VERSION)? {
            None => {
                let version = SCHEMA_VERSION.to_string();
                conn.execute(
                    self.dialect.insert_storage_meta(),
                    &[
                        SqlParam::Text(META_KEY_SCHEMA_VERSION),
                        SqlParam::Text(&version),
                    ],
                )
                .map_err(|e| StorageError::Init(e.to_string()))?;
            }
            Some(v) => {
                let found: u32 = v
                    .parse()
                    .map_err(|_| StorageError::Init(format!("unreadable schema version '{}'", v)))?;
                if found != SCHEMA_VERSION {
                    return Err(StorageError::Init(format!(
                        "schema version mismatch: found {}, expected {}",
                        found, SCHEMA_VERSION
                    )));
                }
            }
        }

        Ok(())
    }

    fn storage_meta_get_on<C: SqlConnection>(
        &self,
        conn: &mut C,
        key: &str,
    ) -> Result<Option<String>> {
        match conn.query_row(self.dialect.select_storage_meta(), &[SqlParam::Text(key)])? {
            Some(mut row) => {
                if row.is_empty() {
                    return Err(StorageError::Backend("empty storage meta row".into()));
                }
                Ok(Some(row.swap_remove(0).into_text()?))
            }
            None => Ok(None),
        }
    }
}

impl<D: SqlDriver> MapStorage for SqlStorage<D> {
    fn write_tile(
        &self,
        map_id: &str,
        lod: u32,
        x: i32,
        z: i32,
        compression: &str,
        data: &[u8],
    ) -> Result<()> {
        tiles::write_tile(self, map_id, lod, x, z, compression, data)
    }

    fn read_tile(
        &self,
        map_id: &str,
        lod: u32,
        x: i32,
        z: i32,
        compression: &str,
    ) -> Result<Option<Vec<u8>>> {
        tiles::read_tile(self, map_id, lod, x, z, compression)
    }

    fn read_tile_info(
        &self,
        map_id: &str,
        lod: u32,
        x: i32,
        z: i32,
        compression: &str,
    ) -> Result<Option<crate::storage::TileInfo>> {
        tiles::read_tile_info(self, map_id, lod, x, z, compression)
    }

    fn delete_tile(&self, map_id: &str, lod: u32, x: i32, z: i32) -> Result<()> {
        tiles::delete_tile(self, map_id, lod, x, z)
    }

    fn write_meta(&self, map_id: &str, key: &str, value: &[u8]) -> Result<()> {
        meta::write_meta(self, map_id, key, value)
    }

    fn read_meta(&self, map_id: &str, key: &str) -> Result<Option<Vec<u8>>> {
        meta::read_meta(self, map_id, key)
    }

    fn read_meta_size(&self, map_id: &str, key: &str) -> Result<Option<u64>> {
        meta::read_meta_size(self, map_id, key)
    }

    fn delete_meta(&self, map_id: &str, key: &str) -> Result<()> {
        meta::delete_meta(self, map_id, key)
    }

    fn delete_meta_bulk(&self, map_id: &str, keys: &[&str]) -> Result<()> {
        meta::delete_meta_bulk(self, map_id, keys)
    }

    fn rename_meta(&self, map_id: &str, old_key: &str, new_key: &str) -> Result<()> {
        meta::rename_meta(self, map_id, old_key, new_key)
    }

    /// Three deletes in fixed order: tiles, meta, map row. The RESTRICT
    /// foreign keys make any other order fail, and each step is idempotent,
    /// so a crash between steps leaves a consistent state that a re-invoked
    /// purge finishes. No multi-statement transaction is assumed.
    fn purge_map(&self, map_id: &str) -> Result<()> {
        let mut conn = self.pool.acquire()?;

        let tiles = conn.execute(self.dialect.purge_map_tile(), &[SqlParam::Text(map_id)])?;
        let metas = conn.execute(self.dialect.purge_map_meta(), &[SqlParam::Text(map_id)])?;
        let rows = conn.execute(self.dialect.purge_map(), &[SqlParam::Text(map_id)])?;

        // The registry row is gone; a stale cached id would dangle.
        self.maps.evict(map_id);

        if rows > 0 {
            metrics::record_map_purge();
            info!(
                "purged map '{}' ({} tiles, {} meta rows)",
                map_id, tiles, metas
            );
        } else {
            warn!("purge of unknown map '{}' (no registry row)", map_id);
        }
        Ok(())
    }

    fn list_map_ids(&self) -> Result<Vec<String>> {
        let mut conn = self.pool.acquire()?;
        let rows = conn.query_all(self.dialect.select_map_ids(), &[])?;
        let mut ids = Vec::with_capacity(rows.len());
        for mut row in rows {
            if row.is_empty() {
                return Err(StorageError::Backend("empty map id row".into()));
            }
            ids.push(row.swap_remove(0).into_text()?);
        }
        Ok(ids)
    }

    fn storage_meta_get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.pool.acquire()?;
        self.storage_meta_get_on(&mut *conn, key)
    }

    fn storage_meta_set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.pool.acquire()?;
        let updated = conn.execute(
            self.dialect.update_storage_meta(),
            &[SqlParam::Text(value), SqlParam::Text(key)],
        )?;
        if updated == 0 {
            match conn.execute(
                self.dialect.insert_storage_meta(),
                &[SqlParam::Text(key), SqlParam::Text(value)],
            ) {
                Ok(_) => {}
                // Concurrent writer inserted the key first; overwrite it.
                Err(StorageError::Conflict) => {
                    conn.execute(
                        self.dialect.update_storage_meta(),
                        &[SqlParam::Text(value), SqlParam::Text(key)],
                    )?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
