//! storage — the tile/metadata storage contract and its SQL implementation.
//!
//! `MapStorage` is the backend-agnostic contract; `sql::SqlStorage` is the
//! relational implementation. A filesystem-based store would implement the
//! same trait.
//!
//! NotFound is a normal result (`None`), never an error. Backend failures
//! are not retried here; retry policy belongs to the caller.

pub mod sql;

use crate::error::Result;

/// Freshness data for one stored tile: server-assigned change time (epoch
/// seconds) and payload byte length. Lets callers check currency without
/// transferring the blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileInfo {
    pub changed: u64,
    pub size: u64,
}

/// Tile and per-map metadata storage, keyed by logical map identifiers.
/// Implementations must be safe under concurrent calls for the same or
/// different maps.
pub trait MapStorage: Send + Sync {
    /// Insert-or-replace one tile (last-writer-wins per coordinate). Creates
    /// map and compression registry rows on first use.
    fn write_tile(
        &self,
        map_id: &str,
        lod: u32,
        x: i32,
        z: i32,
        compression: &str,
        data: &[u8],
    ) -> Result<()>;

    /// Read one tile's payload. A map or codec name that was never written
    /// yields `None` without touching the tile table.
    fn read_tile(
        &self,
        map_id: &str,
        lod: u32,
        x: i32,
        z: i32,
        compression: &str,
    ) -> Result<Option<Vec<u8>>>;

    /// Read change time and byte length without transferring the payload.
    fn read_tile_info(
        &self,
        map_id: &str,
        lod: u32,
        x: i32,
        z: i32,
        compression: &str,
    ) -> Result<Option<TileInfo>>;

    /// Remove one tile. Deleting an absent tile is not an error.
    fn delete_tile(&self, map_id: &str, lod: u32, x: i32, z: i32) -> Result<()>;

    fn write_meta(&self, map_id: &str, key: &str, value: &[u8]) -> Result<()>;

    fn read_meta(&self, map_id: &str, key: &str) -> Result<Option<Vec<u8>>>;

    fn read_meta_size(&self, map_id: &str, key: &str) -> Result<Option<u64>>;

    fn delete_meta(&self, map_id: &str, key: &str) -> Result<()>;

    /// Delete several meta keys of one map in a single statement. Which keys
    /// to batch is the caller's decision.
    fn delete_meta_bulk(&self, map_id: &str, keys: &[&str]) -> Result<()>;

    /// Rename a meta key within one map.
    fn rename_meta(&self, map_id: &str, old_key: &str, new_key: &str) -> Result<()>;

    /// Remove all tiles, then all meta, then the map registry row itself.
    /// Each step is idempotent; if interrupted, re-invoking resumes safely.
    fn purge_map(&self, map_id: &str) -> Result<()>;

    /// All known logical map identifiers, order unspecified.
    fn list_map_ids(&self) -> Result<Vec<String>>;

    fn storage_meta_get(&self, key: &str) -> Result<Option<String>>;

    fn storage_meta_set(&self, key: &str, value: &str) -> Result<()>;
}
