//! Tile operations.
//!
//! Writes resolve both surrogate keys (creating registry rows on first use)
//! and rely on the dialect's single-statement replace semantics for per-tile
//! atomicity. Reads short-circuit to NotFound when either logical key was
//! never created — a map or codec that was never written can have no tiles,
//! so the tile table is not touched at all.

use log::trace;

use crate::error::{Result, StorageError};
use crate::metrics;
use crate::sql::{SqlConnection, SqlDriver, SqlParam};
use crate::storage::TileInfo;

use super::SqlStorage;

pub(super) fn write_tile<D: SqlDriver>(
    s: &SqlStorage<D>,
    map_id: &str,
    lod: u32,
    x: i32,
    z: i32,
    compression: &str,
    data: &[u8],
) -> Result<()> {
    let mut conn = s.pool.acquire()?;

    let map = s.maps.resolve_or_create(&mut *conn, s.dialect, map_id)?;
    let codec = s
        .compressions
        .resolve_or_create(&mut *conn, s.dialect, compression)?;

    conn.execute(
        s.dialect.write_map_tile(),
        &[
            SqlParam::I64(map),
            SqlParam::I64(lod as i64),
            SqlParam::I64(x as i64),
            SqlParam::I64(z as i64),
            SqlParam::I64(codec),
            SqlParam::Bytes(data),
        ],
    )?;

    metrics::record_tile_write(data.len());
    trace!(
        "wrote tile {}/{}/{}x{} ({} bytes, {})",
        map_id,
        lod,
        x,
        z,
        data.len(),
        compression
    );
    Ok(())
}

pub(super) fn read_tile<D: SqlDriver>(
    s: &SqlStorage<D>,
    map_id: &str,
    lod: u32,
    x: i32,
    z: i32,
    compression: &str,
) -> Result<Option<Vec<u8>>> {
    let mut conn = s.pool.acquire()?;

    if !registries_known(s, &mut *conn, map_id, compression)? {
        return Ok(None);
    }

    let row = conn.query_row(
        s.dialect.read_map_tile(),
        &[
            SqlParam::Text(map_id),
            SqlParam::I64(lod as i64),
            SqlParam::I64(x as i64),
            SqlParam::I64(z as i64),
            SqlParam::Text(compression),
        ],
    )?;

    match row {
        Some(mut row) => {
            if row.is_empty() {
                return Err(StorageError::Backend("empty tile row".into()));
            }
            let data = row.swap_remove(0).into_bytes()?;
            metrics::record_tile_read(data.len());
            Ok(Some(data))
        }
        None => Ok(None),
    }
}

pub(super) fn read_tile_info<D: SqlDriver>(
    s: &SqlStorage<D>,
    map_id: &str,
    lod: u32,
    x: i32,
    z: i32,
    compression: &str,
) -> Result<Option<TileInfo>> {
    let mut conn = s.pool.acquire()?;

    if !registries_known(s, &mut *conn, map_id, compression)? {
        return Ok(None);
    }

    let row = conn.query_row(
        s.dialect.read_map_tile_info(),
        &[
            SqlParam::Text(map_id),
            SqlParam::I64(lod as i64),
            SqlParam::I64(x as i64),
            SqlParam::I64(z as i64),
            SqlParam::Text(compression),
        ],
    )?;

    match row {
        Some(row) => {
            if row.len() < 2 {
                return Err(StorageError::Backend("short tile info row".into()));
            }
            Ok(Some(TileInfo {
                changed: row[0].as_i64()?.max(0) as u64,
                size: row[1].as_i64()?.max(0) as u64,
            }))
        }
        None => Ok(None),
    }
}

pub(super) fn delete_tile<D: SqlDriver>(
    s: &SqlStorage<D>,
    map_id: &str,
    lod: u32,
    x: i32,
    z: i32,
) -> Result<()> {
    let mut conn = s.pool.acquire()?;
    // Idempotent: an absent tile (or an unknown map) deletes zero rows.
    conn.execute(
        s.dialect.delete_map_tile(),
        &[
            SqlParam::Text(map_id),
            SqlParam::I64(lod as i64),
            SqlParam::I64(x as i64),
            SqlParam::I64(z as i64),
        ],
    )?;
    metrics::record_tile_delete();
    Ok(())
}

/// Both registry keys must exist for a tile row to exist (FK integrity).
fn registries_known<D: SqlDriver>(
    s: &SqlStorage<D>,
    conn: &mut <D as SqlDriver>::Conn,
    map_id: &str,
    compression: &str,
) -> Result<bool> {
    if s.maps
        .resolve_existing(conn, s.dialect, map_id)?
        .is_none()
    {
        return Ok(false);
    }
    if s.compressions
        .resolve_existing(conn, s.dialect, compression)?
        .is_none()
    {
        return Ok(false);
    }
    Ok(true)
}
