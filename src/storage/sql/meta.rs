//! Per-map metadata operations. Same contract shape as tiles: replace
//! semantics on (map, key), NotFound as `None`, unknown-map short circuit on
//! reads.

use crate::error::{Result, StorageError};
use crate::metrics;
use crate::sql::{SqlConnection, SqlDriver, SqlParam};

use super::SqlStorage;

pub(super) fn write_meta<D: SqlDriver>(
    s: &SqlStorage<D>,
    map_id: &str,
    key: &str,
    value: &[u8],
) -> Result<()> {
    let mut conn = s.pool.acquire()?;
    let map = s.maps.resolve_or_create(&mut *conn, s.dialect, map_id)?;
    conn.execute(
        s.dialect.write_meta(),
        &[
            SqlParam::I64(map),
            SqlParam::Text(key),
            SqlParam::Bytes(value),
        ],
    )?;
    metrics::record_meta_write();
    Ok(())
}

pub(super) fn read_meta<D: SqlDriver>(
    s: &SqlStorage<D>,
    map_id: &str,
    key: &str,
) -> Result<Option<Vec<u8>>> {
    let mut conn = s.pool.acquire()?;

    if s.maps
        .resolve_existing(&mut *conn, s.dialect, map_id)?
        .is_none()
    {
        return Ok(None);
    }

    let row = conn.query_row(
        s.dialect.read_meta(),
        &[SqlParam::Text(map_id), SqlParam::Text(key)],
    )?;
    match row {
        Some(mut row) => {
            if row.is_empty() {
                return Err(StorageError::Backend("empty meta row".into()));
            }
            metrics::record_meta_read();
            Ok(Some(row.swap_remove(0).into_bytes()?))
        }
        None => Ok(None),
    }
}

pub(super) fn read_meta_size<D: SqlDriver>(
    s: &SqlStorage<D>,
    map_id: &str,
    key: &str,
) -> Result<Option<u64>> {
    let mut conn = s.pool.acquire()?;

    if s.maps
        .resolve_existing(&mut *conn, s.dialect, map_id)?
        .is_none()
    {
        return Ok(None);
    }

    let row = conn.query_row(
        s.dialect.read_meta_size(),
        &[SqlParam::Text(map_id), SqlParam::Text(key)],
    )?;
    match row {
        Some(row) => {
            let size = row
                .first()
                .ok_or_else(|| StorageError::Backend("empty meta size row".into()))?
                .as_i64()?;
            Ok(Some(size.max(0) as u64))
        }
        None => Ok(None),
    }
}

pub(super) fn delete_meta<D: SqlDriver>(s: &SqlStorage<D>, map_id: &str, key: &str) -> Result<()> {
    let mut conn = s.pool.acquire()?;
    conn.execute(
        s.dialect.delete_meta(),
        &[SqlParam::Text(map_id), SqlParam::Text(key)],
    )?;
    metrics::record_meta_delete();
    Ok(())
}

pub(super) fn delete_meta_bulk<D: SqlDriver>(
    s: &SqlStorage<D>,
    map_id: &str,
    keys: &[&str],
) -> Result<()> {
    if keys.is_empty() {
        return Ok(());
    }
    let mut conn = s.pool.acquire()?;
    let sql = s.dialect.delete_meta_bulk(keys.len());
    let mut params = Vec::with_capacity(keys.len() + 1);
    params.push(SqlParam::Text(map_id));
    params.extend(keys.iter().map(|k| SqlParam::Text(k)));
    conn.execute(&sql, &params)?;
    metrics::record_meta_delete();
    Ok(())
}

pub(super) fn rename_meta<D: SqlDriver>(
    s: &SqlStorage<D>,
    map_id: &str,
    old_key: &str,
    new_key: &str,
) -> Result<()> {
    let mut conn = s.pool.acquire()?;
    conn.execute(
        s.dialect.update_map_meta(),
        &[
            SqlParam::Text(new_key),
            SqlParam::Text(map_id),
            SqlParam::Text(old_key),
        ],
    )?;
    Ok(())
}
