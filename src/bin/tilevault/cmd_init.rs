use std::path::PathBuf;

use anyhow::Result;

use TileVault::consts::{META_KEY_SCHEMA_VERSION, SCHEMA_VERSION};
use TileVault::storage::MapStorage;

use crate::util::open_storage;

pub fn exec(db: PathBuf) -> Result<()> {
    // Opening runs the idempotent schema initialization.
    let storage = open_storage(db)?;
    let version = storage
        .storage_meta_get(META_KEY_SCHEMA_VERSION)?
        .unwrap_or_else(|| SCHEMA_VERSION.to_string());
    println!("ok: schema version {}", version);
    Ok(())
}
