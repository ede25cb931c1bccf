use std::path::PathBuf;

use anyhow::Result;

use TileVault::consts::META_KEY_SCHEMA_VERSION;
use TileVault::metrics;
use TileVault::storage::MapStorage;

use crate::util::open_storage;

pub fn exec(db: PathBuf, json: bool) -> Result<()> {
    let storage = open_storage(db)?;
    let version = storage.storage_meta_get(META_KEY_SCHEMA_VERSION)?;
    let maps = storage.list_map_ids()?;
    let snap = metrics::snapshot();

    if json {
        let out = serde_json::json!({
            "schema_version": version,
            "maps": maps,
            "metrics": snap,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "schema version: {}",
            version.unwrap_or_else(|| "?".to_string())
        );
        println!("maps: {}", maps.len());
        for id in &maps {
            println!("  {}", id);
        }
    }
    Ok(())
}
