use std::path::PathBuf;

use anyhow::Result;

use TileVault::storage::MapStorage;

use crate::util::open_storage;

pub fn exec(db: PathBuf) -> Result<()> {
    let storage = open_storage(db)?;
    let mut ids = storage.list_map_ids()?;
    ids.sort();
    for id in ids {
        println!("{}", id);
    }
    Ok(())
}
