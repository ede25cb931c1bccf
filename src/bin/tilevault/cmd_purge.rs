use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Result};

use TileVault::storage::MapStorage;

use crate::util::open_storage;

pub fn exec(db: PathBuf, map: String, yes: bool) -> Result<()> {
    if !yes {
        print!("purge ALL data of map '{}'? [y/N] ", map);
        std::io::stdout().flush()?;
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        if !matches!(line.trim(), "y" | "Y" | "yes") {
            return Err(anyhow!("aborted"));
        }
    }

    let storage = open_storage(db)?;
    storage.purge_map(&map)?;
    println!("ok: map '{}' purged", map);
    Ok(())
}
