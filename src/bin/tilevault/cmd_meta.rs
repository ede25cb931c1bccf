use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

use TileVault::storage::MapStorage;

use crate::util::open_storage;

pub fn exec_put(
    db: PathBuf,
    map: String,
    key: String,
    value: Option<String>,
    value_file: Option<PathBuf>,
) -> Result<()> {
    let bytes = match (value_file, value) {
        (Some(path), _) => std::fs::read(path)?,
        (None, Some(s)) => s.into_bytes(),
        (None, None) => return Err(anyhow!("either --value or --value-file is required")),
    };

    let storage = open_storage(db)?;
    storage.write_meta(&map, &key, &bytes)?;
    println!("ok: {} bytes", bytes.len());
    Ok(())
}

pub fn exec_get(db: PathBuf, map: String, key: String, out: Option<PathBuf>) -> Result<()> {
    let storage = open_storage(db)?;
    match storage.read_meta(&map, &key)? {
        Some(value) => {
            match out {
                Some(path) => std::fs::write(path, &value)?,
                None => std::io::stdout().write_all(&value)?,
            }
            Ok(())
        }
        None => Err(anyhow!("meta key not found")),
    }
}

pub fn exec_size(db: PathBuf, map: String, key: String) -> Result<()> {
    let storage = open_storage(db)?;
    match storage.read_meta_size(&map, &key)? {
        Some(size) => {
            println!("{}", size);
            Ok(())
        }
        None => Err(anyhow!("meta key not found")),
    }
}

pub fn exec_del(db: PathBuf, map: String, keys: Vec<String>) -> Result<()> {
    let storage = open_storage(db)?;
    let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    if refs.len() == 1 {
        storage.delete_meta(&map, refs[0])?;
    } else {
        storage.delete_meta_bulk(&map, &refs)?;
    }
    println!("ok: {} key(s)", refs.len());
    Ok(())
}

pub fn exec_rename(db: PathBuf, map: String, old_key: String, new_key: String) -> Result<()> {
    let storage = open_storage(db)?;
    storage.rename_meta(&map, &old_key, &new_key)?;
    println!("ok");
    Ok(())
}
