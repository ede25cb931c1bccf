use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

use TileVault::compression::Compression;
use TileVault::storage::MapStorage;

use crate::util::open_storage;

fn codec(name: &str) -> Result<Compression> {
    Compression::from_name(name).ok_or_else(|| anyhow!("unknown compression '{}'", name))
}

pub fn exec_put(
    db: PathBuf,
    map: String,
    lod: u32,
    x: i32,
    z: i32,
    compression: String,
    file: PathBuf,
) -> Result<()> {
    let codec = codec(&compression)?;
    let raw = std::fs::read(&file)?;
    let packed = codec.compress(&raw)?;

    let storage = open_storage(db)?;
    storage.write_tile(&map, lod, x, z, codec.name(), &packed)?;
    println!(
        "ok: {}/{}/{}x{} ({} -> {} bytes, {})",
        map,
        lod,
        x,
        z,
        raw.len(),
        packed.len(),
        codec.name()
    );
    Ok(())
}

pub fn exec_get(
    db: PathBuf,
    map: String,
    lod: u32,
    x: i32,
    z: i32,
    compression: String,
    out: Option<PathBuf>,
) -> Result<()> {
    let codec = codec(&compression)?;
    let storage = open_storage(db)?;

    match storage.read_tile(&map, lod, x, z, codec.name())? {
        Some(packed) => {
            let raw = codec.decompress(&packed)?;
            match out {
                Some(path) => std::fs::write(path, &raw)?,
                None => std::io::stdout().write_all(&raw)?,
            }
            Ok(())
        }
        None => Err(anyhow!("tile not found")),
    }
}

pub fn exec_info(
    db: PathBuf,
    map: String,
    lod: u32,
    x: i32,
    z: i32,
    compression: String,
    json: bool,
) -> Result<()> {
    let codec = codec(&compression)?;
    let storage = open_storage(db)?;

    match storage.read_tile_info(&map, lod, x, z, codec.name())? {
        Some(info) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "changed": info.changed, "size": info.size })
                );
            } else {
                println!("changed: {}", info.changed);
                println!("size:    {}", info.size);
            }
            Ok(())
        }
        None => Err(anyhow!("tile not found")),
    }
}

pub fn exec_del(db: PathBuf, map: String, lod: u32, x: i32, z: i32) -> Result<()> {
    let storage = open_storage(db)?;
    storage.delete_tile(&map, lod, x, z)?;
    println!("ok");
    Ok(())
}
