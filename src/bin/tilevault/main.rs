use anyhow::Result;
use clap::Parser;

mod cli;
mod util;
mod cmd_init;
mod cmd_tile;
mod cmd_meta;
mod cmd_purge;
mod cmd_maps;
mod cmd_status;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Init { db } => cmd_init::exec(db),

        cli::Cmd::PutTile {
            db,
            map,
            lod,
            x,
            z,
            compression,
            file,
        } => cmd_tile::exec_put(db, map, lod, x, z, compression, file),

        cli::Cmd::GetTile {
            db,
            map,
            lod,
            x,
            z,
            compression,
            out,
        } => cmd_tile::exec_get(db, map, lod, x, z, compression, out),

        cli::Cmd::TileInfo {
            db,
            map,
            lod,
            x,
            z,
            compression,
            json,
        } => cmd_tile::exec_info(db, map, lod, x, z, compression, json),

        cli::Cmd::DelTile { db, map, lod, x, z } => cmd_tile::exec_del(db, map, lod, x, z),

        cli::Cmd::PutMeta {
            db,
            map,
            key,
            value,
            value_file,
        } => cmd_meta::exec_put(db, map, key, value, value_file),

        cli::Cmd::GetMeta { db, map, key, out } => cmd_meta::exec_get(db, map, key, out),

        cli::Cmd::MetaSize { db, map, key } => cmd_meta::exec_size(db, map, key),

        cli::Cmd::DelMeta { db, map, keys } => cmd_meta::exec_del(db, map, keys),

        cli::Cmd::RenameMeta {
            db,
            map,
            old_key,
            new_key,
        } => cmd_meta::exec_rename(db, map, old_key, new_key),

        cli::Cmd::Purge { db, map, yes } => cmd_purge::exec(db, map, yes),

        cli::Cmd::Maps { db } => cmd_maps::exec(db),

        cli::Cmd::Status { db, json } => cmd_status::exec(db, json),
    }
}
