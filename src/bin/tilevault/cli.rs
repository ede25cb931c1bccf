use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for the TileVault storage engine
#[derive(Parser, Debug)]
#[command(name = "tilevault", version, about = "TileVault map-tile storage CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Initialize the storage schema (idempotent)
    Init {
        #[arg(long, default_value = "tilevault.db")]
        db: PathBuf,
    },
    /// Write one tile (payload from a file, compressed with --compression)
    PutTile {
        #[arg(long, default_value = "tilevault.db")]
        db: PathBuf,
        #[arg(long)]
        map: String,
        #[arg(long)]
        lod: u32,
        #[arg(long, allow_hyphen_values = true)]
        x: i32,
        #[arg(long, allow_hyphen_values = true)]
        z: i32,
        /// Codec name: none | gzip | zstd
        #[arg(long, default_value = "gzip")]
        compression: String,
        /// File with the raw (uncompressed) tile payload
        #[arg(long)]
        file: PathBuf,
    },
    /// Read one tile, decompress, write to --out (or stdout)
    GetTile {
        #[arg(long, default_value = "tilevault.db")]
        db: PathBuf,
        #[arg(long)]
        map: String,
        #[arg(long)]
        lod: u32,
        #[arg(long, allow_hyphen_values = true)]
        x: i32,
        #[arg(long, allow_hyphen_values = true)]
        z: i32,
        #[arg(long, default_value = "gzip")]
        compression: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Change time and stored size of one tile, without the payload
    TileInfo {
        #[arg(long, default_value = "tilevault.db")]
        db: PathBuf,
        #[arg(long)]
        map: String,
        #[arg(long)]
        lod: u32,
        #[arg(long, allow_hyphen_values = true)]
        x: i32,
        #[arg(long, allow_hyphen_values = true)]
        z: i32,
        #[arg(long, default_value = "gzip")]
        compression: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete one tile (no-op if absent)
    DelTile {
        #[arg(long, default_value = "tilevault.db")]
        db: PathBuf,
        #[arg(long)]
        map: String,
        #[arg(long)]
        lod: u32,
        #[arg(long, allow_hyphen_values = true)]
        x: i32,
        #[arg(long, allow_hyphen_values = true)]
        z: i32,
    },
    /// Write a per-map meta value (string or file)
    PutMeta {
        #[arg(long, default_value = "tilevault.db")]
        db: PathBuf,
        #[arg(long)]
        map: String,
        #[arg(long)]
        key: String,
        /// Value as a literal string (UTF-8). Ignored if --value-file is set.
        #[arg(long)]
        value: Option<String>,
        /// Read value bytes from a file
        #[arg(long)]
        value_file: Option<PathBuf>,
    },
    /// Read a per-map meta value
    GetMeta {
        #[arg(long, default_value = "tilevault.db")]
        db: PathBuf,
        #[arg(long)]
        map: String,
        #[arg(long)]
        key: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Byte length of a meta value, without the payload
    MetaSize {
        #[arg(long, default_value = "tilevault.db")]
        db: PathBuf,
        #[arg(long)]
        map: String,
        #[arg(long)]
        key: String,
    },
    /// Delete one or more meta keys of a map (single statement)
    DelMeta {
        #[arg(long, default_value = "tilevault.db")]
        db: PathBuf,
        #[arg(long)]
        map: String,
        #[arg(long, required = true, num_args = 1..)]
        keys: Vec<String>,
    },
    /// Rename a meta key within one map
    RenameMeta {
        #[arg(long, default_value = "tilevault.db")]
        db: PathBuf,
        #[arg(long)]
        map: String,
        #[arg(long)]
        old_key: String,
        #[arg(long)]
        new_key: String,
    },
    /// Remove all tiles, meta and the registry row of a map (irreversible)
    Purge {
        #[arg(long, default_value = "tilevault.db")]
        db: PathBuf,
        #[arg(long)]
        map: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// List all known map identifiers
    Maps {
        #[arg(long, default_value = "tilevault.db")]
        db: PathBuf,
    },
    /// Storage status (schema version, maps, process metrics)
    Status {
        #[arg(long, default_value = "tilevault.db")]
        db: PathBuf,
        #[arg(long)]
        json: bool,
    },
}
