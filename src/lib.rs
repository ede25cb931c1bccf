#![allow(non_snake_case)]

// Base modules
pub mod consts;
pub mod error;
pub mod config;
pub mod metrics;

// Producer-side codec helpers (the engine itself only stores codec names)
pub mod compression;

// Storage stack
pub mod dialect; // src/dialect/{mod,mysql,sqlite,postgres}.rs
pub mod sql;     // src/sql/{mod,sqlite,pool}.rs
pub mod storage; // src/storage/{mod,sql/*}.rs

// Web front door (static files + live API + not-found fallback)
pub mod web;     // src/web/{mod,static_files,live}.rs

// Convenience re-exports
pub use error::StorageError;
pub use config::TileVaultConfig;
pub use dialect::{Dialect, MYSQL, POSTGRES, SQLITE};
pub use storage::{MapStorage, TileInfo};
pub use storage::sql::SqlStorage;
pub use sql::sqlite::SqliteDriver;
