use std::path::PathBuf;

use anyhow::Result;

use TileVault::config::TileVaultConfigBuilder;
use TileVault::sql::sqlite::SqliteDriver;
use TileVault::storage::sql::SqlStorage;

/// Open the SQLite-backed storage: env-derived config with the CLI-provided
/// database path on top.
pub fn open_storage(db: PathBuf) -> Result<SqlStorage<SqliteDriver>> {
    let cfg = TileVaultConfigBuilder::from_env_base().db_path(db).build();
    let storage = SqlStorage::open(SqliteDriver::new(&cfg.db_path), &cfg)?;
    Ok(storage)
}
