use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use TileVault::config::TileVaultConfig;
use TileVault::{MapStorage, SqlStorage, SqliteDriver};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_db(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("tvtest-{prefix}-{pid}-{t}-{id}.db"))
}

fn open(db: &PathBuf) -> SqlStorage<SqliteDriver> {
    let cfg = TileVaultConfig::builder().db_path(db.clone()).build();
    SqlStorage::open(SqliteDriver::new(db), &cfg).expect("open storage")
}

fn seed_map(storage: &SqlStorage<SqliteDriver>, map: &str) {
    for i in 0..4 {
        storage
            .write_tile(map, 0, i, -i, "gzip", format!("tile-{i}").as_bytes())
            .expect("seed tile");
    }
    storage
        .write_meta(map, "settings", b"{}")
        .expect("seed meta");
    storage
        .write_meta(map, "marker", b"render-state")
        .expect("seed meta");
}

#[test]
fn purge_removes_tiles_meta_and_registry_row() {
    let db = unique_db("purge");
    let storage = open(&db);

    seed_map(&storage, "doomed");
    seed_map(&storage, "survivor");

    storage.purge_map("doomed").expect("purge");

    for i in 0..4 {
        assert!(storage
            .read_tile("doomed", 0, i, -i, "gzip")
            .expect("read")
            .is_none());
    }
    assert!(storage
        .read_meta("doomed", "settings")
        .expect("read")
        .is_none());

    let ids = storage.list_map_ids().expect("list");
    assert_eq!(ids, vec!["survivor".to_string()]);

    // The other map is untouched.
    assert!(storage
        .read_tile("survivor", 0, 1, -1, "gzip")
        .expect("read")
        .is_some());
}

#[test]
fn purge_is_idempotent_and_resumable() {
    let db = unique_db("repurge");
    let storage = open(&db);

    seed_map(&storage, "doomed");
    storage.purge_map("doomed").expect("purge 1");
    // Re-invoking after completion (or a hypothetical crash between steps)
    // must succeed and leave the same final state.
    storage.purge_map("doomed").expect("purge 2");
    assert!(storage.list_map_ids().expect("list").is_empty());
}

#[test]
fn map_can_be_recreated_after_purge() {
    let db = unique_db("recreate");
    let storage = open(&db);

    seed_map(&storage, "phoenix");
    storage.purge_map("phoenix").expect("purge");

    // A stale cached surrogate id here would dangle against the FK; the
    // purge must have evicted it so this write creates a fresh row.
    storage
        .write_tile("phoenix", 0, 0, 0, "gzip", b"reborn")
        .expect("write after purge");
    assert_eq!(
        storage
            .read_tile("phoenix", 0, 0, 0, "gzip")
            .expect("read")
            .expect("exists"),
        b"reborn"
    );
    assert_eq!(
        storage.list_map_ids().expect("list"),
        vec!["phoenix".to_string()]
    );
}
