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

#[test]
fn meta_roundtrip_and_replace() {
    let db = unique_db("meta");
    let storage = open(&db);

    storage
        .write_meta("overworld", "settings", b"{\"a\":1}")
        .expect("write");
    let back = storage
        .read_meta("overworld", "settings")
        .expect("read")
        .expect("exists");
    assert_eq!(back, b"{\"a\":1}");

    // Replace on same (map, key)
    storage
        .write_meta("overworld", "settings", b"{\"a\":2}")
        .expect("rewrite");
    let back = storage
        .read_meta("overworld", "settings")
        .expect("read")
        .expect("exists");
    assert_eq!(back, b"{\"a\":2}");
}

#[test]
fn meta_size_without_value() {
    let db = unique_db("msize");
    let storage = open(&db);

    storage
        .write_meta("overworld", "marker", b"0123456789")
        .expect("write");
    assert_eq!(
        storage
            .read_meta_size("overworld", "marker")
            .expect("size"),
        Some(10)
    );
    assert!(storage
        .read_meta_size("overworld", "absent")
        .expect("size")
        .is_none());
}

#[test]
fn meta_unknown_map_short_circuits() {
    let db = unique_db("munknown");
    let storage = open(&db);
    assert!(storage.read_meta("void", "k").expect("read").is_none());
    assert!(storage.read_meta_size("void", "k").expect("size").is_none());
    // Deleting under an unknown map is a no-op
    storage.delete_meta("void", "k").expect("del");
}

#[test]
fn meta_delete_single_and_bulk() {
    let db = unique_db("mdel");
    let storage = open(&db);

    for key in ["a", "b", "c", "keep"] {
        storage
            .write_meta("overworld", key, key.as_bytes())
            .expect("write");
    }

    storage.delete_meta("overworld", "a").expect("del single");
    assert!(storage.read_meta("overworld", "a").expect("read").is_none());

    storage
        .delete_meta_bulk("overworld", &["b", "c", "missing"])
        .expect("del bulk");
    assert!(storage.read_meta("overworld", "b").expect("read").is_none());
    assert!(storage.read_meta("overworld", "c").expect("read").is_none());
    let keep = storage
        .read_meta("overworld", "keep")
        .expect("read")
        .expect("survives");
    assert_eq!(keep, b"keep");

    // Empty key list is a no-op
    storage.delete_meta_bulk("overworld", &[]).expect("noop");
}

#[test]
fn meta_rename_is_map_scoped() {
    let db = unique_db("mrename");
    let storage = open(&db);

    storage
        .write_meta("overworld", "old", b"value")
        .expect("write a");
    storage
        .write_meta("nether", "old", b"other")
        .expect("write b");

    storage
        .rename_meta("overworld", "old", "new")
        .expect("rename");

    assert!(storage
        .read_meta("overworld", "old")
        .expect("read")
        .is_none());
    assert_eq!(
        storage
            .read_meta("overworld", "new")
            .expect("read")
            .expect("renamed"),
        b"value"
    );
    // The other map's key is untouched.
    assert_eq!(
        storage
            .read_meta("nether", "old")
            .expect("read")
            .expect("unaffected"),
        b"other"
    );
}
