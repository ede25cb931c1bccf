use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use TileVault::config::TileVaultConfig;
use TileVault::{MapStorage, SqlStorage, SqliteDriver};

// Unique temp database files per test
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

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[test]
fn tile_write_read_roundtrip() {
    let db = unique_db("roundtrip");
    let storage = open(&db);

    let mut rng = oorandom::Rand32::new(0xdecafbad);
    for _ in 0..32 {
        let lod = rng.rand_range(0..8);
        let x = rng.rand_i32();
        let z = rng.rand_i32();
        let len = rng.rand_range(1..2048) as usize;
        let data: Vec<u8> = (0..len).map(|i| (i as u8).wrapping_mul(31)).collect();

        storage
            .write_tile("overworld", lod, x, z, "gzip", &data)
            .expect("write tile");
        let back = storage
            .read_tile("overworld", lod, x, z, "gzip")
            .expect("read tile")
            .expect("tile exists");
        assert_eq!(back, data);
    }
}

#[test]
fn second_write_replaces_first() {
    let db = unique_db("replace");
    let storage = open(&db);

    storage
        .write_tile("overworld", 0, 10, -10, "gzip", b"first")
        .expect("write 1");
    storage
        .write_tile("overworld", 0, 10, -10, "zstd", b"second")
        .expect("write 2");

    // Exactly one row, carrying the latest payload and codec.
    let back = storage
        .read_tile("overworld", 0, 10, -10, "zstd")
        .expect("read")
        .expect("exists");
    assert_eq!(back, b"second");

    // The old codec no longer matches the row.
    let stale = storage
        .read_tile("overworld", 0, 10, -10, "gzip")
        .expect("read stale");
    assert!(stale.is_none(), "replaced row must not match old codec");
}

#[test]
fn tile_info_without_blob() {
    let db = unique_db("info");
    let storage = open(&db);

    let before = now_secs();
    let data = vec![0xabu8; 1234];
    storage
        .write_tile("overworld", 2, 5, 7, "none", &data)
        .expect("write");

    let info = storage
        .read_tile_info("overworld", 2, 5, 7, "none")
        .expect("info")
        .expect("exists");
    assert_eq!(info.size, data.len() as u64);
    assert!(
        info.changed + 1 >= before,
        "changed {} predates write {}",
        info.changed,
        before
    );

    // Never-written coordinate under a known map/codec
    let missing = storage
        .read_tile_info("overworld", 2, 99, 99, "none")
        .expect("info miss");
    assert!(missing.is_none());
}

#[test]
fn unknown_keys_short_circuit() {
    let db = unique_db("unknown");
    let storage = open(&db);

    storage
        .write_tile("overworld", 0, 0, 0, "gzip", b"x")
        .expect("write");

    // Map never created
    assert!(storage
        .read_tile("nether", 0, 0, 0, "gzip")
        .expect("read")
        .is_none());
    // Codec never created
    assert!(storage
        .read_tile("overworld", 0, 0, 0, "brotli")
        .expect("read")
        .is_none());
    assert!(storage
        .read_tile_info("nether", 0, 0, 0, "gzip")
        .expect("info")
        .is_none());
}

#[test]
fn delete_tile_is_idempotent() {
    let db = unique_db("del");
    let storage = open(&db);

    storage
        .write_tile("overworld", 1, 2, 3, "gzip", b"payload")
        .expect("write");
    storage.delete_tile("overworld", 1, 2, 3).expect("del 1");
    storage.delete_tile("overworld", 1, 2, 3).expect("del 2");
    // Unknown map is not an error either
    storage.delete_tile("void", 1, 2, 3).expect("del unknown");

    assert!(storage
        .read_tile("overworld", 1, 2, 3, "gzip")
        .expect("read")
        .is_none());
}

#[test]
fn storage_meta_set_get_update() {
    let db = unique_db("smeta");
    let storage = open(&db);

    // schema_version written by initialization
    let version = storage
        .storage_meta_get("schema_version")
        .expect("get")
        .expect("initialized");
    assert_eq!(version, "1");

    assert!(storage.storage_meta_get("marker").expect("get").is_none());
    storage.storage_meta_set("marker", "a").expect("set");
    storage.storage_meta_set("marker", "b").expect("update");
    assert_eq!(
        storage.storage_meta_get("marker").expect("get").as_deref(),
        Some("b")
    );
}

#[test]
fn reopen_preserves_data() {
    let db = unique_db("reopen");
    {
        let storage = open(&db);
        storage
            .write_tile("overworld", 0, 1, 1, "gzip", b"persist")
            .expect("write");
    }

    // Fresh engine, cold caches, same file; initialization must be
    // idempotent and validate the recorded schema version.
    let storage = open(&db);
    let back = storage
        .read_tile("overworld", 0, 1, 1, "gzip")
        .expect("read")
        .expect("exists");
    assert_eq!(back, b"persist");
    assert_eq!(
        storage.list_map_ids().expect("list"),
        vec!["overworld".to_string()]
    );
}
