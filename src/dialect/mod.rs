//! dialect — per-backend rendering of the fixed storage operation set.
//!
//! A Dialect produces parameterized statement text and nothing else: no I/O,
//! no state, no failures. The storage engine holds exactly one dialect chosen
//! at startup and never branches on backend type itself. All dialects expose
//! the same operation set with identical positional parameter order; only the
//! textual rendering differs (quoting, upsert form, join-delete form,
//! placeholder style).
//!
//! Submodules:
//! - mysql.rs    — backtick quoting, REPLACE INTO, join-deletes, `?` params
//! - sqlite.rs   — double-quote quoting, REPLACE INTO, subquery deletes
//! - postgres.rs — ON CONFLICT upserts, USING deletes, `$N` params

pub mod mysql;
pub mod postgres;
pub mod sqlite;

pub use mysql::{MySqlDialect, MYSQL};
pub use postgres::{PostgresDialect, POSTGRES};
pub use sqlite::{SqliteDialect, SQLITE};

/// Statement templates for every storage operation.
///
/// Parameter order is part of the contract and identical across dialects:
///
/// - `write_map_tile`:      map, lod, x, z, compression, data
/// - `read_map_tile`:       map_id, lod, x, z, compression_name
/// - `read_map_tile_info`:  map_id, lod, x, z, compression_name
/// - `delete_map_tile`:     map_id, lod, x, z
/// - `write_meta`:          map, key, value
/// - `read_meta`/`read_meta_size`/`delete_meta`: map_id, key
/// - `update_map_meta`:     new_key, map_id, old_key
/// - `delete_meta_bulk(n)`: map_id, then `n` keys
/// - `purge_map_tile`/`purge_map_meta`/`purge_map`: map_id
/// - `select_storage_meta`: key
/// - `insert_storage_meta`: key, value
/// - `update_storage_meta`: value, key
/// - `lookup_fk`:           value
/// - `insert_fk`:           value
///
/// The `changed` column always reads back as integer epoch seconds,
/// regardless of how the backend stores it.
pub trait Dialect: Send + Sync {
    /// Dialect name for logs.
    fn name(&self) -> &'static str;

    // ----- tiles -----
    fn write_map_tile(&self) -> &'static str;
    fn read_map_tile(&self) -> &'static str;
    fn read_map_tile_info(&self) -> &'static str;
    fn delete_map_tile(&self) -> &'static str;

    // ----- map meta -----
    fn write_meta(&self) -> &'static str;
    fn read_meta(&self) -> &'static str;
    fn read_meta_size(&self) -> &'static str;
    fn delete_meta(&self) -> &'static str;
    fn update_map_meta(&self) -> &'static str;

    /// Bulk meta delete by explicit key list; renders `count` key
    /// placeholders after the map-id placeholder. `count` must be >= 1.
    fn delete_meta_bulk(&self, count: usize) -> String;

    // ----- purge (caller must invoke in this exact order) -----
    fn purge_map_tile(&self) -> &'static str;
    fn purge_map_meta(&self) -> &'static str;
    fn purge_map(&self) -> &'static str;

    // ----- registries / listing -----
    fn select_map_ids(&self) -> &'static str;

    /// Generic surrogate-key lookup, parameterized over table/columns.
    /// Used for both the map and compression registries.
    fn lookup_fk(&self, table: &str, id_column: &str, value_column: &str) -> String;

    /// Generic surrogate-key insert; the backend assigns the id.
    fn insert_fk(&self, table: &str, value_column: &str) -> String;

    // ----- schema creation (idempotent, safe on an existing schema) -----
    fn initialize_storage_meta(&self) -> &'static str;
    fn initialize_map(&self) -> &'static str;
    fn initialize_map_tile_compression(&self) -> &'static str;
    fn initialize_map_meta(&self) -> &'static str;
    fn initialize_map_tile(&self) -> &'static str;

    // ----- storage meta -----
    fn select_storage_meta(&self) -> &'static str;
    fn insert_storage_meta(&self) -> &'static str;
    fn update_storage_meta(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> Vec<&'static dyn Dialect> {
        vec![&MYSQL, &SQLITE, &POSTGRES]
    }

    // Same operation set, same parameter counts, across every dialect.
    #[test]
    fn parameter_counts_agree() {
        for d in all() {
            let n = |sql: &str| count_params(d, sql);
            assert_eq!(n(d.write_map_tile()), 6, "{}", d.name());
            assert_eq!(n(d.read_map_tile()), 5, "{}", d.name());
            assert_eq!(n(d.read_map_tile_info()), 5, "{}", d.name());
            assert_eq!(n(d.delete_map_tile()), 4, "{}", d.name());
            assert_eq!(n(d.write_meta()), 3, "{}", d.name());
            assert_eq!(n(d.read_meta()), 2, "{}", d.name());
            assert_eq!(n(d.read_meta_size()), 2, "{}", d.name());
            assert_eq!(n(d.delete_meta()), 2, "{}", d.name());
            assert_eq!(n(d.update_map_meta()), 3, "{}", d.name());
            assert_eq!(n(&d.delete_meta_bulk(3)), 4, "{}", d.name());
            assert_eq!(n(d.purge_map_tile()), 1, "{}", d.name());
            assert_eq!(n(d.purge_map_meta()), 1, "{}", d.name());
            assert_eq!(n(d.purge_map()), 1, "{}", d.name());
            assert_eq!(n(d.select_map_ids()), 0, "{}", d.name());
            assert_eq!(n(&d.lookup_fk("t", "id", "v")), 1, "{}", d.name());
            assert_eq!(n(&d.insert_fk("t", "v")), 1, "{}", d.name());
            assert_eq!(n(d.select_storage_meta()), 1, "{}", d.name());
            assert_eq!(n(d.insert_storage_meta()), 2, "{}", d.name());
            assert_eq!(n(d.update_storage_meta()), 2, "{}", d.name());
        }
    }

    #[test]
    fn ddl_is_idempotent() {
        for d in all() {
            for ddl in [
                d.initialize_storage_meta(),
                d.initialize_map(),
                d.initialize_map_tile_compression(),
                d.initialize_map_meta(),
                d.initialize_map_tile(),
            ] {
                assert!(
                    ddl.contains("IF NOT EXISTS"),
                    "{}: not idempotent: {}",
                    d.name(),
                    ddl
                );
            }
        }
    }

    fn count_params(d: &dyn Dialect, sql: &str) -> usize {
        if d.name() == "postgres" {
            // Highest $N index, not occurrence count.
            let mut max = 0usize;
            let bytes = sql.as_bytes();
            let mut i = 0;
            while i < bytes.len() {
                if bytes[i] == b'$' {
                    let mut j = i + 1;
                    let mut n = 0usize;
                    while j < bytes.len() && bytes[j].is_ascii_digit() {
                        n = n * 10 + (bytes[j] - b'0') as usize;
                        j += 1;
                    }
                    if n > max {
                        max = n;
                    }
                    i = j;
                } else {
                    i += 1;
                }
            }
            max
        } else {
            sql.matches('?').count()
        }
    }
}
