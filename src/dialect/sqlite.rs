//! SQLite dialect: double-quote quoting, REPLACE INTO upsert, subquery
//! deletes (SQLite has no join-delete form). `changed` is stored as integer
//! epoch seconds so the read contract needs no conversion.

use super::Dialect;

pub struct SqliteDialect;

/// Singleton instance (dialects are stateless).
pub static SQLITE: SqliteDialect = SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn write_map_tile(&self) -> &'static str {
        "REPLACE INTO \"tilevault_map_tile\" (\"map\", \"lod\", \"x\", \"z\", \"compression\", \"data\") \
         VALUES (?, ?, ?, ?, ?, ?)"
    }

    fn read_map_tile(&self) -> &'static str {
        "SELECT t.\"data\" \
         FROM \"tilevault_map_tile\" t \
          INNER JOIN \"tilevault_map\" m \
           ON t.\"map\" = m.\"id\" \
          INNER JOIN \"tilevault_map_tile_compression\" c \
           ON t.\"compression\" = c.\"id\" \
         WHERE m.\"map_id\" = ? \
         AND t.\"lod\" = ? \
         AND t.\"x\" = ? \
         AND t.\"z\" = ? \
         AND c.\"compression\" = ?"
    }

    fn read_map_tile_info(&self) -> &'static str {
        "SELECT t.\"changed\", LENGTH(t.\"data\") \
         FROM \"tilevault_map_tile\" t \
          INNER JOIN \"tilevault_map\" m \
           ON t.\"map\" = m.\"id\" \
          INNER JOIN \"tilevault_map_tile_compression\" c \
           ON t.\"compression\" = c.\"id\" \
         WHERE m.\"map_id\" = ? \
         AND t.\"lod\" = ? \
         AND t.\"x\" = ? \
         AND t.\"z\" = ? \
         AND c.\"compression\" = ?"
    }

    fn delete_map_tile(&self) -> &'static str {
        "DELETE FROM \"tilevault_map_tile\" \
         WHERE \"map\" IN (SELECT \"id\" FROM \"tilevault_map\" WHERE \"map_id\" = ?) \
         AND \"lod\" = ? \
         AND \"x\" = ? \
         AND \"z\" = ?"
    }

    fn write_meta(&self) -> &'static str {
        "REPLACE INTO \"tilevault_map_meta\" (\"map\", \"key\", \"value\") \
         VALUES (?, ?, ?)"
    }

    fn read_meta(&self) -> &'static str {
        "SELECT t.\"value\" \
         FROM \"tilevault_map_meta\" t \
          INNER JOIN \"tilevault_map\" m \
           ON t.\"map\" = m.\"id\" \
         WHERE m.\"map_id\" = ? \
         AND t.\"key\" = ?"
    }

    fn read_meta_size(&self) -> &'static str {
        "SELECT LENGTH(t.\"value\") \
         FROM \"tilevault_map_meta\" t \
          INNER JOIN \"tilevault_map\" m \
           ON t.\"map\" = m.\"id\" \
         WHERE m.\"map_id\" = ? \
         AND t.\"key\" = ?"
    }

    fn delete_meta(&self) -> &'static str {
        "DELETE FROM \"tilevault_map_meta\" \
         WHERE \"map\" IN (SELECT \"id\" FROM \"tilevault_map\" WHERE \"map_id\" = ?) \
         AND \"key\" = ?"
    }

    fn update_map_meta(&self) -> &'static str {
        "UPDATE \"tilevault_map_meta\" \
         SET \"key\" = ? \
         WHERE \"map\" IN (SELECT \"id\" FROM \"tilevault_map\" WHERE \"map_id\" = ?) \
         AND \"key\" = ?"
    }

    fn delete_meta_bulk(&self, count: usize) -> String {
        let marks = vec!["?"; count.max(1)].join(", ");
        format!(
            "DELETE FROM \"tilevault_map_meta\" \
             WHERE \"map\" IN (SELECT \"id\" FROM \"tilevault_map\" WHERE \"map_id\" = ?) \
             AND \"key\" IN ({})",
            marks
        )
    }

    fn purge_map_tile(&self) -> &'static str {
        "DELETE FROM \"tilevault_map_tile\" \
         WHERE \"map\" IN (SELECT \"id\" FROM \"tilevault_map\" WHERE \"map_id\" = ?)"
    }

    fn purge_map_meta(&self) -> &'static str {
        "DELETE FROM \"tilevault_map_meta\" \
         WHERE \"map\" IN (SELECT \"id\" FROM \"tilevault_map\" WHERE \"map_id\" = ?)"
    }

    fn purge_map(&self) -> &'static str {
        "DELETE FROM \"tilevault_map\" WHERE \"map_id\" = ?"
    }

    fn select_map_ids(&self) -> &'static str {
        "SELECT \"map_id\" FROM \"tilevault_map\""
    }

    fn lookup_fk(&self, table: &str, id_column: &str, value_column: &str) -> String {
        format!(
            "SELECT \"{}\" FROM \"{}\" WHERE \"{}\" = ?",
            id_column, table, value_column
        )
    }

    fn insert_fk(&self, table: &str, value_column: &str) -> String {
        format!(
            "INSERT INTO \"{}\" (\"{}\") VALUES (?)",
            table, value_column
        )
    }

    fn initialize_storage_meta(&self) -> &'static str {
        "CREATE TABLE IF NOT EXISTS \"tilevault_storage_meta\" (\
         \"key\" TEXT NOT NULL, \
         \"value\" TEXT DEFAULT NULL, \
         PRIMARY KEY (\"key\")\
         )"
    }

    fn initialize_map(&self) -> &'static str {
        "CREATE TABLE IF NOT EXISTS \"tilevault_map\" (\
         \"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \
         \"map_id\" TEXT NOT NULL UNIQUE\
         )"
    }

    fn initialize_map_tile_compression(&self) -> &'static str {
        "CREATE TABLE IF NOT EXISTS \"tilevault_map_tile_compression\" (\
         \"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \
         \"compression\" TEXT NOT NULL UNIQUE\
         )"
    }

    fn initialize_map_meta(&self) -> &'static str {
        "CREATE TABLE IF NOT EXISTS \"tilevault_map_meta\" (\
         \"map\" INTEGER NOT NULL, \
         \"key\" TEXT NOT NULL, \
         \"value\" BLOB NOT NULL, \
         PRIMARY KEY (\"map\", \"key\"), \
         FOREIGN KEY (\"map\") REFERENCES \"tilevault_map\" (\"id\") \
          ON UPDATE RESTRICT ON DELETE RESTRICT\
         )"
    }

    fn initialize_map_tile(&self) -> &'static str {
        "CREATE TABLE IF NOT EXISTS \"tilevault_map_tile\" (\
         \"map\" INTEGER NOT NULL, \
         \"lod\" INTEGER NOT NULL, \
         \"x\" INTEGER NOT NULL, \
         \"z\" INTEGER NOT NULL, \
         \"compression\" INTEGER NOT NULL, \
         \"changed\" INTEGER NOT NULL DEFAULT (strftime('%s','now')), \
         \"data\" BLOB NOT NULL, \
         PRIMARY KEY (\"map\", \"lod\", \"x\", \"z\"), \
         FOREIGN KEY (\"map\") REFERENCES \"tilevault_map\" (\"id\") \
          ON UPDATE RESTRICT ON DELETE RESTRICT, \
         FOREIGN KEY (\"compression\") REFERENCES \"tilevault_map_tile_compression\" (\"id\") \
          ON UPDATE RESTRICT ON DELETE RESTRICT\
         )"
    }

    fn select_storage_meta(&self) -> &'static str {
        "SELECT \"value\" FROM \"tilevault_storage_meta\" WHERE \"key\" = ?"
    }

    fn insert_storage_meta(&self) -> &'static str {
        "INSERT INTO \"tilevault_storage_meta\" (\"key\", \"value\") VALUES (?, ?)"
    }

    fn update_storage_meta(&self) -> &'static str {
        "UPDATE \"tilevault_storage_meta\" SET \"value\" = ? WHERE \"key\" = ?"
    }
}
