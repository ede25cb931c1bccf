//! MySQL-family dialect: backtick quoting, REPLACE INTO upsert, join-deletes.

use super::Dialect;

pub struct MySqlDialect;

/// Singleton instance (dialects are stateless).
pub static MYSQL: MySqlDialect = MySqlDialect;

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn write_map_tile(&self) -> &'static str {
        "REPLACE INTO `tilevault_map_tile` (`map`, `lod`, `x`, `z`, `compression`, `data`) \
         VALUES (?, ?, ?, ?, ?, ?)"
    }

    fn read_map_tile(&self) -> &'static str {
        "SELECT t.`data` \
         FROM `tilevault_map_tile` t \
          INNER JOIN `tilevault_map` m \
           ON t.`map` = m.`id` \
          INNER JOIN `tilevault_map_tile_compression` c \
           ON t.`compression` = c.`id` \
         WHERE m.`map_id` = ? \
         AND t.`lod` = ? \
         AND t.`x` = ? \
         AND t.`z` = ? \
         AND c.`compression` = ?"
    }

    fn read_map_tile_info(&self) -> &'static str {
        "SELECT UNIX_TIMESTAMP(t.`changed`), LENGTH(t.`data`) \
         FROM `tilevault_map_tile` t \
          INNER JOIN `tilevault_map` m \
           ON t.`map` = m.`id` \
          INNER JOIN `tilevault_map_tile_compression` c \
           ON t.`compression` = c.`id` \
         WHERE m.`map_id` = ? \
         AND t.`lod` = ? \
         AND t.`x` = ? \
         AND t.`z` = ? \
         AND c.`compression` = ?"
    }

    fn delete_map_tile(&self) -> &'static str {
        "DELETE t \
         FROM `tilevault_map_tile` t \
          INNER JOIN `tilevault_map` m \
           ON t.`map` = m.`id` \
         WHERE m.`map_id` = ? \
         AND t.`lod` = ? \
         AND t.`x` = ? \
         AND t.`z` = ?"
    }

    fn write_meta(&self) -> &'static str {
        "REPLACE INTO `tilevault_map_meta` (`map`, `key`, `value`) \
         VALUES (?, ?, ?)"
    }

    fn read_meta(&self) -> &'static str {
        "SELECT t.`value` \
         FROM `tilevault_map_meta` t \
          INNER JOIN `tilevault_map` m \
           ON t.`map` = m.`id` \
         WHERE m.`map_id` = ? \
         AND t.`key` = ?"
    }

    fn read_meta_size(&self) -> &'static str {
        "SELECT LENGTH(t.`value`) \
         FROM `tilevault_map_meta` t \
          INNER JOIN `tilevault_map` m \
           ON t.`map` = m.`id` \
         WHERE m.`map_id` = ? \
         AND t.`key` = ?"
    }

    fn delete_meta(&self) -> &'static str {
        "DELETE t \
         FROM `tilevault_map_meta` t \
          INNER JOIN `tilevault_map` m \
           ON t.`map` = m.`id` \
         WHERE m.`map_id` = ? \
         AND t.`key` = ?"
    }

    fn update_map_meta(&self) -> &'static str {
        "UPDATE `tilevault_map_meta` t \
          INNER JOIN `tilevault_map` m \
           ON t.`map` = m.`id` \
         SET t.`key` = ? \
         WHERE m.`map_id` = ? \
         AND t.`key` = ?"
    }

    fn delete_meta_bulk(&self, count: usize) -> String {
        let marks = vec!["?"; count.max(1)].join(", ");
        format!(
            "DELETE t \
             FROM `tilevault_map_meta` t \
              INNER JOIN `tilevault_map` m \
               ON t.`map` = m.`id` \
             WHERE m.`map_id` = ? \
             AND t.`key` IN ({})",
            marks
        )
    }

    fn purge_map_tile(&self) -> &'static str {
        "DELETE t \
         FROM `tilevault_map_tile` t \
          INNER JOIN `tilevault_map` m \
           ON t.`map` = m.`id` \
         WHERE m.`map_id` = ?"
    }

    fn purge_map_meta(&self) -> &'static str {
        "DELETE t \
         FROM `tilevault_map_meta` t \
          INNER JOIN `tilevault_map` m \
           ON t.`map` = m.`id` \
         WHERE m.`map_id` = ?"
    }

    fn purge_map(&self) -> &'static str {
        "DELETE \
         FROM `tilevault_map` \
         WHERE `map_id` = ?"
    }

    fn select_map_ids(&self) -> &'static str {
        "SELECT `map_id` FROM `tilevault_map`"
    }

    fn lookup_fk(&self, table: &str, id_column: &str, value_column: &str) -> String {
        format!(
            "SELECT `{}` FROM `{}` WHERE `{}` = ?",
            id_column, table, value_column
        )
    }

    fn insert_fk(&self, table: &str, value_column: &str) -> String {
        format!("INSERT INTO `{}` (`{}`) VALUES (?)", table, value_column)
    }

    fn initialize_storage_meta(&self) -> &'static str {
        "CREATE TABLE IF NOT EXISTS `tilevault_storage_meta` (\
         `key` VARCHAR(255) NOT NULL, \
         `value` VARCHAR(255) DEFAULT NULL, \
         PRIMARY KEY (`key`)\
         ) COLLATE 'utf8mb4_bin'"
    }

    fn initialize_map(&self) -> &'static str {
        "CREATE TABLE IF NOT EXISTS `tilevault_map` (\
         `id` SMALLINT UNSIGNED NOT NULL AUTO_INCREMENT, \
         `map_id` VARCHAR(255) NOT NULL, \
         PRIMARY KEY (`id`), \
         UNIQUE INDEX `map_id` (`map_id`)\
         ) COLLATE 'utf8mb4_bin'"
    }

    fn initialize_map_tile_compression(&self) -> &'static str {
        "CREATE TABLE IF NOT EXISTS `tilevault_map_tile_compression` (\
         `id` SMALLINT UNSIGNED NOT NULL AUTO_INCREMENT, \
         `compression` VARCHAR(255) NOT NULL, \
         PRIMARY KEY (`id`), \
         UNIQUE INDEX `compression` (`compression`)\
         ) COLLATE 'utf8mb4_bin'"
    }

    fn initialize_map_meta(&self) -> &'static str {
        "CREATE TABLE IF NOT EXISTS `tilevault_map_meta` (\
         `map` SMALLINT UNSIGNED NOT NULL, \
         `key` VARCHAR(255) NOT NULL, \
         `value` LONGBLOB NOT NULL, \
         PRIMARY KEY (`map`, `key`), \
         CONSTRAINT `fk_tilevault_map_meta_map` FOREIGN KEY (`map`) \
          REFERENCES `tilevault_map` (`id`) ON UPDATE RESTRICT ON DELETE RESTRICT\
         ) COLLATE 'utf8mb4_bin'"
    }

    fn initialize_map_tile(&self) -> &'static str {
        "CREATE TABLE IF NOT EXISTS `tilevault_map_tile` (\
         `map` SMALLINT UNSIGNED NOT NULL, \
         `lod` SMALLINT UNSIGNED NOT NULL, \
         `x` INT NOT NULL, \
         `z` INT NOT NULL, \
         `compression` SMALLINT UNSIGNED NOT NULL, \
         `changed` TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP, \
         `data` LONGBLOB NOT NULL, \
         PRIMARY KEY (`map`, `lod`, `x`, `z`), \
         CONSTRAINT `fk_tilevault_map_tile_map` FOREIGN KEY (`map`) \
          REFERENCES `tilevault_map` (`id`) ON UPDATE RESTRICT ON DELETE RESTRICT, \
         CONSTRAINT `fk_tilevault_map_tile_compression` FOREIGN KEY (`compression`) \
          REFERENCES `tilevault_map_tile_compression` (`id`) ON UPDATE RESTRICT ON DELETE RESTRICT\
         ) COLLATE 'utf8mb4_bin'"
    }

    fn select_storage_meta(&self) -> &'static str {
        "SELECT `value` FROM `tilevault_storage_meta` WHERE `key` = ?"
    }

    fn insert_storage_meta(&self) -> &'static str {
        "INSERT INTO `tilevault_storage_meta` (`key`, `value`) VALUES (?, ?)"
    }

    fn update_storage_meta(&self) -> &'static str {
        "UPDATE `tilevault_storage_meta` SET `value` = ? WHERE `key` = ?"
    }
}
