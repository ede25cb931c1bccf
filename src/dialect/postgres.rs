//! PostgreSQL dialect: `$N` placeholders, `ON CONFLICT` upserts, `USING`
//! deletes. `changed` is a timestamptz; the info statement converts it to
//! epoch seconds so every dialect reads the same integer shape.

use super::Dialect;

pub struct PostgresDialect;

/// Singleton instance (dialects are stateless).
pub static POSTGRES: PostgresDialect = PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn write_map_tile(&self) -> &'static str {
        "INSERT INTO \"tilevault_map_tile\" (\"map\", \"lod\", \"x\", \"z\", \"compression\", \"data\") \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (\"map\", \"lod\", \"x\", \"z\") DO UPDATE SET \
         \"compression\" = EXCLUDED.\"compression\", \
         \"changed\" = now(), \
         \"data\" = EXCLUDED.\"data\""
    }

    fn read_map_tile(&self) -> &'static str {
        "SELECT t.\"data\" \
         FROM \"tilevault_map_tile\" t \
          INNER JOIN \"tilevault_map\" m \
           ON t.\"map\" = m.\"id\" \
          INNER JOIN \"tilevault_map_tile_compression\" c \
           ON t.\"compression\" = c.\"id\" \
         WHERE m.\"map_id\" = $1 \
         AND t.\"lod\" = $2 \
         AND t.\"x\" = $3 \
         AND t.\"z\" = $4 \
         AND c.\"compression\" = $5"
    }

    fn read_map_tile_info(&self) -> &'static str {
        "SELECT EXTRACT(EPOCH FROM t.\"changed\")::BIGINT, OCTET_LENGTH(t.\"data\") \
         FROM \"tilevault_map_tile\" t \
          INNER JOIN \"tilevault_map\" m \
           ON t.\"map\" = m.\"id\" \
          INNER JOIN \"tilevault_map_tile_compression\" c \
           ON t.\"compression\" = c.\"id\" \
         WHERE m.\"map_id\" = $1 \
         AND t.\"lod\" = $2 \
         AND t.\"x\" = $3 \
         AND t.\"z\" = $4 \
         AND c.\"compression\" = $5"
    }

    fn delete_map_tile(&self) -> &'static str {
        "DELETE FROM \"tilevault_map_tile\" t \
         USING \"tilevault_map\" m \
         WHERE t.\"map\" = m.\"id\" \
         AND m.\"map_id\" = $1 \
         AND t.\"lod\" = $2 \
         AND t.\"x\" = $3 \
         AND t.\"z\" = $4"
    }

    fn write_meta(&self) -> &'static str {
        "INSERT INTO \"tilevault_map_meta\" (\"map\", \"key\", \"value\") \
         VALUES ($1, $2, $3) \
         ON CONFLICT (\"map\", \"key\") DO UPDATE SET \
         \"value\" = EXCLUDED.\"value\""
    }

    fn read_meta(&self) -> &'static str {
        "SELECT t.\"value\" \
         FROM \"tilevault_map_meta\" t \
          INNER JOIN \"tilevault_map\" m \
           ON t.\"map\" = m.\"id\" \
         WHERE m.\"map_id\" = $1 \
         AND t.\"key\" = $2"
    }

    fn read_meta_size(&self) -> &'static str {
        "SELECT OCTET_LENGTH(t.\"value\") \
         FROM \"tilevault_map_meta\" t \
          INNER JOIN \"tilevault_map\" m \
           ON t.\"map\" = m.\"id\" \
         WHERE m.\"map_id\" = $1 \
         AND t.\"key\" = $2"
    }

    fn delete_meta(&self) -> &'static str {
        "DELETE FROM \"tilevault_map_meta\" t \
         USING \"tilevault_map\" m \
         WHERE t.\"map\" = m.\"id\" \
         AND m.\"map_id\" = $1 \
         AND t.\"key\" = $2"
    }

    fn update_map_meta(&self) -> &'static str {
        "UPDATE \"tilevault_map_meta\" t \
         SET \"key\" = $1 \
         FROM \"tilevault_map\" m \
         WHERE t.\"map\" = m.\"id\" \
         AND m.\"map_id\" = $2 \
         AND t.\"key\" = $3"
    }

    fn delete_meta_bulk(&self, count: usize) -> String {
        let marks: Vec<String> = (0..count.max(1)).map(|i| format!("${}", i + 2)).collect();
        format!(
            "DELETE FROM \"tilevault_map_meta\" t \
             USING \"tilevault_map\" m \
             WHERE t.\"map\" = m.\"id\" \
             AND m.\"map_id\" = $1 \
             AND t.\"key\" IN ({})",
            marks.join(", ")
        )
    }

    fn purge_map_tile(&self) -> &'static str {
        "DELETE FROM \"tilevault_map_tile\" t \
         USING \"tilevault_map\" m \
         WHERE t.\"map\" = m.\"id\" \
         AND m.\"map_id\" = $1"
    }

    fn purge_map_meta(&self) -> &'static str {
        "DELETE FROM \"tilevault_map_meta\" t \
         USING \"tilevault_map\" m \
         WHERE t.\"map\" = m.\"id\" \
         AND m.\"map_id\" = $1"
    }

    fn purge_map(&self) -> &'static str {
        "DELETE FROM \"tilevault_map\" WHERE \"map_id\" = $1"
    }

    fn select_map_ids(&self) -> &'static str {
        "SELECT \"map_id\" FROM \"tilevault_map\""
    }

    fn lookup_fk(&self, table: &str, id_column: &str, value_column: &str) -> String {
        format!(
            "SELECT \"{}\" FROM \"{}\" WHERE \"{}\" = $1",
            id_column, table, value_column
        )
    }

    fn insert_fk(&self, table: &str, value_column: &str) -> String {
        format!(
            "INSERT INTO \"{}\" (\"{}\") VALUES ($1)",
            table, value_column
        )
    }

    fn initialize_storage_meta(&self) -> &'static str {
        "CREATE TABLE IF NOT EXISTS \"tilevault_storage_meta\" (\
         \"key\" VARCHAR(255) NOT NULL, \
         \"value\" VARCHAR(255) DEFAULT NULL, \
         PRIMARY KEY (\"key\")\
         )"
    }

    fn initialize_map(&self) -> &'static str {
        "CREATE TABLE IF NOT EXISTS \"tilevault_map\" (\
         \"id\" SMALLSERIAL, \
         \"map_id\" VARCHAR(255) NOT NULL, \
         PRIMARY KEY (\"id\"), \
         UNIQUE (\"map_id\")\
         )"
    }

    fn initialize_map_tile_compression(&self) -> &'static str {
        "CREATE TABLE IF NOT EXISTS \"tilevault_map_tile_compression\" (\
         \"id\" SMALLSERIAL, \
         \"compression\" VARCHAR(255) NOT NULL, \
         PRIMARY KEY (\"id\"), \
         UNIQUE (\"compression\")\
         )"
    }

    fn initialize_map_meta(&self) -> &'static str {
        "CREATE TABLE IF NOT EXISTS \"tilevault_map_meta\" (\
         \"map\" SMALLINT NOT NULL, \
         \"key\" VARCHAR(255) NOT NULL, \
         \"value\" BYTEA NOT NULL, \
         PRIMARY KEY (\"map\", \"key\"), \
         CONSTRAINT \"fk_tilevault_map_meta_map\" FOREIGN KEY (\"map\") \
          REFERENCES \"tilevault_map\" (\"id\") ON UPDATE RESTRICT ON DELETE RESTRICT\
         )"
    }

    fn initialize_map_tile(&self) -> &'static str {
        "CREATE TABLE IF NOT EXISTS \"tilevault_map_tile\" (\
         \"map\" SMALLINT NOT NULL, \
         \"lod\" SMALLINT NOT NULL, \
         \"x\" INT NOT NULL, \
         \"z\" INT NOT NULL, \
         \"compression\" SMALLINT NOT NULL, \
         \"changed\" TIMESTAMPTZ NOT NULL DEFAULT now(), \
         \"data\" BYTEA NOT NULL, \
         PRIMARY KEY (\"map\", \"lod\", \"x\", \"z\"), \
         CONSTRAINT \"fk_tilevault_map_tile_map\" FOREIGN KEY (\"map\") \
          REFERENCES \"tilevault_map\" (\"id\") ON UPDATE RESTRICT ON DELETE RESTRICT, \
         CONSTRAINT \"fk_tilevault_map_tile_compression\" FOREIGN KEY (\"compression\") \
          REFERENCES \"tilevault_map_tile_compression\" (\"id\") ON UPDATE RESTRICT ON DELETE RESTRICT\
         )"
    }

    fn select_storage_meta(&self) -> &'static str {
        "SELECT \"value\" FROM \"tilevault_storage_meta\" WHERE \"key\" = $1"
    }

    fn insert_storage_meta(&self) -> &'static str {
        "INSERT INTO \"tilevault_storage_meta\" (\"key\", \"value\") VALUES ($1, $2)"
    }

    fn update_storage_meta(&self) -> &'static str {
        "UPDATE \"tilevault_storage_meta\" SET \"value\" = $1 WHERE \"key\" = $2"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_on_conflict() {
        let sql = POSTGRES.write_map_tile();
        assert!(sql.contains("ON CONFLICT (\"map\", \"lod\", \"x\", \"z\")"));
        assert!(sql.contains("\"changed\" = now()"));
    }

    #[test]
    fn numbered_placeholders_in_contract_order() {
        let sql = POSTGRES.read_map_tile();
        let p1 = sql.find("$1").expect("$1");
        let p5 = sql.find("$5").expect("$5");
        assert!(p1 < p5);
    }

    #[test]
    fn bulk_delete_continues_numbering() {
        let sql = POSTGRES.delete_meta_bulk(3);
        assert!(sql.contains("IN ($2, $3, $4)"));
    }
}
