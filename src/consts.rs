//! Shared constants (schema names, storage-meta keys, web banner).

// -------- Schema (table names, shared by all dialects) --------
pub const TABLE_MAP: &str = "tilevault_map";
pub const TABLE_MAP_TILE_COMPRESSION: &str = "tilevault_map_tile_compression";
pub const TABLE_MAP_TILE: &str = "tilevault_map_tile";
pub const TABLE_MAP_META: &str = "tilevault_map_meta";
pub const TABLE_STORAGE_META: &str = "tilevault_storage_meta";

// -------- Registry columns (generic FK lookup/insert) --------
pub const MAP_ID_COLUMN: &str = "id";
pub const MAP_VALUE_COLUMN: &str = "map_id";
pub const COMPRESSION_ID_COLUMN: &str = "id";
pub const COMPRESSION_VALUE_COLUMN: &str = "compression";

// -------- Storage meta --------
pub const META_KEY_SCHEMA_VERSION: &str = "schema_version";
pub const SCHEMA_VERSION: u32 = 1;

// -------- Surrogate-key resolution --------
// A lookup->insert->re-lookup cycle that fails this many times in a row means
// something other than a creation race is wrong with the backend.
pub const FK_RESOLVE_MAX_RETRIES: usize = 3;

// -------- Web --------
pub const SERVER_BANNER: &str = concat!("TileVault / ", env!("CARGO_PKG_VERSION"));
pub const DATA_PREFIX: &str = "/data";
