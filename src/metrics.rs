//! Lightweight global metrics for TileVault.
//!
//! Thread-safe atomic counters for the subsystems:
//! - tile operations (writes/reads/deletes + payload bytes)
//! - map meta operations
//! - purges
//! - surrogate-key cache (hits/misses) and creation-race retries
//! - HTTP front door (requests by outcome class)

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

// ----- Tiles -----
static TILES_WRITTEN: AtomicU64 = AtomicU64::new(0);
static TILES_READ: AtomicU64 = AtomicU64::new(0);
static TILES_DELETED: AtomicU64 = AtomicU64::new(0);
static TILE_BYTES_WRITTEN: AtomicU64 = AtomicU64::new(0);
static TILE_BYTES_READ: AtomicU64 = AtomicU64::new(0);

// ----- Map meta -----
static META_WRITTEN: AtomicU64 = AtomicU64::new(0);
static META_READ: AtomicU64 = AtomicU64::new(0);
static META_DELETED: AtomicU64 = AtomicU64::new(0);

// ----- Purge -----
static MAPS_PURGED: AtomicU64 = AtomicU64::new(0);

// ----- Surrogate-key cache -----
static FK_CACHE_HITS: AtomicU64 = AtomicU64::new(0);
static FK_CACHE_MISSES: AtomicU64 = AtomicU64::new(0);
static FK_CONFLICT_RETRIES: AtomicU64 = AtomicU64::new(0);

// ----- HTTP -----
static HTTP_REQUESTS: AtomicU64 = AtomicU64::new(0);
static HTTP_NOT_FOUND: AtomicU64 = AtomicU64::new(0);
static HTTP_BAD_REQUEST: AtomicU64 = AtomicU64::new(0);
static HTTP_ERRORS: AtomicU64 = AtomicU64::new(0);
static HTTP_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub tiles_written: u64,
    pub tiles_read: u64,
    pub tiles_deleted: u64,
    pub tile_bytes_written: u64,
    pub tile_bytes_read: u64,

    pub meta_written: u64,
    pub meta_read: u64,
    pub meta_deleted: u64,

    pub maps_purged: u64,

    pub fk_cache_hits: u64,
    pub fk_cache_misses: u64,
    pub fk_conflict_retries: u64,

    pub http_requests: u64,
    pub http_not_found: u64,
    pub http_bad_request: u64,
    pub http_errors: u64,
    pub http_send_failures: u64,
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        tiles_written: TILES_WRITTEN.load(Ordering::Relaxed),
        tiles_read: TILES_READ.load(Ordering::Relaxed),
        tiles_deleted: TILES_DELETED.load(Ordering::Relaxed),
        tile_bytes_written: TILE_BYTES_WRITTEN.load(Ordering::Relaxed),
        tile_bytes_read: TILE_BYTES_READ.load(Ordering::Relaxed),

        meta_written: META_WRITTEN.load(Ordering::Relaxed),
        meta_read: META_READ.load(Ordering::Relaxed),
        meta_deleted: META_DELETED.load(Ordering::Relaxed),

        maps_purged: MAPS_PURGED.load(Ordering::Relaxed),

        fk_cache_hits: FK_CACHE_HITS.load(Ordering::Relaxed),
        fk_cache_misses: FK_CACHE_MISSES.load(Ordering::Relaxed),
        fk_conflict_retries: FK_CONFLICT_RETRIES.load(Ordering::Relaxed),

        http_requests: HTTP_REQUESTS.load(Ordering::Relaxed),
        http_not_found: HTTP_NOT_FOUND.load(Ordering::Relaxed),
        http_bad_request: HTTP_BAD_REQUEST.load(Ordering::Relaxed),
        http_errors: HTTP_ERRORS.load(Ordering::Relaxed),
        http_send_failures: HTTP_SEND_FAILURES.load(Ordering::Relaxed),
    }
}

pub fn record_tile_write(bytes: usize) {
    TILES_WRITTEN.fetch_add(1, Ordering::Relaxed);
    TILE_BYTES_WRITTEN.fetch_add(bytes as u64, Ordering::Relaxed);
}

pub fn record_tile_read(bytes: usize) {
    TILES_READ.fetch_add(1, Ordering::Relaxed);
    TILE_BYTES_READ.fetch_add(bytes as u64, Ordering::Relaxed);
}

pub fn record_tile_delete() {
    TILES_DELETED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_meta_write() {
    META_WRITTEN.fetch_add(1, Ordering::Relaxed);
}

pub fn record_meta_read() {
    META_READ.fetch_add(1, Ordering::Relaxed);
}

pub fn record_meta_delete() {
    META_DELETED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_map_purge() {
    MAPS_PURGED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_fk_cache_hit() {
    FK_CACHE_HITS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_fk_cache_miss() {
    FK_CACHE_MISSES.fetch_add(1, Ordering::Relaxed);
}

pub fn record_fk_conflict_retry() {
    FK_CONFLICT_RETRIES.fetch_add(1, Ordering::Relaxed);
}

pub fn record_http_request() {
    HTTP_REQUESTS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_http_not_found() {
    HTTP_NOT_FOUND.fetch_add(1, Ordering::Relaxed);
}

pub fn record_http_bad_request() {
    HTTP_BAD_REQUEST.fetch_add(1, Ordering::Relaxed);
}

pub fn record_http_error() {
    HTTP_ERRORS.fetch_add(1, Ordering::Relaxed);
}

/// The response could not be written back (client gone mid-send). Kept apart
/// from `http_errors` so one failed request never counts twice.
pub fn record_http_send_failure() {
    HTTP_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_failures_counted_apart_from_errors() {
        let before = snapshot();
        record_http_send_failure();
        let after = snapshot();
        assert!(after.http_send_failures >= before.http_send_failures + 1);
        assert_eq!(after.http_errors, before.http_errors);
    }
}
