//! Centralized configuration and builder for TileVault.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - TileVaultConfig::from_env() reads TV_* env vars; the builder overrides
//!   individual fields on top of defaults or an env-derived base.
//!
//! Consumers:
//! - SqlStorage: pool_size, pool_timeout_ms.
//! - Web server: web_addr, web_workers, webroot, live filter settings.

use std::fmt;
use std::path::PathBuf;

/// Top-level configuration for TileVault (storage engine + web front door).
#[derive(Clone, Debug)]
pub struct TileVaultConfig {
    /// Path of the SQLite database file.
    /// Env: TV_DB_PATH (default "tilevault.db")
    pub db_path: PathBuf,

    /// Maximum number of pooled backend connections.
    /// Env: TV_POOL_SIZE (default 4)
    pub pool_size: usize,

    /// Pool acquire timeout in milliseconds; expiry surfaces as
    /// StorageError::PoolTimeout.
    /// Env: TV_POOL_TIMEOUT_MS (default 5000)
    pub pool_timeout_ms: u64,

    /// Web server bind address.
    /// Env: TV_WEB_ADDR (default "0.0.0.0:8100")
    pub web_addr: String,

    /// Number of HTTP worker threads sharing the accept loop.
    /// Env: TV_WEB_WORKERS (default 4)
    pub web_workers: usize,

    /// Web root for static file serving.
    /// Env: TV_WEBROOT (default "web")
    pub webroot: PathBuf,

    /// Hide invisible players from the live players endpoint.
    /// Env: TV_HIDE_INVISIBLE (default true; "1|true|on|yes" => true)
    pub hide_invisible: bool,

    /// Hide sneaking players from the live players endpoint.
    /// Env: TV_HIDE_SNEAKING (default false)
    pub hide_sneaking: bool,

    /// Game modes whose players are hidden from the live players endpoint.
    /// Env: TV_HIDDEN_GAMEMODES (comma-separated, default empty)
    pub hidden_gamemodes: Vec<String>,
}

impl Default for TileVaultConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("tilevault.db"),
            pool_size: 4,
            pool_timeout_ms: 5000,
            web_addr: "0.0.0.0:8100".to_string(),
            web_workers: 4,
            webroot: PathBuf::from("web"),
            hide_invisible: true,
            hide_sneaking: false,
            hidden_gamemodes: Vec::new(),
        }
    }
}

impl TileVaultConfig {
    /// Build a config from TV_* env vars on top of defaults.
    /// Unset or unparsable values fall back to the default silently.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("TV_DB_PATH") {
            if !v.is_empty() {
                cfg.db_path = PathBuf::from(v);
            }
        }
        if let Some(v) = env_parse::<usize>("TV_POOL_SIZE") {
            if v > 0 {
                cfg.pool_size = v;
            }
        }
        if let Some(v) = env_parse::<u64>("TV_POOL_TIMEOUT_MS") {
            cfg.pool_timeout_ms = v;
        }
        if let Ok(v) = std::env::var("TV_WEB_ADDR") {
            if !v.is_empty() {
                cfg.web_addr = v;
            }
        }
        if let Some(v) = env_parse::<usize>("TV_WEB_WORKERS") {
            if v > 0 {
                cfg.web_workers = v;
            }
        }
        if let Ok(v) = std::env::var("TV_WEBROOT") {
            if !v.is_empty() {
                cfg.webroot = PathBuf::from(v);
            }
        }
        if let Some(v) = env_bool("TV_HIDE_INVISIBLE") {
            cfg.hide_invisible = v;
        }
        if let Some(v) = env_bool("TV_HIDE_SNEAKING") {
            cfg.hide_sneaking = v;
        }
        if let Ok(v) = std::env::var("TV_HIDDEN_GAMEMODES") {
            cfg.hidden_gamemodes = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        cfg
    }

    pub fn builder() -> TileVaultConfigBuilder {
        TileVaultConfigBuilder {
            cfg: Self::default(),
        }
    }
}

impl fmt::Display for TileVaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "db_path={} pool_size={} pool_timeout_ms={} web_addr={} web_workers={}",
            self.db_path.display(),
            self.pool_size,
            self.pool_timeout_ms,
            self.web_addr,
            self.web_workers
        )
    }
}

/// Builder over TileVaultConfig. Starts from defaults; use `from_env_base()`
/// to start from env-derived values instead.
pub struct TileVaultConfigBuilder {
    cfg: TileVaultConfig,
}

impl TileVaultConfigBuilder {
    pub fn from_env_base() -> Self {
        Self {
            cfg: TileVaultConfig::from_env(),
        }
    }

    pub fn db_path(mut self, p: impl Into<PathBuf>) -> Self {
        self.cfg.db_path = p.into();
        self
    }

    pub fn pool_size(mut self, n: usize) -> Self {
        self.cfg.pool_size = n.max(1);
        self
    }

    pub fn pool_timeout_ms(mut self, ms: u64) -> Self {
        self.cfg.pool_timeout_ms = ms;
        self
    }

    pub fn web_addr(mut self, addr: impl Into<String>) -> Self {
        self.cfg.web_addr = addr.into();
        self
    }

    pub fn web_workers(mut self, n: usize) -> Self {
        self.cfg.web_workers = n.max(1);
        self
    }

    pub fn webroot(mut self, p: impl Into<PathBuf>) -> Self {
        self.cfg.webroot = p.into();
        self
    }

    pub fn hide_invisible(mut self, v: bool) -> Self {
        self.cfg.hide_invisible = v;
        self
    }

    pub fn hide_sneaking(mut self, v: bool) -> Self {
        self.cfg.hide_sneaking = v;
        self
    }

    pub fn hidden_gamemodes(mut self, modes: Vec<String>) -> Self {
        self.cfg.hidden_gamemodes = modes;
        self
    }

    pub fn build(self) -> TileVaultConfig {
        self.cfg
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    let v = std::env::var(key).ok()?;
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
