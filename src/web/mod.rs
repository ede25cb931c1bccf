//! web — the tile web front door.
//!
//! tiny_http server with a fixed handler chain, mirrored across N worker
//! threads sharing one accept loop:
//! 1. live API (`/live`, `/live/players`)
//! 2. static files with pre-compressed variant negotiation
//! 3. not-found fallback: `/data/*` soft-misses as `200 {}` (clients polling
//!    for not-yet-rendered data get an empty structure, not an error);
//!    everything else is a plain-text 404 naming the path.
//!
//! Submodules:
//! - static_files.rs — path resolution, encoding negotiation, weak ETags
//! - live.rs         — player source trait, filter settings, JSON bodies

pub mod live;
pub mod static_files;

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Result};
use log::{debug, error, info};
use tiny_http::{Header, Method, Request, Response, Server};

use crate::config::TileVaultConfig;
use crate::consts::{DATA_PREFIX, SERVER_BANNER};
use crate::metrics;

use live::{LiveSettings, PlayerSource};
use static_files::StaticResolver;

pub struct WebServer {
    server: Arc<Server>,
    ctx: Arc<WebContext>,
    workers: usize,
}

struct WebContext {
    resolver: StaticResolver,
    players: Arc<dyn PlayerSource>,
    live: LiveSettings,
}

impl WebServer {
    pub fn bind(
        addr: &str,
        webroot: impl Into<PathBuf>,
        players: Arc<dyn PlayerSource>,
        live: LiveSettings,
        workers: usize,
    ) -> Result<Self> {
        let server = Server::http(addr).map_err(|e| anyhow!("bind http at {}: {}", addr, e))?;
        Ok(Self {
            server: Arc::new(server),
            ctx: Arc::new(WebContext {
                resolver: StaticResolver::new(webroot),
                players,
                live,
            }),
            workers: workers.max(1),
        })
    }

    pub fn from_config(cfg: &TileVaultConfig, players: Arc<dyn PlayerSource>) -> Result<Self> {
        Self::bind(
            &cfg.web_addr,
            cfg.webroot.clone(),
            players,
            LiveSettings {
                hide_invisible: cfg.hide_invisible,
                hide_sneaking: cfg.hide_sneaking,
                hidden_gamemodes: cfg.hidden_gamemodes.clone(),
            },
            cfg.web_workers,
        )
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve until the listener is unblocked. Spawns `workers - 1` extra
    /// threads; the calling thread joins the accept loop.
    pub fn run(&self) {
        info!(
            "web server listening on {:?} ({} workers)",
            self.server.server_addr(),
            self.workers
        );

        let mut handles = Vec::new();
        for _ in 1..self.workers {
            let server = Arc::clone(&self.server);
            let ctx = Arc::clone(&self.ctx);
            handles.push(thread::spawn(move || worker_loop(&server, &ctx)));
        }
        worker_loop(&self.server, &self.ctx);
        for h in handles {
            let _ = h.join();
        }
    }

    /// Wake every worker out of `recv` so `run` returns. tiny_http's
    /// `unblock` wakes a single blocked thread per call, so it is invoked
    /// once per worker.
    pub fn unblock(&self) {
        for _ in 0..self.workers {
            self.server.unblock();
        }
    }
}

fn worker_loop(server: &Server, ctx: &WebContext) {
    loop {
        let rq = match server.recv() {
            Ok(rq) => rq,
            // unblock() or a dead listener; either way this worker is done
            Err(e) => {
                debug!("http recv stopped: {}", e);
                return;
            }
        };
        handle_request(ctx, rq);
    }
}

fn handle_request(ctx: &WebContext, rq: Request) {
    metrics::record_http_request();
    let path = rq.url().split('?').next().unwrap_or("/").to_string();

    let sent = if path == "/live" || path.starts_with("/live/") {
        handle_live(ctx, rq, &path)
    } else {
        handle_static(ctx, rq, &path)
    };

    // Counted separately from handler-side 500s; a client hanging up
    // mid-response is not a server fault.
    if let Err(e) = sent {
        metrics::record_http_send_failure();
        error!("http response failed: {}", e);
    }
}

fn handle_live(ctx: &WebContext, rq: Request, path: &str) -> io::Result<()> {
    if path == "/live/players" {
        if *rq.method() != Method::Get {
            return respond_bad_request(rq);
        }
        let body = live::players_body(ctx.players.as_ref(), &ctx.live);
        return respond_json(rq, body);
    }
    // Ping: fixed status payload for everything else under /live.
    respond_json(rq, live::ping_body().to_string())
}

fn handle_static(ctx: &WebContext, rq: Request, path: &str) -> io::Result<()> {
    match rq.method() {
        Method::Get | Method::Head => {}
        _ => return respond_bad_request(rq),
    }

    let accept_encoding = header_value(&rq, "Accept-Encoding").unwrap_or_default();
    let Some(file) = ctx.resolver.resolve(path, &accept_encoding) else {
        return respond_not_found(rq, path);
    };

    // Freshness: a matching validator means the client copy is current.
    if let (Some(etag), Some(inm)) = (&file.etag, header_value(&rq, "If-None-Match")) {
        if inm.trim() == etag.as_str() {
            let mut resp = Response::empty(304);
            add_header(&mut resp, "ETag", etag);
            add_header(&mut resp, "Server", SERVER_BANNER);
            return rq.respond(resp);
        }
    }

    let data = match std::fs::read(&file.path) {
        Ok(d) => d,
        Err(e) => {
            error!("failed to read {}: {}", file.path.display(), e);
            metrics::record_http_error();
            let mut resp = Response::from_string(format!(
                "500 - Internal Server Error\n{}",
                SERVER_BANNER
            ))
            .with_status_code(500);
            add_header(&mut resp, "Server", SERVER_BANNER);
            return rq.respond(resp);
        }
    };

    let mut resp = Response::from_data(data);
    add_header(&mut resp, "Content-Type", file.content_type);
    add_header(&mut resp, "Server", SERVER_BANNER);
    if let Some(enc) = file.encoding {
        add_header(&mut resp, "Content-Encoding", enc);
    }
    if let Some(etag) = &file.etag {
        add_header(&mut resp, "ETag", etag);
    }
    rq.respond(resp)
}

fn respond_not_found(rq: Request, path: &str) -> io::Result<()> {
    if path.starts_with(DATA_PREFIX) {
        // Soft miss: expected-absent data reads as an empty structure.
        return respond_json(rq, "{}".to_string());
    }

    metrics::record_http_not_found();
    let mut resp = Response::from_string(format!(
        "404 - NotFound\n{}\n\nPath: '{}'",
        SERVER_BANNER, path
    ))
    .with_status_code(404);
    add_header(&mut resp, "Server", SERVER_BANNER);
    rq.respond(resp)
}

fn respond_bad_request(rq: Request) -> io::Result<()> {
    metrics::record_http_bad_request();
    let mut resp = Response::from_string(format!("400 - Bad Request\n{}", SERVER_BANNER))
        .with_status_code(400);
    add_header(&mut resp, "Server", SERVER_BANNER);
    rq.respond(resp)
}

fn respond_json(rq: Request, body: String) -> io::Result<()> {
    let mut resp = Response::from_string(body);
    add_header(&mut resp, "Content-Type", "application/json");
    add_header(&mut resp, "Cache-Control", "no-cache");
    add_header(&mut resp, "Server", SERVER_BANNER);
    rq.respond(resp)
}

fn header_value(rq: &Request, name: &str) -> Option<String> {
    rq.headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str().to_string())
}

fn add_header<R: io::Read>(resp: &mut Response<R>, name: &str, value: &str) {
    if let Ok(h) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
        resp.add_header(h);
    }
}
