use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use TileVault::config::TileVaultConfigBuilder;
use TileVault::web::live::NoPlayers;
use TileVault::web::WebServer;

#[derive(Parser, Debug)]
#[command(
    name = "tilevault_web",
    version,
    about = "TileVault web front door (static tiles + live API)"
)]
struct Opt {
    /// Bind address (overrides TV_WEB_ADDR)
    #[arg(long)]
    addr: Option<String>,
    /// Web root directory (overrides TV_WEBROOT)
    #[arg(long)]
    webroot: Option<std::path::PathBuf>,
    /// Worker threads (overrides TV_WEB_WORKERS)
    #[arg(long)]
    workers: Option<usize>,
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let opt = Opt::parse();

    let mut builder = TileVaultConfigBuilder::from_env_base();
    if let Some(addr) = opt.addr {
        builder = builder.web_addr(addr);
    }
    if let Some(webroot) = opt.webroot {
        builder = builder.webroot(webroot);
    }
    if let Some(workers) = opt.workers {
        builder = builder.web_workers(workers);
    }
    let cfg = builder.build();

    // Headless serving: no game attached, the players list is empty.
    let server = WebServer::from_config(&cfg, Arc::new(NoPlayers))?;
    println!("tilevault_web listening on {}", cfg.web_addr);
    server.run();
    Ok(())
}
