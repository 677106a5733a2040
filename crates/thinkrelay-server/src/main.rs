//! thinkrelay
//!
//! SSE relay between a browser chat client and a local Ollama backend.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use thinkrelay_core::config::{default_database_path, load_config};
use thinkrelay_core::tracing_init::init_tracing;
use thinkrelay_server::relay::{RelayOptions, StreamRelay};
use thinkrelay_server::server::{AppState, build_router};
use thinkrelay_server::storage::HistoryDatabase;
use thinkrelay_server::upstream::OllamaClient;

#[derive(Parser, Debug)]
#[command(name = "thinkrelay")]
#[command(
    version,
    about = "thinkrelay - streams Ollama reasoning and answers to the browser"
)]
struct Args {
    /// Path to a JSON config file.
    #[arg(long, env = "THINKRELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Ollama base URL.
    #[arg(long)]
    ollama_url: Option<String>,

    /// Model name sent with every generation.
    #[arg(long)]
    model: Option<String>,

    /// Path to SQLite history database file.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("thinkrelay_server=info,thinkrelay_core=info", args.log_json);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(addr) = args.addr {
        config.server.listen_addr = addr;
    }
    if let Some(url) = args.ollama_url {
        config.upstream.base_url = url;
    }
    if let Some(model) = args.model {
        config.upstream.model = model;
    }
    if let Some(path) = args.db_path {
        config.server.database_path = Some(path);
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.server.listen_addr,
        ollama = %config.upstream.base_url,
        model = %config.upstream.model,
        "Starting thinkrelay"
    );

    let db_path = match config.server.database_path.clone() {
        Some(path) => path,
        None => default_database_path()
            .ok_or_else(|| anyhow::anyhow!("Cannot determine data directory"))?,
    };
    info!(path = %db_path.display(), "Opening history database");
    let db = HistoryDatabase::open(&db_path).await?;

    let client = OllamaClient::new(&config.upstream)?;
    let relay = StreamRelay::new(client, db, RelayOptions::from(&config.stream));
    let app = build_router(AppState::new(relay));

    let listener = tokio::net::TcpListener::bind(config.server.listen_addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received shutdown signal");
        })
        .await?;

    info!("thinkrelay stopped");
    Ok(())
}
