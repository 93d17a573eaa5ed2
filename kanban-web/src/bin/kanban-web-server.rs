use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use kanban::store::JsonFileStore;
use kanban_web::{listen_addr, router, AppState};

#[derive(Parser)]
#[command(name = "kanban-web-server", about = "JSON task API for the kanban board")]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// Address to bind (IPv4 or IPv6)
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Path to the JSON task store
    #[arg(long, default_value = "db.json")]
    db: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let store = JsonFileStore::open(&cli.db)
        .with_context(|| format!("failed to open {}", cli.db.display()))?;
    let app = router(AppState::new(store));

    let addr = listen_addr(&cli.bind, cli.port)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!("JSON backend running at http://{addr}");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
