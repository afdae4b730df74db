//! Foodgram HTTP API server

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use foodgram::build_info::BuildInfo;
use foodgram::config::Config;
use foodgram::db::Database;
use foodgram::http::{router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("foodgram=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    eprintln!("{}", BuildInfo::current().banner());

    let config = Config::from_env()?;
    let database = Database::open(&config.database_path)?;
    info!(path = %config.database_path.display(), "database ready");

    let state = Arc::new(AppState {
        database,
        page_size: config.page_size,
    });

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, router(state)).await?;

    Ok(())
}
