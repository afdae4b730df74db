//! Foodgram MCP server
//!
//! Operator tool surface over stdio.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing::info;
use tracing_subscriber::EnvFilter;

use foodgram::build_info::BuildInfo;
use foodgram::config::Config;
use foodgram::db::{migrations, Database};
use foodgram::mcp::FoodgramService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with the stdio protocol
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("foodgram=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    eprintln!("{}", BuildInfo::current().banner());
    eprintln!("Starting MCP server on stdio...");

    let config = Config::from_env()?;
    eprintln!("Database path: {}", config.database_path.display());

    let database = Database::open(&config.database_path)?;
    let version = database.with_conn(migrations::get_schema_version)?;
    info!(schema_version = version, "database ready");

    let service = FoodgramService::new(&config, database);
    let server = service.serve((stdin(), stdout())).await?;
    server.waiting().await?;

    Ok(())
}
