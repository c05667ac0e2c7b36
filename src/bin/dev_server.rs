//! Techplan Dev Server
//!
//! Run with: cargo run --bin techplan-dev
//!
//! Serves the built frontend from `build.output_dir` and proxies `/api` to
//! the backend.
//!
//! # Configuration
//!
//! Read from the first config file found (see `techplan config`), then:
//! - `TECHPLAN_DEV_PORT`: Port to listen on (default: 8080)
//! - `TECHPLAN_API_URL`: API base URL used by the client
//! - `TECHPLAN_LOG_LEVEL`: Log level (default: info)
//! - `TECHPLAN_LOG_FORMAT`: `pretty` or `json`
//! - `RUST_LOG`: Full filter, wins over the level above

use clap::Parser;
use std::path::PathBuf;

use techplan::config::Config;
use techplan::devserver::serve;

#[derive(Parser)]
#[command(name = "techplan-dev")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Development server for the Technical Proposal AI frontend")]
struct Args {
    /// Config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overrides the config
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory with the built frontend, overrides the config
    #[arg(short, long)]
    dist: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default()?,
    };
    if let Some(port) = args.port {
        config.dev_server.port = port;
    }
    if let Some(dist) = args.dist {
        config.build.output_dir = dist;
    }
    config.validate()?;

    techplan::logging::init(&config.logging, &["tower_http=debug"])?;

    tracing::info!("Starting Techplan dev server v{}", env!("CARGO_PKG_VERSION"));

    if !config.build.output_dir.join("index.html").is_file() {
        tracing::warn!(
            "No index.html in {:?}, only the proxy will be useful until the frontend is built",
            config.build.output_dir
        );
    }

    serve(&config.dev_server, &config.build).await?;
    Ok(())
}
