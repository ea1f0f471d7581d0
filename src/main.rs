use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cod_checkout::config::Config;
use cod_checkout::db::{self, AppState};
use cod_checkout::handlers;

/// Cash-on-delivery checkout confirmation service
#[derive(Debug, Parser)]
#[command(name = "cod-checkout", version, about)]
struct Cli {
    /// Bind address (overrides HOST)
    #[arg(long)]
    host: Option<String>,
    /// Port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
    /// SQLite database file (overrides DATABASE_PATH)
    #[arg(long)]
    database_path: Option<String>,
    /// Mount the /dev seeding routes
    #[arg(long)]
    dev: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(path) = cli.database_path {
        config.database_path = path;
    }
    config.dev_mode |= cli.dev;

    let pool = db::create_pool(&config.database_path)?;
    let app = handlers::app(AppState::new(pool, &config), config.dev_mode);

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
