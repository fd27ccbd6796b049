//! PubMed Insight server entry point.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pubmed_insight::config::Config;
use pubmed_insight::server::{self, AppState};

#[derive(Parser, Debug)]
#[command(name = "pubmed-insight")]
#[command(about = "PubMed literature search and analysis backend")]
#[command(version)]
struct Cli {
    /// NCBI API key (optional, enables higher E-utilities rate limits)
    #[arg(long, env = "NCBI_API_KEY")]
    ncbi_api_key: Option<String>,

    /// Groq API key (optional; AI features are disabled without it)
    #[arg(long, env = "GROQ_API_KEY")]
    groq_api_key: Option<String>,

    /// HTTP server port
    #[arg(long, default_value = "8000", env = "PORT")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting PubMed Insight server");

    let config = Config::new(
        cli.ncbi_api_key.filter(|k| !k.is_empty()),
        cli.groq_api_key.filter(|k| !k.is_empty()),
    );
    tracing::info!(
        ncbi_key = config.has_ncbi_key(),
        groq_key = config.has_groq_key(),
        "Upstream credentials loaded"
    );

    let state = Arc::new(AppState::from_config(&config)?);
    server::serve(state, cli.port).await?;

    Ok(())
}
