//! Server binary for studybetter.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ServiceConfig`, initialises logging, and serves the router.

use anyhow::{Context, Result};
use clap::Parser;
use studybetter::{app, ServiceConfig};
use tracing_subscriber::EnvFilter;

/// Summarize or explain PDFs with Mistral agents; export as PDF or Word.
#[derive(Debug, Parser)]
#[command(name = "studybetter", version, about)]
struct Cli {
    /// Address to bind the HTTP server to.
    #[arg(long, env = "STUDYBETTER_BIND", default_value = "127.0.0.1:3000")]
    bind: String,

    /// Mistral API key; may also be set via MISTRAL_API_KEY.
    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Override the Mistral API base URL (testing/self-hosted gateways).
    #[arg(long, env = "STUDYBETTER_API_BASE")]
    api_base_url: Option<String>,

    /// Maximum tokens the agent may generate per completion.
    #[arg(long, default_value_t = 4000)]
    max_tokens: u32,

    /// Per-upstream-call timeout in seconds.
    #[arg(long, default_value_t = 120)]
    api_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut builder = ServiceConfig::builder()
        .max_tokens(cli.max_tokens)
        .api_timeout_secs(cli.api_timeout_secs);
    if let Some(key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(base) = cli.api_base_url {
        builder = builder.api_base_url(base);
    }
    let config = builder.build().context("invalid configuration")?;

    if config.api_key.is_none() {
        tracing::warn!(
            "MISTRAL_API_KEY is not set; /api/analyze will return 500 until it is configured"
        );
    }

    let router = app(config).context("failed to build router")?;
    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;
    tracing::info!(addr = %cli.bind, "studybetter listening");

    axum::serve(listener, router)
        .await
        .context("server error")?;
    Ok(())
}
