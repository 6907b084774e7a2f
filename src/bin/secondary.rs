//! Secondary node entry point

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seqlog::config::SecondaryConfig;
use seqlog::secondary::apply::ApplyEngine;
use seqlog::secondary::{http, SecondaryState};

/// seqlog secondary: applies replicated entries at most once, in sequence
/// order. Most configuration comes from the environment; `port`, if given,
/// overrides `PORT`.
#[derive(Parser)]
#[command(name = "secondary")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Bind port. Overrides the PORT environment variable if given.
    port: Option<u16>,
}

fn init_logging(level: &str) {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = SecondaryConfig::from_env();
    if let Some(port) = cli.port {
        config.port = port;
    }
    init_logging(&config.log_level);

    tracing::info!(
        bind = %config.bind_address(),
        delay_ms = config.delay_ms,
        "starting secondary node"
    );

    let bind_address = config.bind_address();
    let engine = ApplyEngine::new(Duration::from_millis(config.delay_ms));
    let state = Arc::new(SecondaryState { config, engine });

    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(address = %bind_address, error = %e, "failed to bind HTTP listener");
            std::process::exit(1);
        }
    };

    tracing::info!(address = %bind_address, "secondary HTTP API listening");

    tokio::select! {
        result = axum::serve(listener, http::router(state)) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "secondary HTTP server error");
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received shutdown signal");
        }
    }
}
