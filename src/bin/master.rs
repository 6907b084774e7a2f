//! Master node entry point

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seqlog::config::MasterConfig;
use seqlog::master::{http, MasterState};

/// seqlog master: accepts writes and replicates them to configured
/// secondaries. Configuration comes entirely from the environment (see
/// README); this binary takes no flags beyond `--help`/`--version`.
#[derive(Parser)]
#[command(name = "master")]
#[command(author, version, about, long_about = None)]
struct Cli;

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
    let _cli = Cli::parse();

    let config = match MasterConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    init_logging(&config.log_level);

    tracing::info!(
        secondaries = config.secondaries.len(),
        bind = %config.bind_address(),
        "starting master node"
    );

    let bind_address = config.bind_address();
    let state = MasterState::new(config);
    state.spawn_background_tasks();

    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(address = %bind_address, error = %e, "failed to bind HTTP listener");
            std::process::exit(1);
        }
    };

    tracing::info!(address = %bind_address, "master HTTP API listening");

    tokio::select! {
        result = axum::serve(listener, http::router(state)) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "master HTTP server error");
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received shutdown signal");
        }
    }
}
