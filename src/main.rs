mod config;
mod error;
mod geo;
mod handlers;
mod mailer;
mod metrics;
mod models;
mod rate_limit;
mod state;
mod submission;

use anyhow::Context;
use chrono::TimeDelta;
use clap::Parser; // for cli
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use config::Args;
use rate_limit::{MemoryStore, RateLimiter, sweeper};
use state::AppState;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

// this is main async function with tokio
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // parse cli arguments
    let args = Args::parse();
    init_tracing(args.log_json);

    let store = Arc::new(MemoryStore::new());

    // creating shared state
    let state = Arc::new(AppState {
        rate_limiter: RateLimiter::new(
            store.clone(),
            args.rate_limit,
            args.rate_window(),
            args.rate_retention(),
        ),
        mailer: mailer::from_args(&args).context("failed to set up mail delivery")?,
        min_fill_time: TimeDelta::milliseconds(args.min_fill_ms),
    });

    // spawn the background sweeper
    let sweep_interval = args.sweep_interval();
    tokio::spawn(async move {
        sweeper(store, sweep_interval).await;
    });

    let mailer_kind = state.mailer.kind();
    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        port = args.port,
        rate_limit = args.rate_limit,
        rate_window_secs = args.rate_window,
        min_fill_ms = args.min_fill_ms,
        mailer = mailer_kind,
        "Contact gateway running on http://localhost:{}",
        args.port
    );
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
