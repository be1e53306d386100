mod classify;
mod cli;
mod config;
mod errors;
mod models;
mod pipeline;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Fails on missing model paths
    let config = Config::from_env()?;

    // Logs go to stderr so `classify` output stays pipeable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting screener v{}", env!("CARGO_PKG_VERSION"));

    let pipeline = Pipeline::load(&config.vectorizer_model_path, &config.classifier_model_path)
        .context("Failed to load model artifacts")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, pipeline).await,
        Command::Classify { files, format } => cli::classify_files(
            &pipeline,
            &files,
            format.as_deref(),
            std::io::stdout().lock(),
        ),
    }
}

async fn serve(config: Config, pipeline: Pipeline) -> Result<()> {
    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
