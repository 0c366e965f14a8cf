//! Pathwarden Server - Main entry point
//!
//! Serves the resource catalogue behind the identity and authorization
//! layers. Send `SIGHUP` to reload the policy file.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use pathwarden_core::{
    api,
    config::Config,
    rbac::{PolicyEngine, PolicyHandle},
    telemetry,
};

#[derive(Parser, Debug)]
#[command(name = "pathwarden-server", version, about = "RBAC-protected HTTP server")]
struct Args {
    /// Configuration file (defaults to config/default.toml when present)
    #[arg(short, long, env = "PATHWARDEN_CONFIG")]
    config: Option<String>,

    /// Policy file, overriding the configured path
    #[arg(short, long)]
    policy: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => Config::load().context("Failed to load configuration")?,
    };
    if let Some(policy) = args.policy {
        config.policy.path = policy;
    }

    telemetry::init_logging(&config.logging)?;
    telemetry::describe_metrics();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Pathwarden Server");

    let engine = PolicyEngine::from_file(&config.policy.path, config.policy.format)
        .with_context(|| format!("Failed to load policy {}", config.policy.path.display()))?;
    tracing::info!(
        path = %config.policy.path.display(),
        rules = engine.store().rule_count(),
        roles = engine.store().role_count(),
        "Policy loaded"
    );

    let handle = PolicyHandle::new(engine);

    #[cfg(unix)]
    spawn_reload_task(handle.clone(), &config)?;

    let app = api::build_router(handle, config.identity.clone());

    let addr = config.server.bind_address();
    tracing::info!(address = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Reload the policy on every `SIGHUP`. A failed reload keeps the old policy.
#[cfg(unix)]
fn spawn_reload_task(handle: PolicyHandle, config: &Config) -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup()).context("Failed to install SIGHUP handler")?;
    let path = config.policy.path.clone();
    let format = config.policy.format;

    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            tracing::info!(path = %path.display(), "SIGHUP received, reloading policy");
            // Errors are logged by the handle.
            let _ = handle.reload_from_file(&path, format);
        }
    });

    Ok(())
}

/// Wait for shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
