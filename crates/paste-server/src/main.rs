//! `paste-server`: stores and serves client-side-encrypted pastes.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (tracing, plus OTEL when configured).
//! 3. Open the paste store selected by `STORE_BACKEND`.
//! 4. Spawn the background expiry sweep.
//! 5. Build the Axum router and serve over HTTP, or HTTPS when TLS is configured.

mod config;
mod server;
mod store;
mod telemetry;

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use server::state::{AppState, Limits};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.listen_port,
        store = ?cfg.store_backend,
        tls = cfg.tls_paths().is_some(),
        "paste-server starting"
    );

    // -----------------------------------------------------------------------
    // 3. Paste store
    // -----------------------------------------------------------------------
    let paste_store = store::open(&cfg).await?;

    // -----------------------------------------------------------------------
    // 4. Background tasks
    // -----------------------------------------------------------------------
    let _sweep = store::sweep_task(
        paste_store.clone(),
        Duration::from_secs(cfg.sweep_interval_secs),
    );

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(paste_store, Limits::from_config(&cfg));
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    match cfg.tls_paths() {
        Some((cert_path, key_path)) => {
            let cert_pem = tokio::fs::read(cert_path)
                .await
                .with_context(|| format!("failed to read {}", cert_path.display()))?;
            let key_pem = tokio::fs::read(key_path)
                .await
                .with_context(|| format!("failed to read {}", key_path.display()))?;
            let tls_config = server::tls::build_server_config(&cert_pem, &key_pem)?;

            info!(addr = %addr, "listening (https)");
            tokio::select! {
                _ = server::tls::serve(listener, tls_config, router) => {}
                _ = shutdown_signal() => {}
            }
        }
        None => {
            info!(addr = %addr, "listening (http)");
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    info!("paste-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
