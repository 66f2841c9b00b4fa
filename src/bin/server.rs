//! # Authorization decision-point server
//!
//! HTTP sidecar exposing the in-process decision engine to remote-mode
//! callers.
//!
//! ## Endpoints
//!
//! - `POST /v1/decide` - authorization verdict for a wire input
//! - `GET /health` - backend health surface
//!
//! ## Configuration
//!
//! Environment variables:
//! - `PORT` - listen port (default: 8181)
//! - `RUST_LOG` - log filter (default: info)
//! - `FAIL_OPEN` - allow on engine unreachability (default: false)
//! - `CACHE_TTL_SECONDS` - verdict cache TTL (default: 5)

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use authzd::config::EngineConfig;
use authzd::engine::Engine;
use authzd::server::router;

/// Graceful shutdown on ctrl-c or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C signal"),
        _ = terminate => info!("Received SIGTERM signal"),
    }

    info!("Starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8181);

    // The sidecar always evaluates in-process; remote callers point at it.
    let config = EngineConfig {
        local_mode: true,
        ..EngineConfig::from_env()
    };

    info!("Starting authzd decision point v{}", authzd::VERSION);
    info!("  Port: {}", port);
    info!("  Cache TTL: {}s", config.cache_ttl_seconds);
    info!("  Fail open: {}", config.fail_open);

    let engine = Arc::new(
        Engine::with_builtin_matrix(config).context("failed to initialize decision engine")?,
    );

    // periodic sweep of expired verdicts
    let sweeper = engine.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(30));
        loop {
            interval.tick().await;
            sweeper.sweep_cache();
        }
    });

    let app = router(engine);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Decision point listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shut down gracefully");
    Ok(())
}
