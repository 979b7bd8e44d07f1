//! scribe-server: clinical note service binary entrypoint.

use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scribe_server::{config::Config, db::Store};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = Config::from_env();

    let store = match Store::connect(config.database_url.as_deref()).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "Failed to open document store");
            std::process::exit(1);
        }
    };
    tracing::info!(backend = store.backend(), "Document store ready");

    if config.jwt_secret.is_some() {
        tracing::info!("Bearer token authentication enabled");
    } else {
        tracing::warn!("AUTH_JWT_SECRET not set, all /api requests will be rejected");
    }
    if config.anthropic_api_key.is_some() {
        tracing::info!(
            model = %config.anthropic_model,
            "Anthropic API key configured, note generation enabled"
        );
    } else {
        tracing::warn!("ANTHROPIC_API_KEY not set, note generation disabled");
    }
    if config.llm_imaging_extraction {
        tracing::info!("Model-backed imaging extraction requested");
    }
    tracing::info!("Rate limiting: {} requests/second", config.rate_limit_rps);

    let app = scribe_server::build_app(store, &config);

    let addr: SocketAddr = match config.bind_address.parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, address = %config.bind_address, "Invalid bind address");
            std::process::exit(1);
        }
    };
    tracing::info!("Starting scribe server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Failed to bind listener");
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
    }

    tracing::info!("Server shutdown complete");
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
