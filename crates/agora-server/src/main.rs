//! Agora server binary.

mod config;
mod telemetry;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use agora_access::{AccessAudit, MemoryDirectory, TokenConfig, TokenManager, TracingAuditSink};
use agora_api::{create_router, AppState, MemoryRoleStore};
use agora_core::{default_catalog, Identity};

use crate::config::ServerConfig;
use crate::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::load().context("Failed to load configuration")?;

    init_telemetry(&config.telemetry).context("Failed to initialize telemetry")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        service = %config.service_name,
        "Starting agora server"
    );

    if config.uses_default_secret() {
        warn!("Using default token secret in non-debug mode!");
    }

    let state = build_app_state(&config)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down gracefully");
    Ok(())
}

/// Builds the application state.
fn build_app_state(config: &ServerConfig) -> Result<Arc<AppState>> {
    let access_ttl = config
        .token
        .access_token_expire_minutes
        .checked_mul(60)
        .context("Access token lifetime overflows")?;
    let refresh_ttl = config
        .token
        .refresh_token_expire_days
        .checked_mul(86400)
        .context("Refresh token lifetime overflows")?;

    let token_config = TokenConfig::new(config.token.secret.clone())
        .with_issuer(config.token.issuer.clone())
        .with_access_ttl(access_ttl)
        .with_refresh_ttl(refresh_ttl);
    let tokens = Arc::new(TokenManager::new(token_config));

    let users: Arc<MemoryDirectory> = Arc::new(config.users.iter().cloned().map(Identity::from).collect());
    info!(count = users.len(), "User directory loaded");

    let roles = Arc::new(MemoryRoleStore::new(users.clone()));
    roles.seed(default_catalog());

    let audit = Arc::new(AccessAudit::new().with_sink(Arc::new(TracingAuditSink)));

    let state = AppState::builder()
        .tokens(tokens)
        .directory(users)
        .roles(roles)
        .audit(audit)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build app state: {}", e))?;

    Ok(Arc::new(state))
}

/// Shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
