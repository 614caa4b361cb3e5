//! clipvault-server — the HTTP edge over the snippet engine.
//!
//! Everything transport-shaped lives here: the axum router, request and
//! response DTOs, the bearer-token auth seam, error-to-status mapping,
//! configuration loading, and process wiring. The engine itself never sees
//! an HTTP type; handlers unwrap the authenticated owner id from request
//! context and call [`clipvault_service::SnippetService`] directly.

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod tracing_setup;

use clipvault_db::Database;
use clipvault_recency::{InMemoryRecencyQueue, RecencyQueue, RedisRecencyQueue};
use clipvault_service::SnippetService;
use config::ServerConfig;
use std::sync::Arc;
use std::time::Duration;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SnippetService>,
    pub verifier: Arc<dyn auth::AuthVerifier>,
}

/// Wire up the engine from configuration and run the server until a
/// shutdown signal arrives.
pub async fn try_main(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect(&config.database_url).await?;

    // Seed the accounts the static token table references so their foreign
    // keys resolve. A real deployment replaces the verifier wholesale.
    for seed in config.auth.tokens.values() {
        db.ensure_user(
            clipvault_core::UserId(seed.id),
            &seed.email,
            if seed.elevated {
                clipvault_core::UserRole::Elevated
            } else {
                clipvault_core::UserRole::Ordinary
            },
        )
        .await?;
    }

    let queue: Arc<dyn RecencyQueue> = match &config.redis_url {
        Some(url) => Arc::new(
            RedisRecencyQueue::connect(
                url,
                config.engine.recency_cap,
                Duration::from_millis(config.queue_op_timeout_ms),
            )
            .await?,
        ),
        None => {
            tracing::info!("no redis_url configured, using in-process recency queue");
            Arc::new(InMemoryRecencyQueue::new(config.engine.recency_cap))
        }
    };

    let service = Arc::new(SnippetService::new(
        db,
        queue,
        config.engine.clone(),
        config.scheduler_queue_depth,
    ));
    let verifier: Arc<dyn auth::AuthVerifier> =
        Arc::new(auth::StaticTokenVerifier::from_config(&config.auth));

    let state = AppState {
        service: service.clone(),
        verifier,
    };
    let app = routes::router(state, &config.engine);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "clipvault listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain queued processing jobs before the process exits.
    service.shutdown().await;
    tracing::info!("clipvault stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => tracing::warn!(error = %e, "could not install SIGTERM handler"),
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
