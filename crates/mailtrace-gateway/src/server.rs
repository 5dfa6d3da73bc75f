// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the tracking pixel
//! endpoint and the dashboard REST API.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;

use mailtrace_core::{Mailer, MailtraceError, StorageAdapter, Summarizer};

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Persistence backend.
    pub storage: Arc<dyn StorageAdapter>,
    /// Outbound mail transport.
    pub mailer: Arc<dyn Mailer>,
    /// AI summary generator.
    pub summarizer: Arc<dyn Summarizer>,
    /// Public base URL for minting pixel links.
    pub base_url: String,
    /// Process start time for uptime reporting.
    pub start_time: std::time::Instant,
}

/// Gateway server configuration (mirrors ServerConfig from mailtrace-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the gateway router.
///
/// Routes:
/// - GET  /health
/// - GET  /api/track/{pixel_id}
/// - GET  /api/stats
/// - GET  /api/emails, POST /api/emails
/// - GET  /api/emails/{id}
/// - GET  /api/summaries, POST /api/summaries/generate
/// - GET  /api/notifications, PUT /api/notifications/{id}/read
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/api/track/{pixel_id}", get(handlers::get_tracking_pixel))
        .route("/api/stats", get(handlers::get_stats))
        .route(
            "/api/emails",
            get(handlers::list_emails).post(handlers::send_email),
        )
        .route("/api/emails/{id}", get(handlers::get_email))
        .route("/api/summaries", get(handlers::list_summaries))
        .route("/api/summaries/generate", post(handlers::generate_summary))
        .route("/api/notifications", get(handlers::list_notifications))
        .route(
            "/api/notifications/{id}/read",
            put(handlers::mark_notification_read),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the gateway HTTP server and serve until the task is stopped.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), MailtraceError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MailtraceError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| MailtraceError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
