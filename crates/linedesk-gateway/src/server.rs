// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Console HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. Three route groups:
//! public (health, login, webhook ingestion), the bearer-authenticated
//! `/v1` console API, and the WebSocket endpoint (authenticated during
//! the handshake via query token, not middleware).

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use linedesk_bus::EventBus;
use linedesk_core::{DeskStore, LinedeskError};
use linedesk_desk::Desk;

use crate::auth::{Sessions, auth_middleware};
use crate::handlers;
use crate::ws;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct ConsoleState {
    /// The desk core (registry + log + outbound reply).
    pub desk: Arc<Desk>,
    /// Direct store access for admin accounts and templates.
    pub store: Arc<dyn DeskStore>,
    /// Realtime event bus feeding WebSocket subscribers.
    pub bus: Arc<EventBus>,
    /// Login session tokens.
    pub sessions: Arc<Sessions>,
    /// Known channel ids -> display names, from the account registry.
    pub channels: Arc<HashMap<String, String>>,
    /// Default limit for the recent-messages summary view.
    pub history_limit: i64,
    /// Process start time for uptime reporting.
    pub started_at: std::time::Instant,
}

/// Server bind configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the console router over the given state.
pub fn router(state: ConsoleState) -> Router {
    // Public routes: health for probes, login to obtain a token, and the
    // webhook -- its authenticity is established upstream by the
    // signature-verifying front adapter.
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/v1/login", post(handlers::post_login))
        .route("/webhook/{channel_id}", post(handlers::post_webhook))
        .with_state(state.clone());

    // Console API requiring a session token.
    let api_routes = Router::new()
        .route("/v1/logout", post(handlers::post_logout))
        .route("/v1/cases", get(handlers::get_cases))
        .route("/v1/cases/{id}/assign", post(handlers::post_assign))
        .route("/v1/cases/{id}/note", post(handlers::post_note))
        .route("/v1/cases/{id}/close", post(handlers::post_close))
        .route("/v1/cases/{id}/reopen", post(handlers::post_reopen))
        .route("/v1/cases/{id}/messages", get(handlers::get_history))
        .route("/v1/cases/{id}/recent", get(handlers::get_recent))
        .route("/v1/cases/{id}/reply", post(handlers::post_reply))
        .route(
            "/v1/templates",
            get(handlers::get_templates).post(handlers::post_template),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state.sessions),
            auth_middleware,
        ))
        .with_state(state.clone());

    // WebSocket route (auth happens during handshake, not via middleware).
    let ws_routes = Router::new()
        .route("/ws", get(ws::ws_handler))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .merge(ws_routes)
        .layer(CorsLayer::permissive())
}

/// Start the console HTTP/WebSocket server.
pub async fn start_server(config: &ServerConfig, state: ConsoleState) -> Result<(), LinedeskError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LinedeskError::Channel {
            message: format!("failed to bind console to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("console server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| LinedeskError::Channel {
            message: format!("console server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
