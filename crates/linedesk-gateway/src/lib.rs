// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/WebSocket admin console gateway.
//!
//! Serves three surfaces over one axum server: webhook ingestion from
//! the messaging platform, the bearer-authenticated console REST API,
//! and the WebSocket realtime feed backed by the event bus.

pub mod auth;
pub mod handlers;
pub mod server;
pub mod ws;

use async_trait::async_trait;
use tokio::sync::Mutex;

use linedesk_core::types::{AdapterKind, HealthStatus};
use linedesk_core::{Adapter, LinedeskError};

pub use auth::{AdminIdentity, Sessions, hash_password, verify_password};
pub use server::{ConsoleState, ServerConfig};

/// The console gateway as a managed adapter.
///
/// `start` runs the axum server as a background task; `shutdown` aborts
/// it. In-flight requests are dropped on shutdown -- every mutation is
/// already durable before its response is written, so nothing is lost.
pub struct ConsoleGateway {
    config: ServerConfig,
    state: ConsoleState,
    server_handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl ConsoleGateway {
    pub fn new(config: ServerConfig, state: ConsoleState) -> Self {
        Self {
            config,
            state,
            server_handle: Mutex::new(None),
        }
    }

    /// Spawn the HTTP server task.
    pub async fn start(&self) -> Result<(), LinedeskError> {
        let config = self.config.clone();
        let state = self.state.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = server::start_server(&config, state).await {
                tracing::error!("console server error: {e}");
            }
        });

        let mut server_handle = self.server_handle.lock().await;
        *server_handle = Some(handle);

        tracing::info!(
            "console gateway started on {}:{}",
            self.config.host,
            self.config.port
        );
        Ok(())
    }
}

#[async_trait]
impl Adapter for ConsoleGateway {
    fn name(&self) -> &str {
        "console-gateway"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, LinedeskError> {
        let handle = self.server_handle.lock().await;
        if handle.is_some() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy("server not started".to_string()))
        }
    }

    async fn shutdown(&self) -> Result<(), LinedeskError> {
        let mut handle = self.server_handle.lock().await;
        if let Some(h) = handle.take() {
            h.abort();
        }
        Ok(())
    }
}
