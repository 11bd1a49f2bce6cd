// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `linedesk serve` command implementation.
//!
//! Wires the full console: SQLite storage, event bus, LINE push client,
//! the desk core, and the HTTP/WebSocket gateway, then waits for ctrl-c
//! and shuts everything down in reverse order.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use linedesk_bus::EventBus;
use linedesk_config::LinedeskConfig;
use linedesk_config::model::AuthConfig;
use linedesk_core::types::AdminAccount;
use linedesk_core::{Adapter, DeskStore, LinedeskError, ReplySender};
use linedesk_desk::Desk;
use linedesk_gateway::{ConsoleGateway, ConsoleState, ServerConfig, Sessions};
use linedesk_line::LinePush;
use linedesk_storage::SqliteStore;

/// Runs the `linedesk serve` command.
pub async fn run_serve(config: LinedeskConfig) -> Result<(), LinedeskError> {
    init_tracing(&config.console.log_level);

    info!(console = %config.console.name, "starting linedesk serve");

    // Storage first -- everything else hangs off it.
    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;
    let store: Arc<dyn DeskStore> = store;

    bootstrap_admin(store.as_ref(), &config.auth).await?;

    if config.accounts.is_empty() {
        warn!("no [[accounts]] configured; webhook deliveries will be rejected");
    }

    // Realtime bus and outbound push client.
    let bus = Arc::new(EventBus::new(config.desk.bus_capacity));
    let push: Arc<dyn ReplySender> = Arc::new(LinePush::new(&config.accounts));

    // The desk core.
    let desk = Arc::new(Desk::new(
        Arc::clone(&store),
        Arc::clone(&bus),
        push,
    ));

    let channels: HashMap<String, String> = config
        .accounts
        .iter()
        .map(|a| (a.id.clone(), a.name.clone()))
        .collect();

    let state = ConsoleState {
        desk,
        store: Arc::clone(&store),
        bus,
        sessions: Arc::new(Sessions::new()),
        channels: Arc::new(channels),
        history_limit: config.desk.history_limit,
        started_at: std::time::Instant::now(),
    };

    let gateway = ConsoleGateway::new(
        ServerConfig {
            host: config.server.host.clone(),
            port: config.server.port,
        },
        state,
    );
    gateway.start().await?;

    // Run until interrupted.
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| LinedeskError::Internal(format!("failed to install signal handler: {e}")))?;
    info!("shutdown signal received");

    gateway.shutdown().await?;
    store.close().await?;
    info!("linedesk stopped");
    Ok(())
}

/// Initialize the tracing subscriber. `RUST_LOG` wins over the
/// configured level when set.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Create the configured bootstrap admin when the admins table is empty.
///
/// Keeps a fresh deployment reachable without shell access to the
/// database; a no-op once any admin exists.
async fn bootstrap_admin(store: &dyn DeskStore, auth: &AuthConfig) -> Result<(), LinedeskError> {
    if store.count_admins().await? > 0 {
        return Ok(());
    }
    let (Some(username), Some(password)) =
        (auth.bootstrap_admin.as_ref(), auth.bootstrap_password.as_ref())
    else {
        warn!("no admin accounts exist and no bootstrap admin is configured");
        return Ok(());
    };

    let password_hash = linedesk_gateway::hash_password(password)?;
    store
        .create_admin(&AdminAccount {
            username: username.clone(),
            password_hash,
            role: "super".to_string(),
        })
        .await?;
    info!(%username, "bootstrap admin created");
    Ok(())
}
