// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Linedesk -- a customer-service console for LINE Official Accounts.
//!
//! This is the binary entry point for the console.

mod serve;

use clap::{Parser, Subcommand};

use linedesk_core::LinedeskError;
use linedesk_core::types::AdminAccount;
use linedesk_core::{Adapter, DeskStore};
use linedesk_storage::SqliteStore;

/// Linedesk -- a customer-service console for LINE Official Accounts.
#[derive(Parser, Debug)]
#[command(name = "linedesk", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the console server.
    Serve,
    /// Manage console admin accounts.
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
    /// Print the resolved configuration.
    Config,
}

#[derive(Subcommand, Debug)]
enum AdminCommands {
    /// Create an admin account (prompts for the password).
    Add {
        /// Login name of the new admin.
        username: String,
        /// Role stored for the account.
        #[arg(long, default_value = "admin")]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match linedesk_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            linedesk_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Admin {
            command: AdminCommands::Add { username, role },
        }) => run_admin_add(config, username, role).await,
        Some(Commands::Config) => {
            match toml::to_string_pretty(&config) {
                Ok(rendered) => {
                    println!("{rendered}");
                    Ok(())
                }
                Err(e) => Err(LinedeskError::Internal(format!(
                    "failed to render config: {e}"
                ))),
            }
        }
        None => {
            println!("linedesk: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Create an admin account against the configured database.
async fn run_admin_add(
    config: linedesk_config::LinedeskConfig,
    username: String,
    role: String,
) -> Result<(), LinedeskError> {
    let store = SqliteStore::new(config.storage.clone());
    store.initialize().await?;

    let password = rpassword::prompt_password(format!("Password for {username}: "))
        .map_err(|e| LinedeskError::Internal(format!("failed to read password: {e}")))?;
    if password.trim().is_empty() {
        return Err(LinedeskError::Config("password must not be empty".into()));
    }

    let password_hash = linedesk_gateway::hash_password(&password)?;
    store
        .create_admin(&AdminAccount {
            username: username.clone(),
            password_hash,
            role,
        })
        .await?;
    store.shutdown().await?;

    println!("admin `{username}` created");
    Ok(())
}
