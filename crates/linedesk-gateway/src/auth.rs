// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session authentication for the console API.
//!
//! Admins log in with username/password (argon2-verified against the
//! admins table) and receive an opaque bearer token held in an
//! in-memory session map. The middleware is fail-closed: a request
//! without a valid token is rejected.

use std::sync::Arc;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use rand::RngCore;

use linedesk_core::LinedeskError;

/// The admin identity behind an authenticated request. Inserted into
/// request extensions by the middleware; handlers read it to know who
/// is acting.
#[derive(Clone)]
pub struct AdminIdentity {
    pub username: String,
    pub role: String,
}

impl std::fmt::Debug for AdminIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminIdentity")
            .field("username", &self.username)
            .field("role", &self.role)
            .finish()
    }
}

/// In-memory token -> identity map. Tokens live until process restart;
/// there is no persistence and no expiry beyond that.
#[derive(Default)]
pub struct Sessions {
    tokens: DashMap<String, AdminIdentity>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh opaque token for an authenticated admin.
    pub fn issue(&self, identity: AdminIdentity) -> String {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let token = hex::encode(bytes);
        self.tokens.insert(token.clone(), identity);
        token
    }

    /// Resolve a bearer token to its admin identity.
    pub fn resolve(&self, token: &str) -> Option<AdminIdentity> {
        self.tokens.get(token).map(|entry| entry.clone())
    }

    /// Drop a token (logout).
    pub fn revoke(&self, token: &str) {
        self.tokens.remove(token);
    }
}

/// Hash a password for storage with argon2id and a fresh salt.
pub fn hash_password(plain: &str) -> Result<String, LinedeskError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| LinedeskError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored argon2 hash.
pub fn verify_password(stored_hash: &str, plain: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Middleware that validates the `Authorization: Bearer <token>` header
/// against the session map and attaches the admin identity to the
/// request. Requests without a valid token are rejected (fail-closed).
pub async fn auth_middleware(
    State(sessions): State<Arc<Sessions>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if let Some(token) = token {
        if let Some(identity) = sessions.resolve(token) {
            request.extensions_mut().insert(identity);
            return Ok(next.run(request).await);
        }
    }

    Err(StatusCode::UNAUTHORIZED)
}
