// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the console REST API and webhook ingestion.

use std::str::FromStr;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use linedesk_core::LinedeskError;
use linedesk_core::types::{Case, CaseFilter, CaseId, CaseStatus, ReplyTemplate, StoredMessage};
use linedesk_line::WebhookEnvelope;

use crate::auth::{AdminIdentity, verify_password};
use crate::server::ConsoleState;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// Map a desk error onto the HTTP status taxonomy.
pub(crate) fn error_response(err: LinedeskError) -> Response {
    let status = match &err {
        LinedeskError::CaseNotFound { .. } | LinedeskError::UnknownCase { .. } => {
            StatusCode::NOT_FOUND
        }
        LinedeskError::DuplicateOpenCase { .. } => StatusCode::CONFLICT,
        LinedeskError::Storage { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

// --- Health ---

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /health -- public liveness probe.
pub async fn get_health(State(state): State<ConsoleState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

// --- Login / logout ---

/// Request body for POST /v1/login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response body for POST /v1/login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
}

/// POST /v1/login -- verify credentials, issue a session token.
pub async fn post_login(
    State(state): State<ConsoleState>,
    Json(body): Json<LoginRequest>,
) -> Response {
    let admin = match state.store.get_admin(&body.username).await {
        Ok(admin) => admin,
        Err(e) => return error_response(e),
    };

    match admin {
        Some(admin) if verify_password(&admin.password_hash, &body.password) => {
            let token = state.sessions.issue(AdminIdentity {
                username: admin.username.clone(),
                role: admin.role.clone(),
            });
            debug!(username = %admin.username, "admin logged in");
            (
                StatusCode::OK,
                Json(LoginResponse {
                    token,
                    role: admin.role,
                }),
            )
                .into_response()
        }
        _ => {
            warn!(username = %body.username, "rejected login attempt");
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "invalid credentials".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// POST /v1/logout -- revoke the presented session token.
pub async fn post_logout(State(state): State<ConsoleState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        state.sessions.revoke(token);
    }
    StatusCode::NO_CONTENT
}

// --- Cases ---

/// Query parameters for GET /v1/cases.
#[derive(Debug, Default, Deserialize)]
pub struct CaseListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
}

/// Response body for GET /v1/cases.
#[derive(Debug, Serialize)]
pub struct CaseListResponse {
    pub cases: Vec<Case>,
}

/// GET /v1/cases -- newest-first listing with optional filters.
pub async fn get_cases(
    State(state): State<ConsoleState>,
    Query(query): Query<CaseListQuery>,
) -> Response {
    let status = match query.status.as_deref() {
        Some(raw) => match CaseStatus::from_str(raw) {
            Ok(status) => Some(status),
            Err(_) => return bad_request(format!("unknown status `{raw}`")),
        },
        None => None,
    };
    let filter = CaseFilter {
        status,
        channel_id: query.channel,
    };

    match state.desk.registry().list(&filter).await {
        Ok(cases) => (StatusCode::OK, Json(CaseListResponse { cases })).into_response(),
        Err(e) => error_response(e),
    }
}

/// Request body for POST /v1/cases/{id}/assign.
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    /// Admin the case is handed to (not necessarily the caller).
    pub admin: String,
}

/// POST /v1/cases/{id}/assign
pub async fn post_assign(
    State(state): State<ConsoleState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<AdminIdentity>,
    Json(body): Json<AssignRequest>,
) -> Response {
    debug!(case_id = id, by = %identity.username, to = %body.admin, "assign requested");
    match state.desk.registry().assign(CaseId(id), &body.admin).await {
        Ok(case) => (StatusCode::OK, Json(case)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Request body for POST /v1/cases/{id}/note.
#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub note: String,
}

/// POST /v1/cases/{id}/note
pub async fn post_note(
    State(state): State<ConsoleState>,
    Path(id): Path<i64>,
    Json(body): Json<NoteRequest>,
) -> Response {
    match state.desk.registry().set_note(CaseId(id), &body.note).await {
        Ok(case) => (StatusCode::OK, Json(case)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /v1/cases/{id}/close
pub async fn post_close(State(state): State<ConsoleState>, Path(id): Path<i64>) -> Response {
    match state.desk.registry().close(CaseId(id)).await {
        Ok(case) => (StatusCode::OK, Json(case)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /v1/cases/{id}/reopen
pub async fn post_reopen(State(state): State<ConsoleState>, Path(id): Path<i64>) -> Response {
    match state.desk.registry().reopen(CaseId(id)).await {
        Ok(case) => (StatusCode::OK, Json(case)).into_response(),
        Err(e) => error_response(e),
    }
}

// --- Messages ---

/// Query parameters for history/recent endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Response body for message listings.
#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<StoredMessage>,
}

/// GET /v1/cases/{id}/messages -- chronological history, oldest first.
pub async fn get_history(
    State(state): State<ConsoleState>,
    Path(id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Response {
    match state.desk.log().history(CaseId(id), query.limit).await {
        Ok(messages) => (StatusCode::OK, Json(MessageListResponse { messages })).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /v1/cases/{id}/recent -- newest-first summary view.
pub async fn get_recent(
    State(state): State<ConsoleState>,
    Path(id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(state.history_limit);
    match state.desk.log().recent(CaseId(id), limit).await {
        Ok(messages) => (StatusCode::OK, Json(MessageListResponse { messages })).into_response(),
        Err(e) => error_response(e),
    }
}

/// Request body for POST /v1/cases/{id}/reply.
#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub body: String,
}

/// POST /v1/cases/{id}/reply -- append an admin message and push it to
/// the customer. The stored message is returned with its delivery flag
/// so the UI can show a failed push distinctly.
pub async fn post_reply(
    State(state): State<ConsoleState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<AdminIdentity>,
    Json(body): Json<ReplyRequest>,
) -> Response {
    debug!(case_id = id, admin = %identity.username, "reply requested");
    match state.desk.reply(CaseId(id), &body.body).await {
        Ok(message) => (StatusCode::OK, Json(message)).into_response(),
        Err(e) => error_response(e),
    }
}

// --- Templates ---

/// Query parameters for GET /v1/templates.
#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    pub channel: String,
}

/// Response body for GET /v1/templates.
#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<ReplyTemplate>,
}

/// GET /v1/templates?channel=
pub async fn get_templates(
    State(state): State<ConsoleState>,
    Query(query): Query<TemplateQuery>,
) -> Response {
    match state.store.list_templates(&query.channel).await {
        Ok(templates) => {
            (StatusCode::OK, Json(TemplateListResponse { templates })).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Request body for POST /v1/templates.
#[derive(Debug, Deserialize)]
pub struct TemplateRequest {
    pub channel_id: String,
    pub body: String,
}

/// POST /v1/templates
pub async fn post_template(
    State(state): State<ConsoleState>,
    Json(body): Json<TemplateRequest>,
) -> Response {
    if !state.channels.contains_key(&body.channel_id) {
        return bad_request(format!("unknown channel `{}`", body.channel_id));
    }
    match state.store.add_template(&body.channel_id, &body.body).await {
        Ok(template) => (StatusCode::CREATED, Json(template)).into_response(),
        Err(e) => error_response(e),
    }
}

// --- Webhook ingestion ---

/// POST /webhook/{channel_id}
///
/// Accepts the LINE webhook envelope for one Official Account. The
/// request reaching this handler is assumed already signature-verified
/// by the fronting adapter; only the channel id is validated here.
pub async fn post_webhook(
    State(state): State<ConsoleState>,
    Path(channel_id): Path<String>,
    Json(envelope): Json<WebhookEnvelope>,
) -> Response {
    if !state.channels.contains_key(&channel_id) {
        warn!(%channel_id, "webhook for unknown channel");
        return bad_request(format!("unknown channel `{channel_id}`"));
    }

    let events = linedesk_line::text_events(&envelope, &channel_id);
    debug!(%channel_id, count = events.len(), "webhook events received");

    for event in &events {
        if let Err(e) = state.desk.ingest(event).await {
            // Nothing was persisted or published for the failed event;
            // the platform will redeliver on a non-2xx response.
            warn!(%channel_id, error = %e, "webhook ingest failed");
            return error_response(e);
        }
    }

    (StatusCode::OK, "OK").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_deserializes() {
        let json = r#"{"username": "alice", "password": "hunter2"}"#;
        let req: LoginRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.username, "alice");
        assert_eq!(req.password, "hunter2");
    }

    #[test]
    fn case_list_query_fields_are_optional() {
        let query: CaseListQuery = serde_json::from_str("{}").unwrap();
        assert!(query.status.is_none());
        assert!(query.channel.is_none());

        let query: CaseListQuery =
            serde_json::from_str(r#"{"status": "new", "channel": "OA-A"}"#).unwrap();
        assert_eq!(query.status.as_deref(), Some("new"));
        assert_eq!(query.channel.as_deref(), Some("OA-A"));
    }

    #[test]
    fn error_response_serializes() {
        let resp = ErrorResponse {
            error: "something went wrong".to_string(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("something went wrong"));
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"uptime_secs\":42"));
    }

    #[test]
    fn error_taxonomy_maps_to_http_statuses() {
        let resp = error_response(LinedeskError::CaseNotFound { case_id: 1 });
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = error_response(LinedeskError::UnknownCase { case_id: 1 });
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = error_response(LinedeskError::DuplicateOpenCase {
            customer_id: "U1".into(),
            channel_id: "OA-A".into(),
        });
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = error_response(LinedeskError::Storage {
            source: "down".into(),
        });
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = error_response(LinedeskError::Internal("bug".into()));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
