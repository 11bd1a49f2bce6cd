// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound push to the LINE Messaging API.
//!
//! One `LinePush` serves every configured Official Account, selecting
//! the channel access token by channel id. Failures are returned to the
//! caller untouched -- the desk records them as delivery flags; nothing
//! here retries.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use linedesk_config::model::AccountConfig;
use linedesk_core::types::{AdapterKind, HealthStatus};
use linedesk_core::{Adapter, LinedeskError, ReplySender};

const LINE_API_BASE: &str = "https://api.line.me";

/// Push-message client for the configured Official Accounts.
pub struct LinePush {
    http: reqwest::Client,
    base_url: String,
    tokens: HashMap<String, String>,
}

impl LinePush {
    /// Build a push client over the configured accounts.
    pub fn new(accounts: &[AccountConfig]) -> Self {
        Self::with_base_url(accounts, LINE_API_BASE)
    }

    /// Build against a different API endpoint (tests point this at a
    /// local mock server).
    pub fn with_base_url(accounts: &[AccountConfig], base_url: &str) -> Self {
        let tokens = accounts
            .iter()
            .map(|a| (a.id.clone(), a.access_token.clone()))
            .collect();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn token_for(&self, channel_id: &str) -> Result<&str, LinedeskError> {
        self.tokens
            .get(channel_id)
            .map(String::as_str)
            .ok_or_else(|| LinedeskError::Channel {
                message: format!("no account configured for channel {channel_id}"),
                source: None,
            })
    }
}

#[async_trait]
impl Adapter for LinePush {
    fn name(&self) -> &str {
        "line-push"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, LinedeskError> {
        if self.tokens.is_empty() {
            Ok(HealthStatus::Degraded("no accounts configured".to_string()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), LinedeskError> {
        Ok(())
    }
}

#[async_trait]
impl ReplySender for LinePush {
    async fn send_text(
        &self,
        channel_id: &str,
        customer_id: &str,
        body: &str,
    ) -> Result<(), LinedeskError> {
        let token = self.token_for(channel_id)?;
        let payload = json!({
            "to": customer_id,
            "messages": [{"type": "text", "text": body}],
        });

        let response = self
            .http
            .post(format!("{}/v2/bot/message/push", self.base_url))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LinedeskError::Channel {
                message: format!("push request to channel {channel_id} failed"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LinedeskError::Channel {
                message: format!("push rejected with {status}: {detail}"),
                source: None,
            });
        }

        debug!(channel_id, customer_id, "push delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn accounts() -> Vec<AccountConfig> {
        vec![AccountConfig {
            id: "OA-A".to_string(),
            name: "Main OA".to_string(),
            access_token: "token-a".to_string(),
        }]
    }

    #[tokio::test]
    async fn push_posts_bearer_token_and_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/bot/message/push"))
            .and(header("authorization", "Bearer token-a"))
            .and(body_partial_json(serde_json::json!({
                "to": "U1",
                "messages": [{"type": "text", "text": "hello back"}],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let push = LinePush::with_base_url(&accounts(), &server.uri());
        push.send_text("OA-A", "U1", "hello back").await.unwrap();
    }

    #[tokio::test]
    async fn rejected_push_surfaces_channel_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/bot/message/push"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"message": "Invalid user ID"})),
            )
            .mount(&server)
            .await;

        let push = LinePush::with_base_url(&accounts(), &server.uri());
        let err = push.send_text("OA-A", "bogus", "hi").await.unwrap_err();
        match err {
            LinedeskError::Channel { message, .. } => {
                assert!(message.contains("400"), "got: {message}");
            }
            other => panic!("expected Channel error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_channel_fails_without_request() {
        let push = LinePush::with_base_url(&accounts(), "http://127.0.0.1:9");
        let err = push.send_text("OA-X", "U1", "hi").await.unwrap_err();
        match err {
            LinedeskError::Channel { message, .. } => {
                assert!(message.contains("OA-X"));
            }
            other => panic!("expected Channel error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn health_degrades_without_accounts() {
        let push = LinePush::new(&[]);
        match push.health_check().await.unwrap() {
            HealthStatus::Degraded(msg) => assert!(msg.contains("no accounts")),
            other => panic!("expected Degraded, got {other:?}"),
        }

        let push = LinePush::new(&accounts());
        assert_eq!(push.health_check().await.unwrap(), HealthStatus::Healthy);
        assert_eq!(push.name(), "line-push");
        assert_eq!(push.kind(), AdapterKind::Channel);
    }
}
