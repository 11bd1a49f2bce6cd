// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook envelope mapping.
//!
//! Parses the (already signature-verified) LINE webhook body and
//! extracts the text message events the desk cares about. Non-message
//! events and non-text messages (stickers, images, follows, ...) are
//! dropped with a debug log.

use serde::Deserialize;
use tracing::debug;

use linedesk_core::types::InboundEvent;

/// The webhook request body: a batch of events for one bot.
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    /// Bot user id the events were sent to. Unused for routing -- the
    /// webhook URL path carries the channel id.
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// One webhook event. Only `type == "message"` events carry a message.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    /// Epoch milliseconds at which the platform received the event.
    #[serde(default)]
    pub timestamp: i64,
    pub source: Option<EventSource>,
    pub message: Option<EventMessage>,
}

/// Where the event came from (user, group, or room).
#[derive(Debug, Deserialize)]
pub struct EventSource {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// The message payload of a message event.
#[derive(Debug, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: String,
    pub text: Option<String>,
}

/// Extract the text message events from an envelope as desk inbound
/// events for `channel_id`.
pub fn text_events(envelope: &WebhookEnvelope, channel_id: &str) -> Vec<InboundEvent> {
    let mut out = Vec::new();
    for event in &envelope.events {
        if event.kind != "message" {
            debug!(kind = %event.kind, "ignoring non-message webhook event");
            continue;
        }
        let message = match &event.message {
            Some(m) if m.kind == "text" => m,
            Some(m) => {
                debug!(kind = %m.kind, "ignoring non-text message");
                continue;
            }
            None => continue,
        };
        let (user_id, text) = match (
            event.source.as_ref().and_then(|s| s.user_id.as_deref()),
            message.text.as_deref(),
        ) {
            (Some(u), Some(t)) => (u, t),
            _ => continue,
        };
        out.push(InboundEvent {
            customer_id: user_id.to_string(),
            channel_id: channel_id.to_string(),
            body: text.to_string(),
            received_at: millis_to_rfc3339(event.timestamp),
        });
    }
    out
}

fn millis_to_rfc3339(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
