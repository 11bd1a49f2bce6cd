// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Linedesk workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Surrogate identifier for a case. Assigned by storage, monotonically increasing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CaseId(pub i64);

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Surrogate identifier for a stored message. Strictly increasing in
/// insertion order within a case.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle status of a case.
///
/// `new` covers what some dashboards call "unassigned" -- there is a
/// single initial status. The only way out of `closed` is an explicit
/// reopen, which returns the case to `new` with the assignee cleared.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    New,
    Assigned,
    Closed,
}

/// Who wrote a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    Customer,
    Admin,
}

/// Outbound delivery state for admin messages.
///
/// Customer messages carry no delivery state. Admin messages start as
/// `pending` and flip to `sent` or `failed` after the push attempt; a
/// failed push never un-persists the message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    Pending,
    Sent,
    Failed,
}

/// One customer's ongoing support conversation on one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    /// Stable external identifier of the customer on the messaging platform.
    pub customer_id: String,
    /// Identifier of the LINE Official Account the customer wrote to.
    pub channel_id: String,
    pub status: CaseStatus,
    /// Admin currently handling the case, if assigned.
    pub assignee: Option<String>,
    /// Free-text note attached by admins.
    pub note: Option<String>,
    /// RFC 3339 UTC, assigned by storage at creation time.
    pub created_at: String,
}

/// A persisted conversation message. Immutable once stored, except for
/// the delivery flag on admin messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: MessageId,
    pub case_id: CaseId,
    pub sender: SenderRole,
    pub body: String,
    pub delivery: Option<DeliveryState>,
    /// RFC 3339 UTC, assigned by storage at persistence time -- never
    /// taken from client input.
    pub created_at: String,
}

/// An inbound customer message as delivered by the webhook adapter.
///
/// Signature verification and schema validation happen upstream; by the
/// time an event reaches the desk it is trusted to be well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub customer_id: String,
    pub channel_id: String,
    pub body: String,
    /// Platform receive time, informational only. Persistence timestamps
    /// are always assigned server-side.
    pub received_at: String,
}

/// Filter for case listings. Empty filter lists everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseFilter {
    pub status: Option<CaseStatus>,
    pub channel_id: Option<String>,
}

/// A console admin account. The password is stored as an argon2 hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAccount {
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

/// A canned reply template for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyTemplate {
    pub id: i64,
    pub channel_id: String,
    pub body: String,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter for logging and health reporting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterKind {
    Channel,
    Storage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn case_status_round_trips_through_strings() {
        for status in [CaseStatus::New, CaseStatus::Assigned, CaseStatus::Closed] {
            let s = status.to_string();
            assert_eq!(CaseStatus::from_str(&s).unwrap(), status);
        }
        assert_eq!(CaseStatus::New.to_string(), "new");
        assert_eq!(CaseStatus::Closed.to_string(), "closed");
    }

    #[test]
    fn sender_role_round_trips_through_strings() {
        assert_eq!(SenderRole::Customer.to_string(), "customer");
        assert_eq!(SenderRole::from_str("admin").unwrap(), SenderRole::Admin);
    }

    #[test]
    fn delivery_state_parses_lowercase() {
        assert_eq!(
            DeliveryState::from_str("pending").unwrap(),
            DeliveryState::Pending
        );
        assert_eq!(DeliveryState::Failed.to_string(), "failed");
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&CaseId(42)).unwrap();
        assert_eq!(json, "42");
        let parsed: MessageId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, MessageId(7));
    }

    #[test]
    fn case_serializes_status_lowercase() {
        let case = Case {
            id: CaseId(1),
            customer_id: "U1".into(),
            channel_id: "OA-A".into(),
            status: CaseStatus::New,
            assignee: None,
            note: None,
            created_at: "2026-01-01T00:00:00.000Z".into(),
        };
        let json = serde_json::to_string(&case).unwrap();
        assert!(json.contains("\"status\":\"new\""));
    }
}
