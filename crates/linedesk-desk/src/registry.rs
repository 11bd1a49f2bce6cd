// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The case registry: resolves incoming activity to exactly one case and
//! manages assignment.
//!
//! The registry is the only writer of case status and assignment. Every
//! mutation publishes a desk-wide lifecycle event after (and only after)
//! the row is durably updated.

use std::sync::Arc;

use tracing::{debug, info};

use linedesk_bus::{DeskEvent, EventBus};
use linedesk_core::types::{Case, CaseFilter, CaseId, CaseStatus};
use linedesk_core::{DeskStore, LinedeskError};

use crate::locks::CaseLocks;

pub struct CaseRegistry {
    store: Arc<dyn DeskStore>,
    bus: Arc<EventBus>,
    locks: Arc<CaseLocks>,
}

impl CaseRegistry {
    pub fn new(store: Arc<dyn DeskStore>, bus: Arc<EventBus>, locks: Arc<CaseLocks>) -> Self {
        Self { store, bus, locks }
    }

    /// Resolve the open case for (customer, channel), creating one when
    /// none exists.
    ///
    /// Atomic with respect to concurrent inbound events for the same
    /// customer: the storage layer runs lookup+insert on its single
    /// writer thread, so near-simultaneous messages resolve to the same
    /// case. A `CaseOpened` event is broadcast to all admins on creation.
    pub async fn resolve_or_create(
        &self,
        customer_id: &str,
        channel_id: &str,
    ) -> Result<Case, LinedeskError> {
        let (case, created) = self
            .store
            .resolve_or_create_case(customer_id, channel_id)
            .await?;
        if created {
            info!(case_id = %case.id, customer_id, channel_id, "case opened");
            self.bus.publish_desk(DeskEvent::CaseOpened { case: case.clone() });
        } else {
            debug!(case_id = %case.id, customer_id, "resolved existing case");
        }
        Ok(case)
    }

    /// Assign (or re-assign, last writer wins) a case to an admin.
    ///
    /// Transitions `new -> assigned` or keeps `assigned` with the new
    /// admin. Re-assignment also emits a change notification.
    pub async fn assign(&self, case_id: CaseId, admin: &str) -> Result<Case, LinedeskError> {
        let _guard = self.locks.acquire(case_id).await;
        match self.store.assign_case(case_id, admin).await? {
            Some(case) => {
                info!(case_id = %case_id, admin, "case assigned");
                self.bus
                    .publish_desk(DeskEvent::CaseAssigned { case: case.clone() });
                Ok(case)
            }
            None => Err(LinedeskError::CaseNotFound { case_id: case_id.0 }),
        }
    }

    /// Replace the free-text note on a case.
    pub async fn set_note(&self, case_id: CaseId, note: &str) -> Result<Case, LinedeskError> {
        let _guard = self.locks.acquire(case_id).await;
        match self.store.set_case_note(case_id, note).await? {
            Some(case) => {
                self.bus
                    .publish_desk(DeskEvent::NoteUpdated { case: case.clone() });
                Ok(case)
            }
            None => Err(LinedeskError::CaseNotFound { case_id: case_id.0 }),
        }
    }

    /// Close a case. Closing an already-closed case is a no-op that
    /// returns the case unchanged.
    pub async fn close(&self, case_id: CaseId) -> Result<Case, LinedeskError> {
        let _guard = self.locks.acquire(case_id).await;
        let current = self
            .store
            .get_case(case_id)
            .await?
            .ok_or(LinedeskError::CaseNotFound { case_id: case_id.0 })?;
        if current.status == CaseStatus::Closed {
            return Ok(current);
        }
        match self
            .store
            .set_case_status(case_id, CaseStatus::Closed, false)
            .await?
        {
            Some(case) => {
                info!(case_id = %case_id, "case closed");
                self.bus
                    .publish_desk(DeskEvent::CaseClosed { case: case.clone() });
                Ok(case)
            }
            None => Err(LinedeskError::CaseNotFound { case_id: case_id.0 }),
        }
    }

    /// Explicitly reopen a closed case, returning it to `new` with the
    /// assignee cleared. Reopening a case that is not closed is a no-op.
    ///
    /// If the customer opened a fresh case since this one was closed,
    /// the open-case unique index rejects the transition and the error
    /// propagates as a storage failure.
    pub async fn reopen(&self, case_id: CaseId) -> Result<Case, LinedeskError> {
        let _guard = self.locks.acquire(case_id).await;
        let current = self
            .store
            .get_case(case_id)
            .await?
            .ok_or(LinedeskError::CaseNotFound { case_id: case_id.0 })?;
        if current.status != CaseStatus::Closed {
            return Ok(current);
        }
        match self
            .store
            .set_case_status(case_id, CaseStatus::New, true)
            .await?
        {
            Some(case) => {
                info!(case_id = %case_id, "case reopened");
                self.bus
                    .publish_desk(DeskEvent::CaseReopened { case: case.clone() });
                Ok(case)
            }
            None => Err(LinedeskError::CaseNotFound { case_id: case_id.0 }),
        }
    }

    /// List cases newest-first, optionally filtered by status/channel.
    pub async fn list(&self, filter: &CaseFilter) -> Result<Vec<Case>, LinedeskError> {
        self.store.list_cases(filter).await
    }

    /// Get one case by id.
    pub async fn get(&self, case_id: CaseId) -> Result<Option<Case>, LinedeskError> {
        self.store.get_case(case_id).await
    }
}
