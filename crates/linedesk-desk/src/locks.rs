// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-case critical sections.
//!
//! Every mutation of a case (status, assignment) and every append to its
//! conversation log runs inside that case's lock, held across the
//! persist+publish pair. This is what guarantees subscribers see a
//! case's messages in persistence order. Cross-case operations never
//! take these locks.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use linedesk_core::types::CaseId;

/// Lazily-created lock per case id. Locks live for the process
/// lifetime; cases are never deleted and an idle mutex is tiny.
#[derive(Default)]
pub struct CaseLocks {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl CaseLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the critical section for one case.
    pub async fn acquire(&self, case_id: CaseId) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(case_id.0)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn same_case_is_mutually_exclusive() {
        let locks = Arc::new(CaseLocks::new());
        let in_section = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let in_section = Arc::clone(&in_section);
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(CaseId(1)).await;
                let concurrent = in_section.fetch_add(1, Ordering::SeqCst);
                assert_eq!(concurrent, 0, "two tasks inside one case's section");
                tokio::task::yield_now().await;
                in_section.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn different_cases_do_not_block_each_other() {
        let locks = CaseLocks::new();
        let _one = locks.acquire(CaseId(1)).await;
        // Acquiring a different case while holding the first must not deadlock.
        let _two = locks.acquire(CaseId(2)).await;
    }
}
