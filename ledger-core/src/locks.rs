//! Per-account lock table
//!
//! Submissions touching the same account must not race on its balance, but
//! a single global lock would serialize unrelated accounts. This table
//! hands out one async mutex per account id; multi-account operations
//! acquire their guards in sorted id order so two transfers with opposite
//! party order cannot deadlock.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Lock table keyed by account id
#[derive(Default)]
pub(crate) struct AccountLocks {
    table: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self {
            table: DashMap::new(),
        }
    }

    fn lock_for(&self, account_id: Uuid) -> Arc<Mutex<()>> {
        self.table
            .entry(account_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquire guards for every named account, sorted and deduplicated.
    /// Guards release on drop, after the storage commit.
    pub async fn acquire(&self, account_ids: &[Uuid]) -> Vec<OwnedMutexGuard<()>> {
        let mut ids: Vec<Uuid> = account_ids.to_vec();
        ids.sort();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.lock_for(id).lock_owned().await);
        }
        guards
    }
}
