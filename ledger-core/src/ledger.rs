//! Main ledger orchestration layer
//!
//! This module ties together storage, the account store, and the lock
//! table into a high-level API for transaction processing.
//!
//! # Example
//!
//! ```no_run
//! use waste_ledger_core::{Config, Ledger};
//!
//! #[tokio::main]
//! async fn main() -> waste_ledger_core::Result<()> {
//!     let config = Config::default();
//!     let ledger = Ledger::open(config)?;
//!
//!     // Submit an entry
//!     // let entry = ledger.submit(request).await?;
//!
//!     Ok(())
//! }
//! ```

use crate::{
    accounts::AccountStore,
    config::ReturnPolicy,
    error::{Error, Result},
    locks::AccountLocks,
    metrics::Metrics,
    reports,
    request::EntryRequest,
    storage::Storage,
    types::{AccountStats, Entry, ReportFilter, ReportSnapshot, StoredAccount, TransactionType},
    Config,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Main ledger interface
pub struct Ledger {
    /// Shared storage
    storage: Arc<Storage>,

    /// Per-account lock table
    locks: Arc<AccountLocks>,

    /// Account store sharing storage and locks
    accounts: AccountStore,

    /// Prometheus collectors
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl Ledger {
    /// Open ledger with configuration
    pub fn open(config: Config) -> Result<Self> {
        let storage = Arc::new(Storage::open(&config)?);
        let locks = Arc::new(AccountLocks::new());
        let accounts = AccountStore::new(storage.clone(), locks.clone());
        let metrics = Metrics::new()?;

        Ok(Self {
            storage,
            locks,
            accounts,
            metrics,
            config,
        })
    }

    /// Account store
    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    /// Metrics collectors
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Submit a new entry
    ///
    /// Validates the request, serializes against other submissions touching
    /// the same accounts, applies balance deltas and persists the entry as
    /// one atomic commit. No mutation survives a validation failure.
    pub async fn submit(&self, request: EntryRequest) -> Result<Entry> {
        let started = Instant::now();
        let deadline = started + Duration::from_millis(self.config.storage.op_timeout_ms);

        let result = self.submit_inner(request, deadline).await;

        match &result {
            Ok(entry) => {
                self.metrics
                    .entries_total
                    .with_label_values(&[entry.transaction_type.as_str()])
                    .inc();
                self.metrics
                    .submit_duration
                    .observe(started.elapsed().as_secs_f64());
            }
            Err(_) => self.metrics.rejections_total.inc(),
        }

        result
    }

    async fn submit_inner(&self, request: EntryRequest, deadline: Instant) -> Result<Entry> {
        let (source_id, target_id) = self.resolve_parties(&request)?;

        let mut party_ids = vec![source_id];
        if let Some(target) = target_id {
            party_ids.push(target);
        }
        let _guards = self.locks.acquire(&party_ids).await;

        // A missing source is indistinguishable from a wrong PIN to the
        // caller; the entry endpoint must not reveal which ids exist.
        let mut source = self
            .storage
            .try_get_account(source_id)?
            .ok_or(Error::AuthenticationFailed)?;

        if !source.account.is_eligible() {
            return Err(Error::AccountNotEligible(source_id.to_string()));
        }

        let mut target = match target_id {
            Some(id) => {
                let stored = self.storage.get_account(id)?;
                if !stored.account.is_eligible() {
                    return Err(Error::AccountNotEligible(id.to_string()));
                }
                Some(stored)
            }
            None => None,
        };

        if !source.verify_pin(&request.pin) {
            return Err(Error::AuthenticationFailed);
        }

        let base_units = request.quantities.base_units();
        if base_units == 0 {
            return Err(Error::EmptyEntry);
        }
        let delta = base_units as i64;

        match request.transaction_type {
            TransactionType::Supply => source.account.stock += delta,
            TransactionType::Transfer => {
                source.account.stock -= delta;
                if let Some(ref mut target) = target {
                    target.account.stock += delta;
                }
            }
            // The returned quantity exits circulation; a targeted disposal
            // sink is recorded but receives no stock.
            TransactionType::Return => source.account.stock -= delta,
        }

        let now = Utc::now();
        let entry = Entry {
            id: Uuid::now_v7(),
            transaction_type: request.transaction_type,
            source_account_id: source_id,
            target_account_id: target_id,
            product_group: request.product_group,
            product_name: request.product_name,
            quantities: request.quantities,
            base_units,
            entry_date: request.entry_date.unwrap_or(now),
            created_at: now,
            reversed: false,
        };

        // All mutations land in the commit below; aborting here leaves no
        // partial state.
        if Instant::now() >= deadline {
            return Err(Error::StorageTimeout);
        }

        let mut touched: Vec<&StoredAccount> = vec![&source];
        if let Some(ref target) = target {
            touched.push(target);
        }
        self.storage.commit_entry(&entry, &touched)?;

        tracing::info!(
            entry_id = %entry.id,
            transaction_type = %entry.transaction_type,
            source_account_id = %source_id,
            base_units,
            "Entry submitted"
        );

        Ok(entry)
    }

    /// Type-specific party shape rules
    fn resolve_parties(&self, request: &EntryRequest) -> Result<(Uuid, Option<Uuid>)> {
        let source = request
            .source_account_id
            .ok_or_else(|| Error::MissingParty("source_account_id is required".to_string()))?;

        match request.transaction_type {
            TransactionType::Supply => {
                if request.target_account_id.is_some() {
                    return Err(Error::MissingParty(
                        "supply adds to the source's own stock and takes no target".to_string(),
                    ));
                }
                Ok((source, None))
            }
            TransactionType::Transfer => {
                let target = request.target_account_id.ok_or_else(|| {
                    Error::MissingParty("transfer requires target_account_id".to_string())
                })?;
                Ok((source, Some(target)))
            }
            TransactionType::Return => match self.config.return_policy {
                ReturnPolicy::TerminalSink => {
                    if request.target_account_id.is_some() {
                        return Err(Error::MissingParty(
                            "return takes no target under the terminal-sink policy".to_string(),
                        ));
                    }
                    Ok((source, None))
                }
                ReturnPolicy::Targeted => {
                    let target = request.target_account_id.ok_or_else(|| {
                        Error::MissingParty(
                            "return requires a disposal target under the targeted policy"
                                .to_string(),
                        )
                    })?;
                    Ok((source, Some(target)))
                }
            },
        }
    }

    /// Reverse a committed entry
    ///
    /// Inverts the entry's balance effect exactly once and annotates the
    /// record; the entry itself is never deleted. A second reversal of the
    /// same entry fails with `AlreadyReversed`.
    pub async fn reverse(&self, entry_id: Uuid) -> Result<Entry> {
        let deadline = Instant::now() + Duration::from_millis(self.config.storage.op_timeout_ms);

        // First read only discovers the parties to lock
        let entry = self.storage.get_entry(entry_id)?;

        let mut party_ids = vec![entry.source_account_id];
        if let Some(target) = entry.target_account_id {
            party_ids.push(target);
        }
        let _guards = self.locks.acquire(&party_ids).await;

        // Re-read under the locks; exactly one concurrent reversal wins
        let mut entry = self.storage.get_entry(entry_id)?;
        if entry.reversed {
            return Err(Error::AlreadyReversed(entry_id.to_string()));
        }

        let delta = entry.base_units as i64;

        // Inverse deltas. Tombstoned parties are skipped: a deleted account
        // cannot regain or lose stock, but history is still annotated.
        let mut source = self.storage.try_get_account(entry.source_account_id)?;
        let mut target = match entry.target_account_id {
            Some(id) => self.storage.try_get_account(id)?,
            None => None,
        };

        match entry.transaction_type {
            TransactionType::Supply => {
                if let Some(ref mut source) = source {
                    source.account.stock -= delta;
                }
            }
            TransactionType::Transfer => {
                if let Some(ref mut source) = source {
                    source.account.stock += delta;
                }
                if let Some(ref mut target) = target {
                    target.account.stock -= delta;
                }
            }
            TransactionType::Return => {
                if let Some(ref mut source) = source {
                    source.account.stock += delta;
                }
            }
        }

        entry.reversed = true;

        if Instant::now() >= deadline {
            return Err(Error::StorageTimeout);
        }

        let mut touched: Vec<&StoredAccount> = Vec::new();
        if let Some(ref source) = source {
            touched.push(source);
        }
        if let Some(ref target) = target {
            touched.push(target);
        }
        self.storage.commit_entry(&entry, &touched)?;

        self.metrics.reversals_total.inc();

        tracing::info!(
            entry_id = %entry.id,
            transaction_type = %entry.transaction_type,
            base_units = entry.base_units,
            "Entry reversed"
        );

        Ok(entry)
    }

    /// Get entry by ID
    pub fn get_entry(&self, entry_id: Uuid) -> Result<Entry> {
        self.storage.get_entry(entry_id)
    }

    /// All entries, newest first
    pub fn entries(&self) -> Result<Vec<Entry>> {
        self.storage.list_entries()
    }

    /// Entries where the account appears as source or target, newest first
    pub fn entries_for_account(&self, account_id: Uuid) -> Result<Vec<Entry>> {
        let entries = self.storage.list_entries()?;
        Ok(entries
            .into_iter()
            .filter(|e| {
                e.source_account_id == account_id || e.target_account_id == Some(account_id)
            })
            .collect())
    }

    /// Derive summary statistics from the entry log
    pub fn compute_stats(&self, filter: &ReportFilter) -> Result<ReportSnapshot> {
        reports::compute_stats(&self.storage, filter)
    }

    /// Derive one account's activity summary
    pub fn account_stats(&self, account_id: Uuid) -> Result<AccountStats> {
        reports::account_stats(&self.storage, account_id)
    }
}
