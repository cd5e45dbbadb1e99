//! Account store and lifecycle
//!
//! Accounts are created active with KYC pending; an administrator approves
//! or rejects the KYC exactly once, and may move the account freely between
//! active/blocked/suspended. Deletion tombstones the account: the record
//! disappears, historical entries keep the id.

use crate::error::{Error, Result};
use crate::locks::AccountLocks;
use crate::storage::Storage;
use crate::types::{
    hash_pin, Account, AccountFilter, AccountStatus, AccountType, KycStatus, StoredAccount,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Registration input for a new account
#[derive(Debug, Clone)]
pub struct CreateAccount {
    /// Display name
    pub name: String,
    /// Supply-chain role
    pub account_type: AccountType,
    /// Contact details
    pub contact: String,
    /// Service area
    pub area: String,
    /// Verification secret, salted and hashed before it is stored
    pub pin: String,
    /// Owning user reference
    pub created_by: Uuid,
}

/// Account store backed by shared ledger storage
pub struct AccountStore {
    storage: Arc<Storage>,
    locks: Arc<AccountLocks>,
}

impl AccountStore {
    pub(crate) fn new(storage: Arc<Storage>, locks: Arc<AccountLocks>) -> Self {
        Self { storage, locks }
    }

    /// Register a new account: active, KYC pending, zero stock
    pub fn create(&self, request: CreateAccount) -> Result<Account> {
        let pin_salt: [u8; 16] = rand::random();
        let stored = StoredAccount {
            account: Account {
                id: Uuid::now_v7(),
                name: request.name,
                account_type: request.account_type,
                status: AccountStatus::Active,
                kyc_status: KycStatus::Pending,
                contact: request.contact,
                area: request.area,
                stock: 0,
                created_by: request.created_by,
                created_at: Utc::now(),
            },
            pin_hash: hash_pin(&pin_salt, &request.pin),
            pin_salt,
        };

        self.storage.put_account(&stored)?;

        tracing::info!(
            account_id = %stored.account.id,
            account_type = %stored.account.account_type,
            "Account created"
        );

        Ok(stored.account)
    }

    /// Get account by ID
    pub fn get(&self, account_id: Uuid) -> Result<Account> {
        Ok(self.storage.get_account(account_id)?.account)
    }

    /// Resolve a KYC decision. Legal only from `pending`.
    pub async fn set_kyc_status(&self, account_id: Uuid, decision: KycStatus) -> Result<Account> {
        if decision == KycStatus::Pending {
            return Err(Error::InvalidTransition(
                "KYC cannot be reset to pending".to_string(),
            ));
        }

        let _guards = self.locks.acquire(&[account_id]).await;

        let mut stored = self.storage.get_account(account_id)?;
        if stored.account.kyc_status != KycStatus::Pending {
            return Err(Error::InvalidTransition(format!(
                "KYC already resolved: {}",
                stored.account.kyc_status
            )));
        }

        stored.account.kyc_status = decision;
        self.storage.put_account(&stored)?;

        tracing::info!(account_id = %account_id, kyc_status = %decision, "KYC resolved");

        Ok(stored.account)
    }

    /// Set administrative status. Any status may transition to any other;
    /// leaving `active` makes subsequent submissions fail eligibility.
    pub async fn set_status(&self, account_id: Uuid, status: AccountStatus) -> Result<Account> {
        let _guards = self.locks.acquire(&[account_id]).await;

        let mut stored = self.storage.get_account(account_id)?;
        stored.account.status = status;
        self.storage.put_account(&stored)?;

        tracing::info!(account_id = %account_id, status = %status, "Account status changed");

        Ok(stored.account)
    }

    /// Block the account
    pub async fn block(&self, account_id: Uuid) -> Result<Account> {
        self.set_status(account_id, AccountStatus::Blocked).await
    }

    /// Suspend the account
    pub async fn suspend(&self, account_id: Uuid) -> Result<Account> {
        self.set_status(account_id, AccountStatus::Suspended).await
    }

    /// Reinstate a blocked account
    pub async fn unblock(&self, account_id: Uuid) -> Result<Account> {
        self.set_status(account_id, AccountStatus::Active).await
    }

    /// Reinstate a suspended account
    pub async fn unsuspend(&self, account_id: Uuid) -> Result<Account> {
        self.set_status(account_id, AccountStatus::Active).await
    }

    /// Delete the account. Historical entries keep the id as a tombstoned
    /// reference.
    pub async fn delete(&self, account_id: Uuid) -> Result<()> {
        let _guards = self.locks.acquire(&[account_id]).await;
        self.storage.delete_account(account_id)
    }

    /// List accounts matching the filter, newest first
    pub fn list(&self, filter: &AccountFilter) -> Result<Vec<Account>> {
        let accounts = self.storage.list_accounts()?;
        Ok(accounts.into_iter().filter(|a| filter.matches(a)).collect())
    }
}
