//! Core types for the ledger
//!
//! All types are designed for:
//! - Deterministic serialization (bincode for storage, serde_json at the edge)
//! - Exact arithmetic (integer base units, no floating point)
//! - Credential hygiene (PIN material never leaves the storage record)

use crate::units::PackageQuantity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Role of an account in the supply chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Produces packaged stock
    Manufacturer,
    /// Moves stock between tiers
    Distributor,
    /// End consumer, origin of returned waste
    Household,
}

impl AccountType {
    /// Wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Manufacturer => "manufacturer",
            AccountType::Distributor => "distributor",
            AccountType::Household => "household",
        }
    }

    /// Parse from wire string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manufacturer" => Some(AccountType::Manufacturer),
            "distributor" => Some(AccountType::Distributor),
            "household" => Some(AccountType::Household),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Administrative account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// May transact
    Active,
    /// Blocked by an administrator
    Blocked,
    /// Suspended by an administrator
    Suspended,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccountStatus::Active => "active",
            AccountStatus::Blocked => "blocked",
            AccountStatus::Suspended => "suspended",
        };
        write!(f, "{}", s)
    }
}

/// Identity-verification lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    /// Awaiting administrator review
    Pending,
    /// Verified, may transact
    Approved,
    /// Rejected, may not transact
    Rejected,
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KycStatus::Pending => "pending",
            KycStatus::Approved => "approved",
            KycStatus::Rejected => "rejected",
        };
        write!(f, "{}", s)
    }
}

/// A ledger account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique id (UUIDv7 so key order is creation order)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Supply-chain role
    pub account_type: AccountType,

    /// Administrative status
    pub status: AccountStatus,

    /// KYC lifecycle state
    pub kyc_status: KycStatus,

    /// Contact details
    pub contact: String,

    /// Service area
    pub area: String,

    /// Current stock balance in base units
    ///
    /// Signed: the ledger has no insufficient-stock rule, balances are
    /// derived bookkeeping and may go negative.
    pub stock: i64,

    /// Owning user reference
    pub created_by: Uuid,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// True while the account may be party to a new entry
    pub fn is_eligible(&self) -> bool {
        self.status == AccountStatus::Active && self.kyc_status == KycStatus::Approved
    }
}

/// Storage-side account record: public fields plus credential material.
///
/// Only this record carries the PIN hash; the API-facing [`Account`] never
/// serializes credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredAccount {
    pub account: Account,
    pub pin_hash: [u8; 32],
    pub pin_salt: [u8; 16],
}

impl StoredAccount {
    /// Salted SHA-256 verification of a submitted PIN
    pub fn verify_pin(&self, pin: &str) -> bool {
        hash_pin(&self.pin_salt, pin) == self.pin_hash
    }
}

/// Salted PIN digest: `SHA-256(salt || pin)`
pub(crate) fn hash_pin(salt: &[u8; 16], pin: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(pin.as_bytes());
    hasher.finalize().into()
}

/// Kind of ledger transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Manufacturer stocks its own production
    Supply,
    /// Stock moves from source to target
    Transfer,
    /// Waste leaves circulation
    Return,
}

impl TransactionType {
    /// Wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Supply => "supply",
            TransactionType::Transfer => "transfer",
            TransactionType::Return => "return",
        }
    }

    /// Parse from wire string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "supply" => Some(TransactionType::Supply),
            "transfer" => Some(TransactionType::Transfer),
            "return" => Some(TransactionType::Return),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable ledger entry
///
/// Entries are append-only. Reversal annotates the record (`reversed`)
/// and inverts its balance effect; it never deletes history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Unique id (UUIDv7 for time-ordering)
    pub id: Uuid,

    /// Transaction kind
    pub transaction_type: TransactionType,

    /// Source party. May be a tombstoned reference after account deletion.
    pub source_account_id: Uuid,

    /// Target party, present only where the transaction kind requires one
    pub target_account_id: Option<Uuid>,

    /// Monitored product group
    pub product_group: String,

    /// Monitored product name
    pub product_name: String,

    /// Package counts as submitted
    pub quantities: PackageQuantity,

    /// Converted base-unit quantity, frozen at creation
    pub base_units: u64,

    /// Business date of the transaction
    pub entry_date: DateTime<Utc>,

    /// Record creation timestamp
    pub created_at: DateTime<Utc>,

    /// Set once by a successful reversal
    pub reversed: bool,
}

/// Filter for administrative account listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountFilter {
    /// Restrict to one role
    pub account_type: Option<AccountType>,
    /// Restrict to one administrative status
    pub status: Option<AccountStatus>,
    /// Restrict to one KYC state
    pub kyc_status: Option<KycStatus>,
}

impl AccountFilter {
    /// True when the account passes every set criterion
    pub fn matches(&self, account: &Account) -> bool {
        self.account_type.map_or(true, |t| account.account_type == t)
            && self.status.map_or(true, |s| account.status == s)
            && self.kyc_status.map_or(true, |k| account.kyc_status == k)
    }
}

/// Filter for report aggregation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportFilter {
    /// Restrict to one product group
    pub product_group: Option<String>,
    /// Inclusive lower bound on entry date
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on entry date
    pub to: Option<DateTime<Utc>>,
}

impl ReportFilter {
    /// True when the entry falls inside the filter slice
    pub fn matches(&self, entry: &Entry) -> bool {
        if let Some(ref group) = self.product_group {
            if entry.product_group != *group {
                return false;
            }
        }
        if let Some(from) = self.from {
            if entry.entry_date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if entry.entry_date > to {
                return false;
            }
        }
        true
    }
}

/// One ranked distributor in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributorVolume {
    /// Receiving account
    pub account_id: Uuid,
    /// Inbound transfer volume in base units
    pub volume: u64,
}

/// Per-product-group totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// Supplied base units
    pub manufactured: u64,
    /// Transferred base units
    pub distributed: u64,
    /// Returned base units
    pub returned: u64,
}

/// Derived summary statistics
///
/// A pure projection of the entry log; reproducible by replay, never a
/// source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSnapshot {
    /// Total supplied base units
    pub manufactured: u64,
    /// Total transferred base units
    pub distributed: u64,
    /// Total returned base units
    pub returned: u64,
    /// `manufactured − returned`, as the literal signed result
    pub net_waste: i64,
    /// Distributors ranked by inbound transfer volume, descending;
    /// ties broken by account id ascending
    pub top_distributors: Vec<DistributorVolume>,
    /// Per-product-group breakdown, keyed by group name
    pub categories: std::collections::BTreeMap<String, CategoryTotal>,
}

/// Per-account activity summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountStats {
    /// Own supply plus inbound transfers, base units
    pub supply_received: u64,
    /// Outbound transfers, base units
    pub distributed: u64,
    /// Returns submitted, base units
    pub returned: u64,
    /// `supply_received − distributed − returned`
    pub balance: i64,
    /// Current KYC state
    pub kyc_status: KycStatus,
    /// Account role
    pub account_type: AccountType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_round_trip() {
        for t in [
            TransactionType::Supply,
            TransactionType::Transfer,
            TransactionType::Return,
        ] {
            assert_eq!(TransactionType::parse(t.as_str()), Some(t));
        }
        assert_eq!(TransactionType::parse("disposal"), None);
    }

    #[test]
    fn test_eligibility() {
        let mut account = Account {
            id: Uuid::now_v7(),
            name: "Lakeside Mill".to_string(),
            account_type: AccountType::Manufacturer,
            status: AccountStatus::Active,
            kyc_status: KycStatus::Approved,
            contact: "+255 700 000 001".to_string(),
            area: "Mwanza".to_string(),
            stock: 0,
            created_by: Uuid::now_v7(),
            created_at: Utc::now(),
        };
        assert!(account.is_eligible());

        account.status = AccountStatus::Blocked;
        assert!(!account.is_eligible());

        account.status = AccountStatus::Active;
        account.kyc_status = KycStatus::Pending;
        assert!(!account.is_eligible());
    }

    #[test]
    fn test_pin_verification() {
        let salt = [7u8; 16];
        let stored = StoredAccount {
            account: Account {
                id: Uuid::now_v7(),
                name: "Household 12".to_string(),
                account_type: AccountType::Household,
                status: AccountStatus::Active,
                kyc_status: KycStatus::Approved,
                contact: String::new(),
                area: String::new(),
                stock: 0,
                created_by: Uuid::now_v7(),
                created_at: Utc::now(),
            },
            pin_hash: hash_pin(&salt, "4821"),
            pin_salt: salt,
        };

        assert!(stored.verify_pin("4821"));
        assert!(!stored.verify_pin("0000"));
    }

    #[test]
    fn test_account_json_has_no_credentials() {
        let account = Account {
            id: Uuid::now_v7(),
            name: "Depot".to_string(),
            account_type: AccountType::Distributor,
            status: AccountStatus::Active,
            kyc_status: KycStatus::Pending,
            contact: String::new(),
            area: String::new(),
            stock: 0,
            created_by: Uuid::now_v7(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("pin"));
    }

    #[test]
    fn test_report_filter_slices_by_group_and_date() {
        let entry = Entry {
            id: Uuid::now_v7(),
            transaction_type: TransactionType::Supply,
            source_account_id: Uuid::now_v7(),
            target_account_id: None,
            product_group: "glass".to_string(),
            product_name: "bottle_500ml".to_string(),
            quantities: PackageQuantity::default(),
            base_units: 0,
            entry_date: Utc::now(),
            created_at: Utc::now(),
            reversed: false,
        };

        assert!(ReportFilter::default().matches(&entry));

        let filter = ReportFilter {
            product_group: Some("plastic".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&entry));

        let filter = ReportFilter {
            to: Some(entry.entry_date - chrono::Duration::days(1)),
            ..Default::default()
        };
        assert!(!filter.matches(&entry));
    }
}
