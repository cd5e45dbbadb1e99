//! Report aggregation
//!
//! Reports are pure projections: one fold over a point-in-time snapshot of
//! the entry log, reproducible by replay. Reversed entries contribute
//! nothing to any total. Aggregation never blocks writers; a concurrent
//! submit or reversal is either fully visible in the snapshot or not at
//! all.

use crate::error::Result;
use crate::storage::Storage;
use crate::types::{
    AccountStats, CategoryTotal, DistributorVolume, ReportFilter, ReportSnapshot, TransactionType,
};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Fold the (filtered) entry log into summary statistics
pub(crate) fn compute_stats(storage: &Storage, filter: &ReportFilter) -> Result<ReportSnapshot> {
    let entries = storage.snapshot_entries()?;

    let mut manufactured = 0u64;
    let mut distributed = 0u64;
    let mut returned = 0u64;
    let mut inbound: HashMap<Uuid, u64> = HashMap::new();
    let mut categories: BTreeMap<String, CategoryTotal> = BTreeMap::new();

    for entry in &entries {
        if entry.reversed || !filter.matches(entry) {
            continue;
        }

        let category = categories.entry(entry.product_group.clone()).or_default();

        match entry.transaction_type {
            TransactionType::Supply => {
                manufactured += entry.base_units;
                category.manufactured += entry.base_units;
            }
            TransactionType::Transfer => {
                distributed += entry.base_units;
                category.distributed += entry.base_units;
                if let Some(target) = entry.target_account_id {
                    *inbound.entry(target).or_default() += entry.base_units;
                }
            }
            TransactionType::Return => {
                returned += entry.base_units;
                category.returned += entry.base_units;
            }
        }
    }

    let mut top_distributors: Vec<DistributorVolume> = inbound
        .into_iter()
        .map(|(account_id, volume)| DistributorVolume { account_id, volume })
        .collect();
    // Volume descending, account id ascending on ties, for determinism
    top_distributors.sort_by(|a, b| {
        b.volume
            .cmp(&a.volume)
            .then_with(|| a.account_id.cmp(&b.account_id))
    });

    Ok(ReportSnapshot {
        manufactured,
        distributed,
        returned,
        net_waste: manufactured as i64 - returned as i64,
        top_distributors,
        categories,
    })
}

/// Fold one account's activity into its summary
pub(crate) fn account_stats(storage: &Storage, account_id: Uuid) -> Result<AccountStats> {
    let account = storage.get_account(account_id)?.account;
    let entries = storage.snapshot_entries()?;

    let mut supply_received = 0u64;
    let mut distributed = 0u64;
    let mut returned = 0u64;

    for entry in &entries {
        if entry.reversed {
            continue;
        }

        match entry.transaction_type {
            TransactionType::Supply if entry.source_account_id == account_id => {
                supply_received += entry.base_units;
            }
            TransactionType::Transfer => {
                if entry.source_account_id == account_id {
                    distributed += entry.base_units;
                } else if entry.target_account_id == Some(account_id) {
                    // Received stock counts toward supply
                    supply_received += entry.base_units;
                }
            }
            TransactionType::Return if entry.source_account_id == account_id => {
                returned += entry.base_units;
            }
            _ => {}
        }
    }

    Ok(AccountStats {
        supply_received,
        distributed,
        returned,
        balance: supply_received as i64 - distributed as i64 - returned as i64,
        kyc_status: account.kyc_status,
        account_type: account.account_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        hash_pin, Account, AccountStatus, AccountType, Entry, KycStatus, StoredAccount,
    };
    use crate::units::PackageQuantity;
    use crate::Config;
    use chrono::Utc;
    use tempfile::TempDir;

    fn test_storage() -> (Storage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();
        (Storage::open(&config).unwrap(), temp_dir)
    }

    fn stored_account(account_type: AccountType) -> StoredAccount {
        let salt = [9u8; 16];
        StoredAccount {
            account: Account {
                id: Uuid::now_v7(),
                name: "Party".to_string(),
                account_type,
                status: AccountStatus::Active,
                kyc_status: KycStatus::Approved,
                contact: String::new(),
                area: String::new(),
                stock: 0,
                created_by: Uuid::now_v7(),
                created_at: Utc::now(),
            },
            pin_hash: hash_pin(&salt, "1234"),
            pin_salt: salt,
        }
    }

    fn entry(
        transaction_type: TransactionType,
        source: Uuid,
        target: Option<Uuid>,
        group: &str,
        units: i64,
    ) -> Entry {
        let quantities = PackageQuantity::from_pairs([("unit", units)]).unwrap();
        Entry {
            id: Uuid::now_v7(),
            transaction_type,
            source_account_id: source,
            target_account_id: target,
            product_group: group.to_string(),
            product_name: "item".to_string(),
            base_units: quantities.base_units(),
            quantities,
            entry_date: Utc::now(),
            created_at: Utc::now(),
            reversed: false,
        }
    }

    #[test]
    fn test_totals_by_transaction_type() {
        let (storage, _temp) = test_storage();
        let mill = Uuid::now_v7();
        let depot = Uuid::now_v7();
        let household = Uuid::now_v7();

        storage
            .commit_entry(&entry(TransactionType::Supply, mill, None, "plastic", 100), &[])
            .unwrap();
        storage
            .commit_entry(
                &entry(TransactionType::Transfer, mill, Some(depot), "plastic", 40),
                &[],
            )
            .unwrap();
        storage
            .commit_entry(
                &entry(TransactionType::Return, household, None, "plastic", 25),
                &[],
            )
            .unwrap();

        let stats = compute_stats(&storage, &ReportFilter::default()).unwrap();
        assert_eq!(stats.manufactured, 100);
        assert_eq!(stats.distributed, 40);
        assert_eq!(stats.returned, 25);
        assert_eq!(stats.net_waste, 75);
    }

    #[test]
    fn test_net_waste_may_be_negative() {
        let (storage, _temp) = test_storage();
        let household = Uuid::now_v7();

        storage
            .commit_entry(
                &entry(TransactionType::Return, household, None, "plastic", 30),
                &[],
            )
            .unwrap();

        let stats = compute_stats(&storage, &ReportFilter::default()).unwrap();
        assert_eq!(stats.net_waste, -30);
    }

    #[test]
    fn test_reversed_entries_contribute_nothing() {
        let (storage, _temp) = test_storage();
        let mill = Uuid::now_v7();

        let mut supply = entry(TransactionType::Supply, mill, None, "plastic", 100);
        supply.reversed = true;
        storage.commit_entry(&supply, &[]).unwrap();

        let stats = compute_stats(&storage, &ReportFilter::default()).unwrap();
        assert_eq!(stats.manufactured, 0);
        assert!(stats.categories.is_empty());
    }

    #[test]
    fn test_top_distributors_ranking() {
        let (storage, _temp) = test_storage();
        let mill = Uuid::now_v7();
        let mut a = Uuid::now_v7();
        let mut b = Uuid::now_v7();
        if b < a {
            std::mem::swap(&mut a, &mut b);
        }
        let c = Uuid::now_v7();

        // a and b tie at 50, c leads with 70
        storage
            .commit_entry(&entry(TransactionType::Transfer, mill, Some(a), "plastic", 50), &[])
            .unwrap();
        storage
            .commit_entry(&entry(TransactionType::Transfer, mill, Some(b), "plastic", 50), &[])
            .unwrap();
        storage
            .commit_entry(&entry(TransactionType::Transfer, mill, Some(c), "plastic", 70), &[])
            .unwrap();

        let stats = compute_stats(&storage, &ReportFilter::default()).unwrap();
        let ranked: Vec<Uuid> = stats.top_distributors.iter().map(|d| d.account_id).collect();
        assert_eq!(ranked, vec![c, a, b]);
        assert_eq!(stats.top_distributors[0].volume, 70);
    }

    #[test]
    fn test_categories_breakdown() {
        let (storage, _temp) = test_storage();
        let mill = Uuid::now_v7();
        let household = Uuid::now_v7();

        storage
            .commit_entry(&entry(TransactionType::Supply, mill, None, "plastic", 60), &[])
            .unwrap();
        storage
            .commit_entry(&entry(TransactionType::Supply, mill, None, "glass", 20), &[])
            .unwrap();
        storage
            .commit_entry(&entry(TransactionType::Return, household, None, "glass", 5), &[])
            .unwrap();

        let stats = compute_stats(&storage, &ReportFilter::default()).unwrap();
        assert_eq!(stats.categories.len(), 2);
        assert_eq!(stats.categories["plastic"].manufactured, 60);
        assert_eq!(stats.categories["glass"].manufactured, 20);
        assert_eq!(stats.categories["glass"].returned, 5);
    }

    #[test]
    fn test_filter_by_product_group() {
        let (storage, _temp) = test_storage();
        let mill = Uuid::now_v7();

        storage
            .commit_entry(&entry(TransactionType::Supply, mill, None, "plastic", 60), &[])
            .unwrap();
        storage
            .commit_entry(&entry(TransactionType::Supply, mill, None, "glass", 20), &[])
            .unwrap();

        let filter = ReportFilter {
            product_group: Some("glass".to_string()),
            ..Default::default()
        };
        let stats = compute_stats(&storage, &filter).unwrap();
        assert_eq!(stats.manufactured, 20);
        assert_eq!(stats.categories.len(), 1);
    }

    #[test]
    fn test_account_stats_fold() {
        let (storage, _temp) = test_storage();
        let depot = stored_account(AccountType::Distributor);
        storage.put_account(&depot).unwrap();
        let depot_id = depot.account.id;
        let mill = Uuid::now_v7();
        let shop = Uuid::now_v7();

        // Inbound transfer counts as received supply
        storage
            .commit_entry(
                &entry(TransactionType::Transfer, mill, Some(depot_id), "plastic", 80),
                &[],
            )
            .unwrap();
        // Outbound transfer counts as distributed
        storage
            .commit_entry(
                &entry(TransactionType::Transfer, depot_id, Some(shop), "plastic", 30),
                &[],
            )
            .unwrap();
        storage
            .commit_entry(
                &entry(TransactionType::Return, depot_id, None, "plastic", 10),
                &[],
            )
            .unwrap();

        let stats = account_stats(&storage, depot_id).unwrap();
        assert_eq!(stats.supply_received, 80);
        assert_eq!(stats.distributed, 30);
        assert_eq!(stats.returned, 10);
        assert_eq!(stats.balance, 40);
        assert_eq!(stats.account_type, AccountType::Distributor);
    }
}
