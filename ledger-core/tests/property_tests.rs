//! Property-based invariants
//!
//! Randomized checks over quantity conversion, balance conservation and
//! reversal symmetry. Storage-backed properties run fewer cases since each
//! one opens a fresh database.

use proptest::prelude::*;
use uuid::Uuid;
use waste_ledger_core::{
    AccountType, Config, CreateAccount, EntryRequest, KycStatus, Ledger, PackageQuantity,
    ReportFilter, TransactionType,
};

fn open_ledger(temp_dir: &tempfile::TempDir) -> Ledger {
    let mut config = Config::default();
    config.data_dir = temp_dir.path().to_path_buf();
    Ledger::open(config).unwrap()
}

async fn approved_account(ledger: &Ledger, account_type: AccountType) -> Uuid {
    let account = ledger
        .accounts()
        .create(CreateAccount {
            name: "prop".to_string(),
            account_type,
            contact: String::new(),
            area: String::new(),
            pin: "0000".to_string(),
            created_by: Uuid::now_v7(),
        })
        .unwrap();
    ledger
        .accounts()
        .set_kyc_status(account.id, KycStatus::Approved)
        .await
        .unwrap();
    account.id
}

fn quantity_strategy() -> impl Strategy<Value = PackageQuantity> {
    (
        0i64..1000,
        0i64..1000,
        0i64..1000,
        0i64..1000,
        0i64..1000,
        0i64..1000,
        0i64..1000,
    )
        .prop_map(|(unit, half_dozen, dozen, case, series, level_16, level_10)| {
            PackageQuantity::from_pairs([
                ("unit", unit),
                ("half_dozen", half_dozen),
                ("dozen", dozen),
                ("case", case),
                ("series", series),
                ("level_16", level_16),
                ("level_10", level_10),
            ])
            .unwrap()
        })
}

fn nonempty_quantity_strategy() -> impl Strategy<Value = PackageQuantity> {
    quantity_strategy().prop_filter("at least one base unit", |q| !q.is_empty())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn conversion_is_the_weighted_sum(
        unit in 0i64..10_000,
        half_dozen in 0i64..10_000,
        dozen in 0i64..10_000,
        case in 0i64..10_000,
        series in 0i64..10_000,
        level_16 in 0i64..10_000,
        level_10 in 0i64..10_000,
    ) {
        let quantity = PackageQuantity::from_pairs([
            ("unit", unit),
            ("half_dozen", half_dozen),
            ("dozen", dozen),
            ("case", case),
            ("series", series),
            ("level_16", level_16),
            ("level_10", level_10),
        ]).unwrap();

        let expected = unit as u64
            + half_dozen as u64 * 6
            + dozen as u64 * 12
            + case as u64 * 24
            + series as u64
            + level_16 as u64 * 16
            + level_10 as u64 * 10;
        prop_assert_eq!(quantity.base_units(), expected);
    }

    #[test]
    fn negative_counts_are_rejected(count in i64::MIN..0) {
        prop_assert!(PackageQuantity::from_pairs([("dozen", count)]).is_err());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn transfers_conserve_total_stock(
        seed in nonempty_quantity_strategy(),
        moved in nonempty_quantity_strategy(),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let temp_dir = tempfile::tempdir().unwrap();
            let ledger = open_ledger(&temp_dir);
            let mill = approved_account(&ledger, AccountType::Manufacturer).await;
            let depot = approved_account(&ledger, AccountType::Distributor).await;

            ledger
                .submit(EntryRequest::supply(mill, "0000", "plastic", "crate_a", seed.clone()))
                .await
                .unwrap();
            let before = ledger.accounts().get(mill).unwrap().stock
                + ledger.accounts().get(depot).unwrap().stock;

            ledger
                .submit(EntryRequest::transfer(
                    mill, depot, "0000", "plastic", "crate_a", moved.clone(),
                ))
                .await
                .unwrap();

            let mill_after = ledger.accounts().get(mill).unwrap().stock;
            let depot_after = ledger.accounts().get(depot).unwrap().stock;
            prop_assert_eq!(mill_after + depot_after, before);
            prop_assert_eq!(depot_after, moved.base_units() as i64);
            Ok(())
        })?;
    }

    #[test]
    fn reversal_restores_prior_balances(
        seed in nonempty_quantity_strategy(),
        moved in nonempty_quantity_strategy(),
        kind in prop::sample::select(vec![
            TransactionType::Supply,
            TransactionType::Transfer,
            TransactionType::Return,
        ]),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let temp_dir = tempfile::tempdir().unwrap();
            let ledger = open_ledger(&temp_dir);
            let mill = approved_account(&ledger, AccountType::Manufacturer).await;
            let depot = approved_account(&ledger, AccountType::Distributor).await;

            ledger
                .submit(EntryRequest::supply(mill, "0000", "plastic", "crate_a", seed))
                .await
                .unwrap();
            let mill_before = ledger.accounts().get(mill).unwrap().stock;
            let depot_before = ledger.accounts().get(depot).unwrap().stock;

            let request = match kind {
                TransactionType::Supply => {
                    EntryRequest::supply(mill, "0000", "plastic", "crate_a", moved)
                }
                TransactionType::Transfer => {
                    EntryRequest::transfer(mill, depot, "0000", "plastic", "crate_a", moved)
                }
                TransactionType::Return => {
                    EntryRequest::waste_return(mill, "0000", "plastic", "crate_a", moved)
                }
            };
            let entry = ledger.submit(request).await.unwrap();
            ledger.reverse(entry.id).await.unwrap();

            prop_assert_eq!(ledger.accounts().get(mill).unwrap().stock, mill_before);
            prop_assert_eq!(ledger.accounts().get(depot).unwrap().stock, depot_before);
            Ok(())
        })?;
    }

    #[test]
    fn reversed_entries_never_reach_aggregates(
        quantities in prop::collection::vec(nonempty_quantity_strategy(), 1..5),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let temp_dir = tempfile::tempdir().unwrap();
            let ledger = open_ledger(&temp_dir);
            let mill = approved_account(&ledger, AccountType::Manufacturer).await;

            let mut kept = 0u64;
            for (index, quantity) in quantities.into_iter().enumerate() {
                let entry = ledger
                    .submit(EntryRequest::supply(
                        mill, "0000", "plastic", "crate_a", quantity,
                    ))
                    .await
                    .unwrap();
                if index % 2 == 0 {
                    ledger.reverse(entry.id).await.unwrap();
                } else {
                    kept += entry.base_units;
                }
            }

            let stats = ledger.compute_stats(&ReportFilter::default()).unwrap();
            prop_assert_eq!(stats.manufactured, kept);
            prop_assert_eq!(ledger.accounts().get(mill).unwrap().stock, kept as i64);
            Ok(())
        })?;
    }
}
