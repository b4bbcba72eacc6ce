//! Property-based tests for `LedgerService` running totals.

use std::sync::Arc;

use moneybook_shared::types::OwnerId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::entry::{CreateEntryInput, EntryKind, ModifyEntryInput};
use super::memory::InMemoryEntryStore;
use super::service::LedgerService;

/// Strategy to generate positive amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn kind_strategy() -> impl Strategy<Value = EntryKind> {
    prop_oneof![Just(EntryKind::Income), Just(EntryKind::Expense)]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn entry(amount: Decimal, kind: EntryKind) -> CreateEntryInput {
    CreateEntryInput {
        amount,
        kind,
        description: "generated".to_string(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Each created entry's total is the sum of signed contributions so far.
    #[test]
    fn prop_running_total_is_prefix_sum(
        ops in prop::collection::vec((positive_amount(), kind_strategy()), 1..20)
    ) {
        let rt = runtime();
        rt.block_on(async {
            let svc = LedgerService::new(Arc::new(InMemoryEntryStore::new()));
            let owner = OwnerId::new();
            let mut expected = Decimal::ZERO;

            for (amount, kind) in ops {
                expected += kind.signed(amount);
                let created = svc.create(owner, entry(amount, kind)).await.unwrap();
                prop_assert_eq!(created.running_total, expected);
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// After deletions, a new entry builds on the latest surviving entry.
    #[test]
    fn prop_create_skips_deleted_entries(
        ops in prop::collection::vec((positive_amount(), kind_strategy(), any::<bool>()), 1..15),
        (amount, kind) in (positive_amount(), kind_strategy()),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let svc = LedgerService::new(Arc::new(InMemoryEntryStore::new()));
            let owner = OwnerId::new();
            let mut survivors = Vec::new();

            for (amount, kind, delete) in ops {
                let created = svc.create(owner, entry(amount, kind)).await.unwrap();
                if delete {
                    svc.delete(created.id, owner).await.unwrap();
                } else {
                    survivors.push(created);
                }
            }

            let base = survivors.last().map_or(Decimal::ZERO, |e| e.running_total);
            let next = svc.create(owner, entry(amount, kind)).await.unwrap();
            prop_assert_eq!(next.running_total, base + kind.signed(amount));
            prop_assert_eq!(svc.list(owner).await.unwrap().len(), survivors.len() + 1);
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Modifying the latest entry with its own values is a no-op on its total.
    #[test]
    fn prop_modify_with_same_values_is_stable(
        prior in prop::collection::vec((positive_amount(), kind_strategy()), 0..10),
        (amount, kind) in (positive_amount(), kind_strategy()),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let svc = LedgerService::new(Arc::new(InMemoryEntryStore::new()));
            let owner = OwnerId::new();
            for (amount, kind) in prior {
                svc.create(owner, entry(amount, kind)).await.unwrap();
            }

            let created = svc.create(owner, entry(amount, kind)).await.unwrap();
            let modified = svc
                .modify(
                    created.id,
                    owner,
                    ModifyEntryInput {
                        amount: Some(amount),
                        kind: Some(kind),
                        description: None,
                    },
                )
                .await
                .unwrap();

            prop_assert_eq!(modified.running_total, created.running_total);
            Ok::<(), TestCaseError>(())
        })?;
    }
}
