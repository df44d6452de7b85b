//! # Counter Invariant Property Test
//!
//! Random issue/revoke batches over a small id space. Whatever subset is
//! accepted, the design's counter must equal the number of active
//! credential rows and each holder's count must equal its active rows.

mod common;

use std::collections::BTreeMap;

use common::{addr, issue_item, revoke_item, Harness};
use credreg_core::Address;
use credreg_state::keys::is_credential_key;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Step {
    Issue(Vec<(u8, u8)>),
    Revoke(Vec<(u8, u8)>),
}

fn holder(i: u8) -> &'static str {
    if i % 2 == 0 {
        "holder1"
    } else {
        "holder2"
    }
}

fn step() -> impl Strategy<Value = Step> {
    let items = prop::collection::vec((0u8..6, 0u8..2), 1..4);
    prop_oneof![
        items.clone().prop_map(Step::Issue),
        items.prop_map(Step::Revoke),
    ]
}

fn active_by_holder(h: &Harness) -> BTreeMap<Address, u64> {
    let mut counts = BTreeMap::new();
    for (_, value) in h.ledger.filter_keys(is_credential_key) {
        if let Some((credential, true)) = value.as_credential() {
            if let Some(holder) = &credential.holder {
                *counts.entry(holder.clone()).or_insert(0) += 1;
            }
        }
    }
    counts
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn counter_matches_active_rows(steps in prop::collection::vec(step(), 1..12)) {
        let mut h = Harness::ready();
        for step in steps {
            // Rejections are expected; only accepted batches change state.
            let _ = match step {
                Step::Issue(items) => {
                    let mut seen = std::collections::HashSet::new();
                    let items: Vec<_> = items
                        .into_iter()
                        .filter(|(id, _)| seen.insert(*id))
                        .map(|(id, who)| issue_item(holder(who), "tpl", &format!("c{id}"), "v"))
                        .collect();
                    h.issue(items)
                }
                Step::Revoke(items) => {
                    let mut seen = std::collections::HashSet::new();
                    let items: Vec<_> = items
                        .into_iter()
                        .filter(|(id, _)| seen.insert(*id))
                        .map(|(id, who)| revoke_item(holder(who), "tpl", &format!("c{id}")))
                        .collect();
                    h.revoke(items)
                }
            };

            let policy = h.policy();
            prop_assert!(policy.validate().is_ok());
            let active = active_by_holder(&h);
            prop_assert_eq!(policy.credential_count(), active.values().sum::<u64>());
            for who in ["holder1", "holder2"] {
                prop_assert_eq!(policy.holder_count(&addr(who)), active.get(&addr(who)).copied());
            }
        }
    }
}
