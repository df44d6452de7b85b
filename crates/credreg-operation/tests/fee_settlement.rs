//! # Fee Settlement Integration Tests
//!
//! Per-item fees charged by batched operations, with and without a
//! configured receiver.

mod common;

use common::{addr, issue_item, mcc, revoke_item, Harness, FEE, START_BALANCE};
use credreg_core::{Amount, CurrencyId};
use credreg_operation::{MergeValue, ProcessError, Rejection};
use credreg_state::keys::balance_key;
use credreg_state::FeePolicy;

fn balance_directives(directives: &[credreg_operation::StateMergeValue]) -> Vec<&MergeValue> {
    directives
        .iter()
        .map(|d| &d.value)
        .filter(|v| !matches!(v, MergeValue::Set { .. }))
        .collect()
}

// ---------------------------------------------------------------------------
// 1. Two items, fixed fee, receiver distinct from sender
// ---------------------------------------------------------------------------

#[test]
fn two_items_move_twice_the_fee_to_receiver() {
    let mut h = Harness::ready();
    let sender_before = h.balance("owner");
    let receiver_before = h.balance("fee");

    let directives = h
        .issue(vec![
            issue_item("holder1", "tpl", "a", "v"),
            issue_item("holder2", "tpl", "b", "v"),
        ])
        .unwrap();

    let two_fees = Amount::from(2 * FEE);
    assert_eq!(h.balance("owner"), sender_before.checked_sub(two_fees).unwrap());
    assert_eq!(h.balance("fee"), receiver_before.checked_add(two_fees).unwrap());

    let credits: Vec<_> = directives
        .iter()
        .filter(|d| matches!(d.value, MergeValue::AddBalance { .. }))
        .collect();
    assert_eq!(credits.len(), 1);
    assert_eq!(credits[0].key, balance_key(&addr("fee"), &mcc()));
}

// ---------------------------------------------------------------------------
// 2. No receiver: debit only
// ---------------------------------------------------------------------------

#[test]
fn no_receiver_debits_without_credit() {
    let mut h = Harness::with_fee(FeePolicy::Fixed {
        receiver: None,
        amount: Amount::from(FEE),
    });
    h.register();
    h.add_template("tpl");
    let before = h.balance("owner");

    let directives = h
        .issue(vec![
            issue_item("holder1", "tpl", "a", "v"),
            issue_item("holder2", "tpl", "b", "v"),
        ])
        .unwrap();

    assert_eq!(
        h.balance("owner"),
        before.checked_sub(Amount::from(2 * FEE)).unwrap()
    );
    let moves = balance_directives(&directives);
    assert_eq!(moves.len(), 1);
    assert!(matches!(moves[0], MergeValue::DeductBalance { .. }));
}

// ---------------------------------------------------------------------------
// 3. Receiver equal to sender nets out
// ---------------------------------------------------------------------------

#[test]
fn receiver_equal_to_sender_nets_out() {
    let mut h = Harness::with_fee(FeePolicy::Fixed {
        receiver: Some(addr("owner")),
        amount: Amount::from(FEE),
    });
    h.register();
    h.add_template("tpl");
    let directives = h.issue(vec![issue_item("holder1", "tpl", "a", "v")]).unwrap();
    assert!(balance_directives(&directives).is_empty());
    assert_eq!(h.balance("owner"), Amount::from(START_BALANCE));
}

// ---------------------------------------------------------------------------
// 4. Failure modes
// ---------------------------------------------------------------------------

#[test]
fn insufficient_balance_rejects_batch() {
    let mut h = Harness::ready();
    h.ledger.set_balance(&addr("owner"), &mcc(), Amount::from(FEE));
    let before = h.ledger.clone();

    let err = h
        .issue(vec![
            issue_item("holder1", "tpl", "a", "v"),
            issue_item("holder2", "tpl", "b", "v"),
        ])
        .unwrap_err();
    assert!(matches!(
        err,
        ProcessError::Rejected(Rejection::InsufficientBalance { .. })
    ));
    assert_eq!(h.ledger, before);
}

#[test]
fn unknown_currency_rejected() {
    let mut h = Harness::ready();
    let mut item = issue_item("holder1", "tpl", "a", "v");
    item.currency = CurrencyId::new("NOPE").unwrap();
    let err = h.issue(vec![item]).unwrap_err();
    assert!(matches!(
        err,
        ProcessError::Rejected(Rejection::CurrencyNotFound(_))
    ));
}

#[test]
fn missing_receiver_balance_rejected() {
    let mut h = Harness::with_fee(FeePolicy::Fixed {
        receiver: Some(addr("nobody")),
        amount: Amount::from(FEE),
    });
    let fact = h.register_fact();
    let op = h.sign(fact, &h.owner);
    let err = h.run(&op).unwrap_err();
    assert!(matches!(
        err,
        ProcessError::Rejected(Rejection::FeeReceiverNotFound { .. })
    ));
}

// ---------------------------------------------------------------------------
// 5. Ratio fee charges its minimum per item
// ---------------------------------------------------------------------------

#[test]
fn ratio_fee_charges_minimum_per_item() {
    let mut h = Harness::with_fee(FeePolicy::Ratio {
        receiver: Some(addr("fee")),
        ratio_ppm: 1_000,
        min: Amount::from(2u64),
        max: Amount::from(50u64),
    });
    h.register();
    h.add_template("tpl");
    h.issue(vec![issue_item("holder1", "tpl", "a", "v")]).unwrap();
    h.revoke(vec![revoke_item("holder1", "tpl", "a")]).unwrap();
    // register, template, issue, revoke
    assert_eq!(h.balance("fee"), Amount::from(8u64));
}
