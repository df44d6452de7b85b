//! # Block Session and Pool Integration Tests

mod common;

use common::{addr, issue_item, revoke_item, Harness};
use credreg_operation::{BlockSession, ProcessError, Rejection};

#[test]
fn second_operation_from_same_sender_rejected() {
    let mut h = Harness::ready();
    let first = {
        let fact = h.issue_fact("owner", vec![issue_item("holder1", "tpl", "a", "v")]);
        h.sign(fact, &h.owner)
    };
    let second = {
        let fact = h.issue_fact("owner", vec![issue_item("holder2", "tpl", "b", "v")]);
        h.sign(fact, &h.owner)
    };

    let mut session = BlockSession::open(&h.processor);
    session.pre_process(&first, &h.ledger).unwrap();
    let directives = session.process(&first, &h.ledger).unwrap();
    assert!(session.has_sender(&addr("owner")));

    let err = session.process(&second, &h.ledger).unwrap_err();
    assert_eq!(
        err,
        ProcessError::Rejected(Rejection::DuplicateSender(addr("owner")))
    );
    assert!(err.to_string().contains("only one sender in proposal"));

    session.close();
    assert!(!session.has_sender(&addr("owner")));
    h.ledger.commit(&directives).unwrap();
}

#[test]
fn different_senders_share_a_block() {
    let mut h = Harness::ready();
    let by_owner = {
        let fact = h.issue_fact("owner", vec![issue_item("holder1", "tpl", "a", "v")]);
        h.sign(fact, &h.owner)
    };
    let by_operator = {
        let fact = h.issue_fact("operator", vec![issue_item("holder2", "tpl", "b", "v")]);
        h.sign(fact, &h.operator)
    };

    let mut session = BlockSession::open(&h.processor);
    for op in [&by_owner, &by_operator] {
        session.pre_process(op, &h.ledger).unwrap();
        let directives = session.process(op, &h.ledger).unwrap();
        h.ledger.commit(&directives).unwrap();
    }
    session.close();

    assert!(h.credential("tpl", "a").is_some());
    assert!(h.credential("tpl", "b").is_some());
    assert_eq!(h.policy().credential_count(), 2);
}

#[test]
fn rejected_operation_still_claims_sender() {
    let mut h = Harness::ready();
    let bad = {
        let fact = h.revoke_fact("owner", vec![revoke_item("holder1", "tpl", "missing")]);
        h.sign(fact, &h.owner)
    };
    let good = {
        let fact = h.issue_fact("owner", vec![issue_item("holder1", "tpl", "a", "v")]);
        h.sign(fact, &h.owner)
    };

    let mut session = BlockSession::open(&h.processor);
    let err = session.process(&bad, &h.ledger).unwrap_err();
    assert!(matches!(err, ProcessError::Rejected(Rejection::Lifecycle { .. })));
    assert!(session.has_sender(&addr("owner")));

    let err = session.process(&good, &h.ledger).unwrap_err();
    assert_eq!(
        err,
        ProcessError::Rejected(Rejection::DuplicateSender(addr("owner")))
    );

    // The next block starts with a free slot.
    session.close();
    let directives = session.process(&good, &h.ledger).unwrap();
    h.ledger.commit(&directives).unwrap();
    assert!(h.credential("tpl", "a").is_some());
}

#[test]
fn buffers_return_to_pool() {
    let mut h = Harness::ready();
    assert!(h.processor.idle_buffers() >= 1);
    let idle = h.processor.idle_buffers();
    h.issue(vec![issue_item("holder1", "tpl", "a", "v")]).unwrap();
    assert_eq!(h.processor.idle_buffers(), idle);
    let _ = h.revoke(vec![revoke_item("holder1", "tpl", "missing")]);
    assert_eq!(h.processor.idle_buffers(), idle);
}
