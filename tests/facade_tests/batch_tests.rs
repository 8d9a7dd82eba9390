//! Tests for batch mode
//!
//! These tests verify:
//! - Placeholders while a transaction or pipeline is open
//! - Nesting of same-kind batches and rejection of mixed kinds
//! - exec() flushes unconditionally and restores direct mode
//! - The add() composite in direct and batch mode
//! - Discard semantics

#[path = "../common/mod.rs"]
mod common;

use bytes::Bytes;
use common::MockSession;
use kvfacade::facade::Placeholder;
use kvfacade::{BatchKind, BatchMode, Facade, FacadeError, Reply};

// =============================================================================
// Helper Functions
// =============================================================================

fn facade() -> Facade<MockSession> {
    Facade::new(MockSession::new())
}

// =============================================================================
// Placeholder Tests
// =============================================================================

#[test]
fn test_placeholder_values() {
    assert!(<bool as Placeholder>::placeholder());
    assert_eq!(<i64 as Placeholder>::placeholder(), 0);
    assert_eq!(<f64 as Placeholder>::placeholder(), 0.0);
    assert!(<Bytes as Placeholder>::placeholder().is_empty());
    assert!(<Vec<Bytes> as Placeholder>::placeholder().is_empty());
    assert_eq!(<Option<i64> as Placeholder>::placeholder(), Some(0));
    assert_eq!(
        <Option<Bytes> as Placeholder>::placeholder(),
        Some(Bytes::new())
    );
}

#[test]
fn test_transaction_returns_placeholders() {
    let mut facade = facade();
    let mut tx = facade.multi().unwrap();

    assert!(tx.set("k", "v", 0).unwrap());
    assert!(tx.del("gone").unwrap());
    assert_eq!(tx.incr("n").unwrap(), 0);
    assert_eq!(tx.z_incr_by("z", 2.0, "m").unwrap(), 0.0);
    assert_eq!(tx.get("k").unwrap(), Some(Bytes::new()));
    assert_eq!(tx.z_score("z", "m").unwrap(), Some(0.0));
    assert_eq!(tx.z_rank("z", "m").unwrap(), Some(0));
    assert!(tx.s_members("s").unwrap().is_empty());
    assert!(tx.h_get_all("h").unwrap().is_empty());
    assert_eq!(tx.ttl("k").unwrap(), 0);

    let replies = tx.exec().unwrap();
    assert_eq!(replies.len(), 10);
}

#[test]
fn test_pipeline_placeholders_match_transaction() {
    let mut facade = facade();
    let mut p = facade.pipeline().unwrap();

    assert!(p.l_push("l", "a").unwrap());
    assert_eq!(p.l_pop("l").unwrap(), Some(Bytes::new()));
    assert_eq!(p.l_len("l").unwrap(), 0);
    assert!(p.get_range("k", 0, 1).unwrap().is_empty());

    p.exec().unwrap();
}

#[test]
fn test_set_in_transaction_then_exec() {
    let mut facade = facade();
    facade.session_mut().push_batch_replies(vec![Reply::ok()]);

    let mut tx = facade.multi().unwrap();
    assert!(tx.set("k", "v", 0).unwrap());

    let replies = tx.exec().unwrap();
    assert_eq!(replies, vec![Reply::ok()]);
    assert_eq!(facade.mode(), BatchMode::Direct);
}

#[test]
fn test_exec_returns_raw_replies_in_order() {
    let mut facade = facade();
    facade.session_mut().push_batch_replies(vec![
        Reply::Integer(1),
        Reply::nil(),
        Reply::bulk("x"),
    ]);

    let mut p = facade.pipeline().unwrap();
    p.del("a").unwrap();
    p.get("b").unwrap();
    p.get("c").unwrap();

    let replies = p.exec().unwrap();
    assert_eq!(
        replies,
        vec![Reply::Integer(1), Reply::nil(), Reply::bulk("x")]
    );
}

#[test]
fn test_queue_failure_is_not_a_placeholder() {
    let mut facade = facade();
    facade.session_mut().fail_on("SET");

    let mut p = facade.pipeline().unwrap();
    let result = p.set("k", "v", 0);

    assert!(matches!(result, Err(FacadeError::Network(_))));
}

#[test]
fn test_queue_failure_returns_to_direct() {
    let mut facade = facade();
    facade.session_mut().fail_on("SET");

    let mut tx = facade.multi().unwrap();
    assert!(tx.set("k", "v", 0).is_err());
    drop(tx);

    assert_eq!(facade.mode(), BatchMode::Direct);
    assert_eq!(facade.session().open_batch(), None);
}

#[test]
fn test_reopen_after_queue_failure_starts_new_batch() {
    let mut facade = facade();
    facade.session_mut().fail_on("SET");

    let mut tx = facade.multi().unwrap();
    assert!(tx.set("k", "v", 0).is_err());
    drop(tx);

    let mut tx = facade.multi().unwrap();
    assert_eq!(tx.nesting_level(), 1);
    assert_eq!(tx.incr("n").unwrap(), 0);
    assert_eq!(
        tx.session().open_batch(),
        Some(BatchKind::Transaction)
    );

    let replies = tx.exec().unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(
        facade.session().started,
        vec![BatchKind::Transaction, BatchKind::Transaction]
    );
    assert_eq!(facade.session().executed, 1);
}

#[test]
fn test_other_kind_allowed_after_queue_failure() {
    let mut facade = facade();
    facade.session_mut().fail_on("SET");

    let mut tx = facade.multi().unwrap();
    assert!(tx.set("k", "v", 0).is_err());
    drop(tx);

    let p = facade.pipeline().unwrap();
    assert_eq!(p.kind(), BatchKind::Pipeline);
    assert_eq!(
        p.session().started,
        vec![BatchKind::Transaction, BatchKind::Pipeline]
    );
}

#[test]
fn test_nesting_into_aborted_batch_is_rejected() {
    let mut facade = facade();
    facade.session_mut().fail_on("DEL");

    let mut p = facade.pipeline().unwrap();
    assert!(p.del("k").is_err());

    assert!(matches!(p.pipeline(), Err(FacadeError::NoBatch)));
    assert!(!p.in_batch());
}

// =============================================================================
// Mode Transition Tests
// =============================================================================

#[test]
fn test_multi_enters_transacting() {
    let mut facade = facade();
    let tx = facade.multi().unwrap();

    assert_eq!(tx.kind(), BatchKind::Transaction);
    assert_eq!(tx.nesting_level(), 1);
    assert_eq!(tx.mode(), BatchMode::Transacting { level: 1 });
    assert_eq!(tx.session().started, vec![BatchKind::Transaction]);

    tx.exec().unwrap();
    assert!(!facade.in_batch());
}

#[test]
fn test_pipeline_then_multi_is_mixed_mode() {
    let mut facade = facade();
    let mut p = facade.pipeline().unwrap();

    let result = p.multi().map(|_| ());
    assert!(matches!(
        result,
        Err(FacadeError::MixedMode {
            open: BatchKind::Pipeline,
            requested: BatchKind::Transaction,
        })
    ));

    // Nothing changed: still one pipeline at level 1
    assert_eq!(p.kind(), BatchKind::Pipeline);
    assert_eq!(p.nesting_level(), 1);
    assert_eq!(p.session().open_batch(), Some(BatchKind::Pipeline));
    assert_eq!(p.session().started, vec![BatchKind::Pipeline]);
}

#[test]
fn test_transaction_then_pipeline_is_mixed_mode() {
    let mut facade = facade();
    let mut tx = facade.multi().unwrap();

    let result = tx.pipeline().map(|_| ());
    assert!(matches!(result, Err(FacadeError::MixedMode { .. })));
    assert_eq!(tx.mode(), BatchMode::Transacting { level: 1 });

    let message = FacadeError::MixedMode {
        open: BatchKind::Transaction,
        requested: BatchKind::Pipeline,
    }
    .to_string();
    assert_eq!(
        message,
        "Cannot open a pipeline while a transaction is in progress"
    );
}

#[test]
fn test_same_kind_nests() {
    let mut facade = facade();
    let mut tx = facade.multi().unwrap();

    tx.multi().unwrap();
    tx.multi().unwrap();
    assert_eq!(tx.nesting_level(), 3);

    tx.increase_level();
    assert_eq!(tx.nesting_level(), 4);

    // Only one session batch was started
    assert_eq!(tx.session().started.len(), 1);
}

#[test]
fn test_facade_multi_while_open_routes_through_nesting() {
    let mut facade = facade();
    let mut p = facade.pipeline().unwrap();

    {
        let inner = Facade::pipeline(&mut *p).unwrap();
        assert_eq!(inner.nesting_level(), 2);
    }
    assert!(matches!(
        Facade::multi(&mut *p),
        Err(FacadeError::MixedMode { .. })
    ));
    assert_eq!(p.nesting_level(), 2);
    assert_eq!(p.session().started.len(), 1);
}

#[test]
fn test_exec_flushes_regardless_of_level() {
    let mut facade = facade();
    let mut tx = facade.multi().unwrap();
    tx.multi().unwrap();
    tx.set("k", "v", 0).unwrap();

    let replies = tx.exec().unwrap();

    assert_eq!(replies.len(), 1);
    assert_eq!(facade.mode(), BatchMode::Direct);
    assert_eq!(facade.session().executed, 1);
    assert_eq!(facade.session().open_batch(), None);
}

#[test]
fn test_exec_resets_mode_on_session_failure() {
    let mut facade = facade();
    facade.session_mut().fail_exec();

    let mut tx = facade.multi().unwrap();
    tx.set("k", "v", 0).unwrap();
    assert!(matches!(tx.exec(), Err(FacadeError::Network(_))));

    assert_eq!(facade.mode(), BatchMode::Direct);
}

#[test]
fn test_exec_without_batch() {
    let mut facade = facade();

    assert!(matches!(facade.exec(), Err(FacadeError::NoBatch)));
    assert_eq!(facade.mode(), BatchMode::Direct);
}

#[test]
fn test_direct_mode_after_exec_returns_real_results() {
    let mut facade = facade();

    let mut p = facade.pipeline().unwrap();
    p.get("k").unwrap();
    p.exec().unwrap();

    facade.session_mut().push_reply(Reply::nil());
    assert_eq!(facade.get("k").unwrap(), None);
}

// =============================================================================
// Discard Tests
// =============================================================================

#[test]
fn test_discard_returns_to_direct() {
    let mut facade = facade();
    let mut tx = facade.multi().unwrap();
    tx.set("k", "v", 0).unwrap();

    tx.discard().unwrap();

    assert_eq!(facade.mode(), BatchMode::Direct);
    assert_eq!(facade.session().discarded, 1);
    assert_eq!(facade.session().executed, 0);
}

// =============================================================================
// add() Tests
// =============================================================================

#[test]
fn test_add_direct_mode_succeeds() {
    let mut facade = facade();
    facade
        .session_mut()
        .push_batch_replies(vec![Reply::Integer(1), Reply::Integer(1)]);

    assert!(facade.add("k", "v", 60).unwrap());

    let session = facade.session();
    assert_eq!(session.started, vec![BatchKind::Transaction]);
    assert_eq!(session.names(), vec!["SETNX", "EXPIRE"]);
    assert_eq!(session.executed, 1);
    assert_eq!(facade.mode(), BatchMode::Direct);
}

#[test]
fn test_add_existing_key_is_false() {
    let mut facade = facade();
    facade
        .session_mut()
        .push_batch_replies(vec![Reply::Integer(0), Reply::Integer(1)]);

    assert!(!facade.add("k", "v", 60).unwrap());
}

#[test]
fn test_add_aborted_transaction_is_false() {
    let mut facade = facade();
    facade.session_mut().push_batch_replies(Vec::new());

    assert!(!facade.add("k", "v", 60).unwrap());
}

#[test]
fn test_add_inside_open_batch_joins_it() {
    let mut facade = facade();
    let mut p = facade.pipeline().unwrap();

    assert!(p.add("k", "v", 60).unwrap());

    assert_eq!(p.nesting_level(), 1);
    assert_eq!(p.session().started, vec![BatchKind::Pipeline]);
    assert_eq!(p.session().executed, 0);

    let replies = p.exec().unwrap();
    assert_eq!(replies.len(), 2);
}

#[test]
fn test_add_queue_failure_discards() {
    let mut facade = facade();
    facade.session_mut().fail_on("EXPIRE");

    let err = facade.add("k", "v", 60).unwrap_err();

    assert!(matches!(err, FacadeError::Network(_)));
    assert!(!facade.in_batch());
}

// =============================================================================
// Administrative Commands in Batch Mode
// =============================================================================

#[test]
fn test_info_bypasses_pipeline() {
    let mut facade = facade();
    facade
        .session_mut()
        .push_reply(Reply::bulk("redis_version:7.2.4\r\n"));

    let mut p = facade.pipeline().unwrap();
    let info = p.info().unwrap();

    assert_eq!(info.get("redis_version").map(String::as_str), Some("7.2.4"));
    assert!(p.exec().unwrap().is_empty());
}

#[test]
fn test_info_refused_in_transaction() {
    let mut facade = facade();
    let mut tx = facade.multi().unwrap();

    assert!(matches!(tx.info(), Err(FacadeError::DirectOnly("INFO"))));
    assert!(tx.session().sent.is_empty());
}

#[test]
fn test_watch_queued_in_transaction_returns_unit() {
    let mut facade = facade();
    facade.watch("k").unwrap();

    let mut tx = facade.multi().unwrap();
    tx.unwatch().unwrap();
    tx.exec().unwrap();

    assert_eq!(facade.session().names(), vec!["WATCH", "UNWATCH"]);
}
