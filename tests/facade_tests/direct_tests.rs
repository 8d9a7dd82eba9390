//! Tests for the Command Facade in direct mode
//!
//! These tests verify:
//! - Each truth-table family maps raw replies to typed results
//! - Commands are framed with the right arguments
//! - Conditional sorted-set updates go through the registered script
//! - Error replies surface as errors
//! - Administrative commands (info, watch, flush, scripts)

#[path = "../common/mod.rs"]
mod common;

use bytes::Bytes;
use common::MockSession;
use kvfacade::facade::ZADD_XX_NX;
use kvfacade::{Command, Facade, FacadeError, InsertPosition, RangeLimit, Reply, ZAddMode};

// =============================================================================
// Helper Functions
// =============================================================================

fn facade_with(replies: Vec<Reply>) -> Facade<MockSession> {
    Facade::new(MockSession::with_replies(replies))
}

fn bulk(value: &'static str) -> Reply {
    Reply::bulk(value)
}

fn array(items: &[&'static str]) -> Reply {
    Reply::array(items.iter().map(|item| Reply::bulk(*item)).collect())
}

fn b(value: &'static str) -> Bytes {
    Bytes::from_static(value.as_bytes())
}

// =============================================================================
// Bool-from-count Tests
// =============================================================================

#[test]
fn test_del_is_true_only_for_exactly_one() {
    let mut facade = facade_with(vec![
        Reply::Integer(1),
        Reply::Integer(0),
        Reply::Integer(2),
    ]);

    assert!(facade.del("a").unwrap());
    assert!(!facade.del("b").unwrap());
    assert!(!facade.del("c").unwrap());
}

#[test]
fn test_h_set_overwrite_is_false() {
    let mut facade = facade_with(vec![Reply::Integer(1), Reply::Integer(0)]);

    assert!(facade.h_set("h", "f", "v1").unwrap());
    assert!(!facade.h_set("h", "f", "v2").unwrap());
}

#[test]
fn test_set_family_counts() {
    let mut facade = facade_with(vec![
        Reply::Integer(1),
        Reply::Integer(0),
        Reply::Integer(1),
        Reply::Integer(0),
    ]);

    assert!(facade.s_add("s", "m").unwrap());
    assert!(!facade.s_add("s", "m").unwrap());
    assert!(facade.s_rem("s", "m").unwrap());
    assert!(!facade.z_delete("z", "m").unwrap());
}

// =============================================================================
// Bool Passthrough Tests
// =============================================================================

#[test]
fn test_set_ok_is_true() {
    let mut facade = facade_with(vec![Reply::ok()]);

    assert!(facade.set("k", "v", 0).unwrap());
    assert_eq!(
        facade.session().last(),
        &Command::Set {
            key: "k".to_string(),
            value: b("v"),
            ttl: 0,
        }
    );
}

#[test]
fn test_set_with_ttl_sends_expiry() {
    let mut facade = facade_with(vec![Reply::ok()]);

    facade.set("k", "v", 30).unwrap();

    let args = facade.session().last().to_args("");
    assert_eq!(
        args,
        vec![
            b"SET".to_vec(),
            b"k".to_vec(),
            b"v".to_vec(),
            b"EX".to_vec(),
            b"30".to_vec(),
        ]
    );
}

#[test]
fn test_has_and_set_nx() {
    let mut facade = facade_with(vec![
        Reply::Integer(1),
        Reply::Integer(0),
        Reply::Integer(0),
    ]);

    assert!(facade.has("present").unwrap());
    assert!(!facade.has("absent").unwrap());
    assert!(!facade.set_nx("taken", "v").unwrap());
}

#[test]
fn test_l_trim_and_l_set_ok() {
    let mut facade = facade_with(vec![Reply::ok(), Reply::ok()]);

    assert!(facade.l_trim("l", 0, 9).unwrap());
    assert!(facade.l_set("l", 0, "x").unwrap());
}

// =============================================================================
// Other Bool Families
// =============================================================================

#[test]
fn test_append_is_true_when_positive() {
    let mut facade = facade_with(vec![Reply::Integer(5), Reply::Integer(0)]);

    assert!(facade.append("k", "hello").unwrap());
    assert!(!facade.append("k", "").unwrap());
}

#[test]
fn test_push_is_false_only_on_nil() {
    let mut facade = facade_with(vec![
        Reply::Integer(3),
        Reply::nil(),
        Reply::Integer(0),
        Reply::nil(),
    ]);

    assert!(facade.l_push("l", "a").unwrap());
    assert!(!facade.r_push("l", "b").unwrap());
    // LPUSHX on a missing list answers 0, which is not the failure sentinel
    assert!(facade.l_push_nx("missing", "c").unwrap());
    assert!(!facade.r_push_nx("missing", "d").unwrap());
}

#[test]
fn test_l_insert_pivot_not_found() {
    let mut facade = facade_with(vec![Reply::Integer(-1), Reply::Integer(4)]);

    assert!(!facade.l_insert("l", InsertPosition::Before, "nope", "x").unwrap());
    assert!(facade.l_insert("l", InsertPosition::After, "a", "x").unwrap());

    let args = facade.session().last().to_args("");
    assert_eq!(args[2], b"AFTER".to_vec());
}

// =============================================================================
// Nullable Tests
// =============================================================================

#[test]
fn test_get_missing_and_present() {
    let mut facade = facade_with(vec![Reply::nil(), bulk("world")]);

    assert_eq!(facade.get("missing").unwrap(), None);
    assert_eq!(facade.get("hello").unwrap(), Some(b("world")));
}

#[test]
fn test_nullable_list_and_hash_reads() {
    let mut facade = facade_with(vec![
        Reply::nil(),
        bulk("head"),
        bulk("tail"),
        Reply::nil(),
        bulk("v"),
    ]);

    assert_eq!(facade.l_pop("empty").unwrap(), None);
    assert_eq!(facade.l_pop("l").unwrap(), Some(b("head")));
    assert_eq!(facade.r_pop("l").unwrap(), Some(b("tail")));
    assert_eq!(facade.l_index("l", 99).unwrap(), None);
    assert_eq!(facade.h_get("h", "f").unwrap(), Some(b("v")));
}

#[test]
fn test_rank_and_score_nullable() {
    let mut facade = facade_with(vec![
        Reply::nil(),
        Reply::Integer(2),
        Reply::nil(),
        bulk("1.5"),
    ]);

    assert_eq!(facade.z_rank("z", "ghost").unwrap(), None);
    assert_eq!(facade.z_rev_rank("z", "m").unwrap(), Some(2));
    assert_eq!(facade.z_score("z", "ghost").unwrap(), None);
    assert_eq!(facade.z_score("z", "m").unwrap(), Some(1.5));
}

// =============================================================================
// Integer and Float Tests
// =============================================================================

#[test]
fn test_ttl_missing_key_is_zero() {
    let mut facade = facade_with(vec![Reply::Integer(-2)]);

    assert_eq!(facade.ttl("missing-key").unwrap(), 0);
}

#[test]
fn test_ttl_values() {
    let mut facade = facade_with(vec![Reply::nil(), Reply::Integer(-1), Reply::Integer(42)]);

    assert_eq!(facade.ttl("a").unwrap(), 0);
    assert_eq!(facade.ttl("persistent").unwrap(), -1);
    assert_eq!(facade.ttl("expiring").unwrap(), 42);
}

#[test]
fn test_l_rem_nil_is_zero() {
    let mut facade = facade_with(vec![Reply::nil(), Reply::Integer(2)]);

    assert_eq!(facade.l_rem("l", "x", 0).unwrap(), 0);
    assert_eq!(facade.l_rem("l", "x", -2).unwrap(), 2);
}

#[test]
fn test_counters() {
    let mut facade = facade_with(vec![
        Reply::Integer(1),
        Reply::Integer(11),
        Reply::Integer(10),
        Reply::Integer(0),
        Reply::Integer(7),
    ]);

    assert_eq!(facade.incr("n").unwrap(), 1);
    assert_eq!(facade.incr_by("n", 10).unwrap(), 11);
    assert_eq!(facade.decr("n").unwrap(), 10);
    assert_eq!(facade.decr_by("n", 10).unwrap(), 0);
    assert_eq!(facade.h_incr_by("h", "f", 7).unwrap(), 7);
}

#[test]
fn test_floats() {
    let mut facade = facade_with(vec![bulk("3"), bulk("2.75")]);

    assert_eq!(facade.z_incr_by("z", 1.0, "m").unwrap(), 3.0);
    assert_eq!(facade.h_incr_by_float("h", "f", 0.25).unwrap(), 2.75);
}

#[test]
fn test_sorted_set_counts() {
    let mut facade = facade_with(vec![
        Reply::Integer(4),
        Reply::Integer(2),
        Reply::Integer(3),
        Reply::Integer(1),
    ]);

    assert_eq!(facade.z_card("z").unwrap(), 4);
    assert_eq!(facade.z_count("z", "-inf", "+inf").unwrap(), 2);
    assert_eq!(facade.z_delete_range_by_score("z", "0", "(10").unwrap(), 3);
    assert_eq!(facade.z_rem_range_by_rank("z", 0, 0).unwrap(), 1);

    let names = facade.session().names();
    assert_eq!(names[2], "ZREMRANGEBYSCORE");
}

// =============================================================================
// Sequence and Pair Tests
// =============================================================================

#[test]
fn test_sequences() {
    let mut facade = facade_with(vec![
        array(&["a", "b"]),
        Reply::Array(None),
        array(&["x"]),
        array(&["1", "2", "3"]),
    ]);

    assert_eq!(facade.s_members("s").unwrap(), vec![b("a"), b("b")]);
    assert!(facade.s_inter(&["s1", "s2"]).unwrap().is_empty());
    assert_eq!(facade.h_vals("h").unwrap(), vec![b("x")]);
    assert_eq!(facade.l_range("l", 0, -1).unwrap().len(), 3);
}

#[test]
fn test_m_get_keeps_missing_positions() {
    let mut facade = facade_with(vec![Reply::array(vec![
        bulk("1"),
        Reply::nil(),
        bulk("3"),
    ])]);

    let values = facade.m_get(&["a", "b", "c"]).unwrap();
    assert_eq!(values, vec![Some(b("1")), None, Some(b("3"))]);
}

#[test]
fn test_h_get_all_pairs() {
    let mut facade = facade_with(vec![array(&["f1", "v1", "f2", "v2"])]);

    let pairs = facade.h_get_all("h").unwrap();
    assert_eq!(pairs, vec![(b("f1"), b("v1")), (b("f2"), b("v2"))]);
}

#[test]
fn test_h_get_all_odd_reply_is_protocol_error() {
    let mut facade = facade_with(vec![array(&["f1", "v1", "f2"])]);

    let err = facade.h_get_all("h").unwrap_err();
    assert!(matches!(err, FacadeError::Protocol(_)));
}

#[test]
fn test_scored_ranges() {
    let mut facade = facade_with(vec![
        array(&["top", "9", "low", "1.5"]),
        array(&["a", "1"]),
    ]);

    assert_eq!(
        facade.z_rev_range_with_scores("z", 0, -1).unwrap(),
        vec![(b("top"), 9.0), (b("low"), 1.5)]
    );
    assert_eq!(
        facade.z_range_by_score_with_scores("z", "-inf", "+inf", None).unwrap(),
        vec![(b("a"), 1.0)]
    );
}

#[test]
fn test_rev_range_by_score_limit_framing() {
    let mut facade = facade_with(vec![array(&["c", "b"])]);

    let members = facade.z_rev_range_by_score_limit("z", "+inf", "0", 0, 2).unwrap();
    assert_eq!(members, vec![b("c"), b("b")]);

    assert_eq!(
        facade.session().last(),
        &Command::ZRevRangeByScore {
            key: "z".to_string(),
            max: "+inf".to_string(),
            min: "0".to_string(),
            with_scores: false,
            limit: Some(RangeLimit { offset: 0, count: 2 }),
        }
    );
    let args = facade.session().last().to_args("");
    assert_eq!(&args[4..], &[b"LIMIT".to_vec(), b"0".to_vec(), b"2".to_vec()]);
}

#[test]
fn test_get_range_bytes() {
    let mut facade = facade_with(vec![bulk("ell")]);

    assert_eq!(facade.get_range("k", 1, 3).unwrap(), b("ell"));
}

// =============================================================================
// Conditional Sorted-Set Update Tests
// =============================================================================

#[test]
fn test_z_add_mod_nil_is_false() {
    let mut facade = facade_with(vec![Reply::nil(), Reply::Integer(1)]);

    assert!(!facade.z_add_mod("z", ZAddMode::Xx, 5.0, "m").unwrap());
    assert!(facade.z_add_mod("z", ZAddMode::Nx, 5.0, "m").unwrap());
}

#[test]
fn test_z_add_mod_invokes_script_with_prefixed_key() {
    let session = MockSession::with_replies(vec![Reply::Integer(1)]).with_prefix("app:");
    let mut facade = Facade::new(session);

    facade.z_add_mod("z", ZAddMode::Xx, 5.0, "m").unwrap();

    assert_eq!(
        facade.session().last(),
        &Command::EvalSha {
            sha1: ZADD_XX_NX.sha1(),
            args: vec![b("app:z"), b("XX"), b("5"), b("m")],
            num_keys: 1,
        }
    );
}

#[test]
fn test_script_hash_is_lowercase_hex_sha1() {
    let sha = ZADD_XX_NX.sha1();

    assert_eq!(sha.len(), 40);
    assert!(sha.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn test_load_scripts_checks_registered_hash() {
    let expected = ZADD_XX_NX.sha1();
    let mut facade = facade_with(vec![Reply::bulk(expected.clone())]);
    facade.load_scripts().unwrap();
    assert_eq!(facade.session().names(), vec!["SCRIPT"]);

    let mut facade = facade_with(vec![bulk("0000000000000000000000000000000000000000")]);
    let err = facade.load_scripts().unwrap_err();
    assert!(matches!(err, FacadeError::Protocol(_)));
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_run_query_is_unsupported() {
    let mut facade = facade_with(vec![]);

    let err = facade.run_query("SELECT 1", &[]).unwrap_err();
    assert!(matches!(err, FacadeError::Unsupported(_)));
    assert!(facade.session().sent.is_empty());
}

#[test]
fn test_error_reply_is_server_error() {
    let mut facade = facade_with(vec![Reply::Error(
        "WRONGTYPE Operation against a key holding the wrong kind of value".to_string(),
    )]);

    let err = facade.incr("h").unwrap_err();
    match err {
        FacadeError::Server(message) => assert!(message.starts_with("WRONGTYPE")),
        other => panic!("Expected server error, got {:?}", other),
    }
}

#[test]
fn test_session_failure_propagates() {
    let mut facade = facade_with(vec![]);
    facade.session_mut().fail_on("GET");

    let err = facade.get("k").unwrap_err();
    assert!(matches!(err, FacadeError::Network(_)));
}

#[test]
fn test_unexpected_reply_shape_is_protocol_error() {
    let mut facade = facade_with(vec![bulk("not a number")]);

    assert!(matches!(facade.incr("k"), Err(FacadeError::Protocol(_))));
}

// =============================================================================
// Administrative Tests
// =============================================================================

#[test]
fn test_info_parses_fields() {
    let mut facade = facade_with(vec![bulk(
        "# Server\r\nredis_version:7.2.4\r\nrole:master\r\n\r\n# Keyspace\r\ndb0:keys=3,expires=0\r\n",
    )]);

    let info = facade.info().unwrap();
    assert_eq!(info.get("redis_version").map(String::as_str), Some("7.2.4"));
    assert_eq!(info.get("role").map(String::as_str), Some("master"));
    assert_eq!(info.get("db0").map(String::as_str), Some("keys=3,expires=0"));
    assert_eq!(info.len(), 3);
}

#[test]
fn test_admin_commands_framing() {
    let mut facade = facade_with(vec![]);

    facade.watch("k").unwrap();
    facade.unwatch().unwrap();
    facade.flush().unwrap();
    facade.rename("old", "new").unwrap();

    assert_eq!(
        facade.session().names(),
        vec!["WATCH", "UNWATCH", "FLUSHDB", "RENAME"]
    );
}

#[test]
fn test_key_prefix_applies_to_key_arguments_only() {
    let command = Command::HSet {
        key: "h".to_string(),
        field: "f".to_string(),
        value: b("v"),
    };

    let args = command.to_args("ns:");
    assert_eq!(
        args,
        vec![b"HSET".to_vec(), b"ns:h".to_vec(), b"f".to_vec(), b"v".to_vec()]
    );
}
