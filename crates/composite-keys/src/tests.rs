//! Scenario tests for elif-composite-keys
//!
//! Tests cover normalized keys, binary columns, key scopes and the way the
//! pieces fit together for composite-keyed entities

use crate::codec::BinaryCodec;
use crate::config::KeyConfig;
use crate::error::KeyError;
use crate::key::{decode, encode, KeyInput, KeyTuple};
use crate::model::CompositeKey;
use crate::query::{Predicate, QueryBuilder};
use crate::relationships::CompositeBelongsToMany;
use crate::scope::{CompositeKeyScope, KeySelector};
use crate::value::KeyValue;

use fixtures::{ApiToken, Device, Membership, Session, Tag};


fn memberships() -> KeyConfig {
    KeyConfig::new("memberships", ["org_id", "user_id"])
}

fn row(org: i64, user: i64) -> KeyTuple {
    KeyTuple::new().with("org_id", org).with("user_id", user)
}

fn all_rows() -> Vec<(i64, i64)> {
    (0..4).flat_map(|org| (0..10).map(move |user| (org, user))).collect()
}

#[test]
fn test_inclusion_matches_only_selected_rows() {
    let predicate = CompositeKeyScope::new(
        &memberships(),
        KeySelector::include([row(1, 5), row(2, 9)]),
    )
    .compile()
    .unwrap();

    let matched: Vec<(i64, i64)> = all_rows()
        .into_iter()
        .filter(|(org, user)| predicate.matches(&row(*org, *user)))
        .collect();
    assert_eq!(matched, vec![(1, 5), (2, 9)]);
}

#[test]
fn test_exclusion_matches_every_other_row() {
    let predicate = CompositeKeyScope::new(&memberships(), KeySelector::exclude([row(1, 5)]))
        .compile()
        .unwrap();

    for (org, user) in all_rows() {
        assert_eq!(predicate.matches(&row(org, user)), (org, user) != (1, 5));
    }
}

#[test]
fn test_normalized_key_round_trip() {
    let config = KeyConfig::new("pairs", ["a", "b"]);
    let tuple = KeyTuple::new().with("a", "X").with("b", "Y");

    let key = encode(&config, &tuple).unwrap();
    assert_eq!(key, "X___Y");
    assert_eq!(decode(&config, &key).unwrap(), tuple);
}

#[test]
fn test_binary_column_conversions() {
    let config = KeyConfig::new("api_tokens", ["org_id", "token"]).with_binary_columns(["token"]);
    let codec = BinaryCodec::new(&config);
    let stored = KeyValue::Bytes(vec![0xab, 0xcd]);

    let external = codec.to_external("token", stored.clone());
    assert_eq!(external, KeyValue::from("ABCD"));
    assert_eq!(codec.to_storage("token", external), stored);
}

#[test]
fn test_short_normalized_key_is_malformed() {
    let err = decode(&memberships(), "1").unwrap_err();
    match err {
        KeyError::MalformedKey { expected, found, .. } => {
            assert_eq!(expected, 2);
            assert_eq!(found, 1);
        }
        other => panic!("expected MalformedKey, got {:?}", other),
    }
}

#[test]
fn test_entities_and_normalized_keys_select_the_same_rows() {
    let entities = vec![Membership::new(1, 5), Membership::new(2, 9)];
    let keys: Vec<String> = entities
        .iter()
        .map(|membership| membership.normalized_key().unwrap())
        .collect();

    let by_entity = Membership::query_for_keys(KeySelector {
        keys: vec![KeyInput::entities(&entities)],
        inverse: false,
    })
    .unwrap();
    let by_key = Membership::query_for_keys(KeySelector::include(keys)).unwrap();

    for (org, user) in all_rows() {
        let candidate = Membership::new(org, user);
        assert_eq!(
            by_entity.where_predicate().matches(&candidate),
            by_key.where_predicate().matches(&candidate)
        );
    }
}

#[test]
fn test_binary_composite_key_through_sql() {
    let token = ApiToken::new(7, vec![0xab, 0xcd]);
    let key = token.normalized_key().unwrap();
    assert_eq!(key, "7___ABCD");

    let query = ApiToken::query_for_keys(KeySelector::exclude([key.as_str()])).unwrap();
    let (sql, params) = query.to_sql_with_params();
    assert_eq!(
        sql,
        "SELECT * FROM api_tokens WHERE (api_tokens.org_id != $1 OR api_tokens.token != $2)"
    );
    assert_eq!(params, vec![KeyValue::from("7"), KeyValue::Bytes(vec![0xab, 0xcd])]);
    assert!(!query.where_predicate().matches(&token));
    assert!(query.where_predicate().matches(&ApiToken::new(7, vec![0xab])));
}

#[test]
fn test_hex_mode_keeps_hex_text() {
    let session = Session::new(4, "0a0b");
    assert_eq!(session.normalized_key().unwrap(), "4___0A0B");

    let query: QueryBuilder = session
        .set_keys_for_save_query(QueryBuilder::new().delete_from("sessions"))
        .unwrap();
    assert_eq!(
        query.to_sql(),
        "DELETE FROM sessions WHERE user_id = 4 AND sid = '0A0B'"
    );

    let mut fresh = Session { user_id: 4, sid: None };
    fresh.fill_binary_keys();
    let sid = fresh.sid.unwrap();
    assert_eq!(sid.len(), 32);
    assert_eq!(sid, sid.to_ascii_uppercase());
}

#[test]
fn test_empty_selectors() {
    let config = memberships();

    let include = CompositeKeyScope::new(&config, KeySelector::include(Vec::<KeyTuple>::new()))
        .compile()
        .unwrap();
    let exclude = CompositeKeyScope::new(&config, KeySelector::exclude(Vec::<KeyTuple>::new()))
        .compile()
        .unwrap();

    assert_eq!(include, Predicate::Or(vec![]));
    assert_eq!(exclude, Predicate::And(vec![]));
    assert!(!include.matches(&row(1, 1)));
    assert!(exclude.matches(&row(1, 1)));

    let query: QueryBuilder = QueryBuilder::new().from("memberships").where_group(include);
    assert_eq!(query.to_sql(), "SELECT * FROM memberships WHERE 1 = 0");
}

#[test]
fn test_pivot_for_binary_keys_end_to_end() {
    let device = Device::new(vec![0x0a, 0x0b], "sensor");
    let tags = vec![Tag::new(vec![0x01], "indoor"), Tag::new(vec![0x02], "outdoor")];
    let relation: CompositeBelongsToMany<Device, Tag> =
        CompositeBelongsToMany::new(device, "device_tag", "device_uid", "tag_id").unwrap();

    let ids = KeyInput::Collection(vec![KeyInput::entities(&tags), KeyInput::from("FF")]);
    let statements = relation.attach(ids, vec![]).unwrap();
    let sql: Vec<String> = statements.iter().map(|statement| statement.to_sql()).collect();
    assert_eq!(
        sql,
        vec![
            "INSERT INTO device_tag (tag_id, device_uid) VALUES (X'01', X'0A0B')",
            "INSERT INTO device_tag (tag_id, device_uid) VALUES (X'02', X'0A0B')",
            "INSERT INTO device_tag (tag_id, device_uid) VALUES (X'FF', X'0A0B')",
        ]
    );
}
