//! Template-level properties of the filter compiler: shorthand
//! equivalences, combinator shapes and error behavior.

mod common;

use common::{compile, ALLOWED};
use filterql::{apply_criteria_filter, FilterError, QueryCriteria, Scope};
use serde_json::json;

fn build(filter: serde_json::Value) -> (String, Vec<serde_json::Value>) {
    compile(filter).build().expect("non-empty predicate")
}

#[test]
fn scalar_shorthand_matches_explicit_eq() {
    for value in [json!("alice"), json!(42), json!(true)] {
        assert_eq!(
            compile(json!({"userName": value.clone()})).build(),
            compile(json!({"userName": {"$eq": value}})).build(),
        );
    }
}

#[test]
fn array_shorthand_matches_explicit_in() {
    assert_eq!(
        compile(json!({"id": [1, 2, 3]})).build(),
        compile(json!({"id": {"$in": [1, 2, 3]}})).build(),
    );
}

#[test]
fn null_always_compiles_to_is_null() {
    let (shorthand, _) = build(json!({"externalId": null}));
    let (explicit, _) = build(json!({"externalId": {"$eq": null}}));
    assert_eq!(shorthand, "users.external_id IS NULL");
    assert_eq!(shorthand, explicit);

    let (negated, params) = build(json!({"externalId": {"$neq": null}}));
    assert_eq!(negated, "users.external_id IS NOT NULL");
    assert!(params.is_empty());
}

#[test]
fn same_type_nesting_collapses_flat() {
    let (sql, params) = build(json!({
        "id": 1,
        "$and": {"userName": "a", "$and": {"active": true}}
    }));
    assert_eq!(sql, "users.id = ? AND users.username = ? AND users.active = ?");
    assert_eq!(params.len(), 3);
}

#[test]
fn mixed_combinators_keep_written_order() {
    let (sql, _) = build(json!({
        "id": 1,
        "$or": {"userName": "a"},
        "$and": {"active": true}
    }));
    assert_eq!(sql, "(users.id = ? OR users.username = ?) AND users.active = ?");
}

#[test]
fn grouping_combinators_always_parenthesize() {
    let (flat, _) = build(json!({"active": true, "$or": {"id": 1, "userName": "a"}}));
    let (grouped, _) = build(json!({"active": true, "$or()": {"id": 1, "userName": "a"}}));
    assert_eq!(flat, "users.active = ? OR users.id = ? OR users.username = ?");
    assert_eq!(grouped, "users.active = ? AND (users.id = ? OR users.username = ?)");
    assert_ne!(flat, grouped);
}

#[test]
fn attributes_from_different_tables_compile_side_by_side() {
    let (sql, _) = build(json!({"displayName": "engineering", "userName": "alice"}));
    assert_eq!(sql, "groups.display_name = ? AND users.username = ?");
}

#[test]
fn operator_map_combines_under_or_arrays() {
    let (sql, params) = build(json!([{"id": {"$lt": 2, "$gt": 10}}]));
    assert_eq!(sql, "users.id < ? OR users.id > ?");
    assert_eq!(params, vec![json!(2), json!(10)]);
}

#[test]
fn unknown_combinator_and_unknown_attribute_fail_the_same() {
    let mut first = None;
    for key in ["$nand", "bogusAttr"] {
        let mut scope = Scope::new();
        let err = apply_criteria_filter(
            &mut scope,
            ALLOWED,
            &QueryCriteria::with_filter(json!({key: 1})),
            None,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, FilterError::IllegalAttributeOrOperator(_)));
        assert!(message.contains(&format!("'{}'", key)));
        // Identical wording apart from the key itself.
        let normalized = message.replace(key, "<key>");
        if let Some(previous) = first.replace(normalized.clone()) {
            assert_eq!(previous, normalized);
        }
    }
}

#[test]
fn unknown_operator_names_the_operator() {
    let mut scope = Scope::new();
    let err = apply_criteria_filter(
        &mut scope,
        ALLOWED,
        &QueryCriteria::with_filter(json!({"userName": {"$foo": 1}})),
        None,
    )
    .unwrap_err();
    match err {
        FilterError::UnknownOperator {
            operator,
            translator,
        } => {
            assert_eq!(operator, "$foo");
            assert_eq!(translator, "relational");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn unhandled_shorthand_produces_no_predicate() {
    assert!(compile(json!({"userName": {"plain": "object"}})).is_empty());
}

#[test]
fn deeply_nested_groups_stay_isolated() {
    let (sql, _) = build(json!({
        "$or()": {
            "userName": "a",
            "$and()": {"id": {"$gt": 1}, "active": true}
        }
    }));
    assert_eq!(sql, "users.username = ? OR (users.id > ? AND users.active = ?)");
}
