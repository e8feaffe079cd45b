//! Document attribute filtering against the SQLite fixture: path
//! addressing, key probes, containment and serialized structural values.

mod common;

use common::{compile, open_fixture, user_ids, ALLOWED};
use filterql::{apply_criteria_filter, FilterError, QueryCriteria, Scope};
use serde_json::json;

#[test]
fn path_comparison_reads_nested_values() {
    let conn = open_fixture();
    let scope = compile(json!({"data.name.givenName": "Alice"}));
    assert_eq!(user_ids(&conn, &scope), vec![1]);

    let scope = compile(json!({"data.age": {"$gte": 30}}));
    assert_eq!(user_ids(&conn, &scope), vec![1, 3]);
}

#[test]
fn bracket_paths_index_into_arrays() {
    let conn = open_fixture();
    let scope = compile(json!({"data.tags[0]": "admin"}));
    assert_eq!(user_ids(&conn, &scope), vec![1, 3]);
}

#[test]
fn in_operator_applies_to_extracted_values() {
    let conn = open_fixture();
    let scope = compile(json!({"data.age": {"$in": [28, 41]}}));
    assert_eq!(user_ids(&conn, &scope), vec![2, 3]);
}

#[test]
fn has_probes_key_presence() {
    let conn = open_fixture();
    let scope = compile(json!({"data.name": {"$has": "familyName"}}));
    assert_eq!(user_ids(&conn, &scope), vec![1]);

    // Users whose name object lacks the key, including the user with no
    // name object at all.
    let scope = compile(json!({"data.name": {"$nhas": "familyName"}}));
    assert_eq!(user_ids(&conn, &scope), vec![2, 3, 4]);
}

#[test]
fn contains_scalar_checks_array_membership() {
    let conn = open_fixture();
    let scope = compile(json!({"data.tags": {"$contains": "dev"}}));
    assert_eq!(user_ids(&conn, &scope), vec![2, 3]);
}

#[test]
fn contains_array_requires_all_members() {
    let conn = open_fixture();
    let scope = compile(json!({"data.tags": {"$contains": ["admin", "ops"]}}));
    assert_eq!(user_ids(&conn, &scope), vec![1, 3]);
}

#[test]
fn ncontains_matches_the_complement_among_arrays() {
    let conn = open_fixture();
    let scope = compile(json!({"data.tags": {"$ncontains": "dev"}}));
    assert_eq!(user_ids(&conn, &scope), vec![1, 4]);
}

#[test]
fn array_shorthand_compares_the_serialized_document_value() {
    let conn = open_fixture();
    let scope = compile(json!({"data.tags": ["admin", "ops"]}));
    let (sql, params) = scope.build().expect("predicate");
    assert_eq!(sql, "json_extract(users.data, '$.tags') = ?");
    assert_eq!(params, vec![json!(r#"["admin","ops"]"#)]);
    assert_eq!(user_ids(&conn, &scope), vec![1]);
}

#[test]
fn object_shorthand_compares_the_serialized_document_value() {
    let conn = open_fixture();
    let scope = compile(json!({"data.name": {"givenName": "Bob"}}));
    assert_eq!(user_ids(&conn, &scope), vec![2]);
}

#[test]
fn boolean_operands_serialize_to_text() {
    // The serializer contract canonicalizes booleans to their JSON text
    // form, asserted at the template level.
    let scope = compile(json!({"data.verified": {"$eq": true}}));
    let (sql, params) = scope.build().expect("predicate");
    assert_eq!(sql, "json_extract(users.data, '$.verified') = ?");
    assert_eq!(params, vec![json!("true")]);
}

#[test]
fn null_probe_matches_missing_paths() {
    let conn = open_fixture();
    let scope = compile(json!({"data.name.givenName": null}));
    assert_eq!(user_ids(&conn, &scope), vec![4]);
}

#[test]
fn invalid_path_suffix_is_rejected() {
    for attribute in ["database", "data!x", "data.."] {
        let mut scope = Scope::new();
        let err = apply_criteria_filter(
            &mut scope,
            ALLOWED,
            &QueryCriteria::with_filter(json!({attribute: 1})),
            None,
        )
        .unwrap_err();
        assert!(
            matches!(err, FilterError::InvalidPathPrefix { .. }),
            "expected path error for '{}', got {:?}",
            attribute,
            err
        );
    }
}

#[test]
fn document_predicates_compose_with_column_predicates() {
    let conn = open_fixture();
    let scope = compile(json!({
        "active": true,
        "data.tags": {"$contains": "admin"}
    }));
    assert_eq!(user_ids(&conn, &scope), vec![1]);
}
