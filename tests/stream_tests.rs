use jsonquery::{Error, JsonQuery};

const ERROR_MSG: &str = r#"{"level": "error", "message": "disk full", "host": "db1"}"#;
const INFO_MSG: &str = r#"{"level": "info", "message": "ok", "host": "api1"}"#;

// ============================================================================
// Predicates
// ============================================================================

#[test]
fn test_no_predicate_matches_everything() {
    let query = JsonQuery::new();
    assert!(query.matches(ERROR_MSG).unwrap());
    assert!(query.matches("null").unwrap());
}

#[test]
fn test_predicate_uses_truthiness() {
    let mut query = JsonQuery::new();
    query.setup_predicate("tags").unwrap();
    assert!(query.matches(r#"{"tags": ["a"]}"#).unwrap());
    assert!(!query.matches(r#"{"tags": []}"#).unwrap());
    assert!(!query.matches("{}").unwrap());
}

#[test]
fn test_invalid_predicate_keeps_previous() {
    let mut query = JsonQuery::new();
    query.setup_predicate("level == 'error'").unwrap();
    assert!(query.setup_predicate("level ==").is_err());
    assert!(!query.matches(INFO_MSG).unwrap());
}

#[test]
fn test_invalid_message_json() {
    let mut query = JsonQuery::new();
    assert!(matches!(query.matches("{"), Err(Error::JsonSyntax(_))));
    assert!(matches!(
        query.process("k", "not json", false),
        Err(Error::JsonSyntax(_))
    ));
    assert!(query.outputs().is_empty());
}

// ============================================================================
// Processing
// ============================================================================

#[test]
fn test_process_records_transform_results() {
    let mut query = JsonQuery::new();
    query.setup_predicate("level == 'error'").unwrap();
    query.setup_transforms(&["message", "{h: host}"]).unwrap();

    assert!(query.process("k1", ERROR_MSG, false).unwrap());
    assert!(!query.process("k2", INFO_MSG, false).unwrap());

    assert_eq!(
        query.outputs(),
        &[
            ("k1".to_string(), r#""disk full""#.to_string()),
            ("k1".to_string(), r#"{"h":"db1"}"#.to_string()),
        ]
    );
}

#[test]
fn test_skip_predicate() {
    let mut query = JsonQuery::new();
    query.setup_predicate("level == 'error'").unwrap();
    query.setup_transforms(&["host"]).unwrap();

    assert!(query.process("k2", INFO_MSG, true).unwrap());
    assert_eq!(query.outputs_json(), r#"[["k2","api1"]]"#);
}

#[test]
fn test_null_transform_results_skipped() {
    let mut query = JsonQuery::new();
    query.setup_transforms(&["missing", "host"]).unwrap();
    assert!(query.process("k", ERROR_MSG, false).unwrap());
    assert_eq!(query.outputs().len(), 1);
    assert_eq!(query.outputs()[0].1, r#""db1""#);
}

#[test]
fn test_without_transforms_records_message() {
    let mut query = JsonQuery::new();
    query.process("k", r#"{ "b" : 1, "a" : [ true ] }"#, false).unwrap();
    assert_eq!(query.outputs_json(), r#"[["k",{"b":1,"a":[true]}]]"#);
}

#[test]
fn test_transform_error_records_nothing() {
    let mut query = JsonQuery::new();
    query.setup_transforms(&["host", "length(`1`)"]).unwrap();
    assert!(query.process("k", ERROR_MSG, false).is_err());
    assert!(query.outputs().is_empty());
}

#[test]
fn test_setup_transforms_all_or_none() {
    let mut query = JsonQuery::new();
    query.setup_transforms(&["host"]).unwrap();
    assert!(query.setup_transforms(&["message", "[oops"]).is_err());

    query.process("k", ERROR_MSG, false).unwrap();
    assert_eq!(query.outputs_json(), r#"[["k","db1"]]"#);
}

// ============================================================================
// Outputs
// ============================================================================

#[test]
fn test_outputs_json_escapes_keys() {
    let mut query = JsonQuery::new();
    query.setup_transforms(&["level"]).unwrap();
    query.process("a\"b", ERROR_MSG, false).unwrap();
    assert_eq!(query.outputs_json(), r#"[["a\"b","error"]]"#);
}

#[test]
fn test_outputs_json_empty() {
    assert_eq!(JsonQuery::new().outputs_json(), "[]");
}

#[test]
fn test_take_outputs_drains() {
    let mut query = JsonQuery::new();
    query.setup_transforms(&["level"]).unwrap();
    query.process("k1", ERROR_MSG, false).unwrap();
    query.process("k2", INFO_MSG, false).unwrap();

    let taken = query.take_outputs();
    assert_eq!(taken.len(), 2);
    assert_eq!(taken[1], ("k2".to_string(), r#""info""#.to_string()));
    assert!(query.outputs().is_empty());
}
