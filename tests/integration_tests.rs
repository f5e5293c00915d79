use jsonquery::{Error, EvalError, Value, search, to_json};

fn eval(query: &str, json: &str) -> Result<Value, Error> {
    let doc = Value::from_json(json).unwrap();
    search(query, &doc)
}

/// Evaluates and renders as compact JSON.
fn eval_json(query: &str, json: &str) -> String {
    match eval(query, json) {
        Ok(value) => to_json(&value),
        Err(e) => panic!("{} failed: {}", query, e),
    }
}

const PEOPLE: &str = r#"{
    "people": [
        {"age": 20, "other": "foo", "name": "Bob"},
        {"age": 25, "other": "bar", "name": "Fred"},
        {"age": 30, "other": "baz", "name": "George"}
    ]
}"#;

const STATES: &str = r#"[
    {"home_state": "WA",
     "states": [
        {"name": "WA", "cities": ["Seattle", "Bellevue", "Olympia"]},
        {"name": "CA", "cities": ["Los Angeles", "San Francisco"]},
        {"name": "NY", "cities": ["New York City", "Albany"]}
     ]},
    {"home_state": "NY",
     "states": [
        {"name": "WA", "cities": ["Seattle", "Bellevue", "Olympia"]},
        {"name": "CA", "cities": ["Los Angeles", "San Francisco"]},
        {"name": "NY", "cities": ["New York City", "Albany"]}
     ]}
]"#;

// ============================================================================
// Field access
// ============================================================================

#[test]
fn test_simple_field_access() {
    assert_eq!(eval_json("name", r#"{"name": "John", "age": 30}"#), r#""John""#);
}

#[test]
fn test_nested_access() {
    assert_eq!(
        eval_json("user.name", r#"{"user": {"name": "Alice"}}"#),
        r#""Alice""#
    );
}

#[test]
fn test_missing_field_is_null() {
    assert_eq!(eval_json("a.b.c", r#"{"a": {}}"#), "null");
    assert_eq!(eval_json("a", "[1, 2]"), "null");
    assert_eq!(eval_json("a", r#""text""#), "null");
}

#[test]
fn test_quoted_identifier_access() {
    assert_eq!(eval_json(r#""first name""#, r#"{"first name": "Ann"}"#), r#""Ann""#);
}

#[test]
fn test_identity() {
    let doc = r#"{"b":[1,2.5,"x",null,true],"a":{"z":{},"y":[]}}"#;
    assert_eq!(eval_json("@", doc), doc);
}

#[test]
fn test_root_reference() {
    assert_eq!(
        eval_json("items[*].[name, $.label]", r#"{"label": "L", "items": [{"name": "a"}]}"#),
        r#"[["a","L"]]"#
    );
}

// ============================================================================
// Index and slice
// ============================================================================

#[test]
fn test_index() {
    let doc = "[10, 20, 30]";
    assert_eq!(eval_json("[0]", doc), "10");
    assert_eq!(eval_json("[-1]", doc), "30");
    assert_eq!(eval_json("[-3]", doc), "10");
    assert_eq!(eval_json("[3]", doc), "null");
    assert_eq!(eval_json("[-4]", doc), "null");
    assert_eq!(eval_json("[0]", r#"{"a": 1}"#), "null");
}

#[test]
fn test_slices() {
    let doc = "[0, 1, 2, 3, 4, 5]";
    assert_eq!(eval_json("[1:3]", doc), "[1,2]");
    assert_eq!(eval_json("[:2]", doc), "[0,1]");
    assert_eq!(eval_json("[::2]", doc), "[0,2,4]");
    assert_eq!(eval_json("[::-1]", doc), "[5,4,3,2,1,0]");
    assert_eq!(eval_json("[-2:]", doc), "[4,5]");
    assert_eq!(eval_json("[10:]", doc), "[]");
    assert_eq!(eval_json("[1:3]", r#"{"a": 1}"#), "null");
}

#[test]
fn test_slice_projects() {
    let doc = r#"[{"a": 1}, {"a": 2}, {"b": 3}]"#;
    assert_eq!(eval_json("[0:3].a", doc), "[1,2]");
}

#[test]
fn test_zero_slice_step_fails() {
    assert!(matches!(
        eval("[::0]", "[1, 2]"),
        Err(Error::Runtime(EvalError::ZeroSliceStep))
    ));
}

// ============================================================================
// Projections
// ============================================================================

#[test]
fn test_wildcard_projection_drops_nulls() {
    let doc = r#"{"people": [{"first": "a"}, {"last": "b"}, {"first": "c"}]}"#;
    assert_eq!(eval_json("people[*].first", doc), r#"["a","c"]"#);
}

#[test]
fn test_projection_on_non_array_is_null() {
    assert_eq!(eval_json("a[*].b", r#"{"a": {"b": 1}}"#), "null");
    assert_eq!(eval_json("a.*.b", r#"{"a": [1]}"#), "null");
}

#[test]
fn test_object_projection_keeps_order() {
    let doc = r#"{"ops": {"z": {"n": 1}, "a": {"n": 2}, "m": {"x": 3}}}"#;
    assert_eq!(eval_json("ops.*.n", doc), "[1,2]");
}

#[test]
fn test_flatten_one_level() {
    let doc = "[[1, 2], 3, [[4]], []]";
    assert_eq!(eval_json("[]", doc), "[1,2,3,[4]]");
    assert_eq!(eval_json("[][]", doc), "[1,2,3,4]");
    assert_eq!(eval_json("a[]", r#"{"a": "x"}"#), "null");
}

#[test]
fn test_nested_projection_flattens() {
    let doc = r#"{"reservations": [
        {"instances": [{"id": 1}, {"id": 2}]},
        {"instances": [{"id": 3}]}
    ]}"#;
    assert_eq!(eval_json("reservations[*].instances[*].id", doc), "[[1,2],[3]]");
    assert_eq!(eval_json("reservations[].instances[].id", doc), "[1,2,3]");
}

#[test]
fn test_pipe_stops_projection() {
    let doc = r#"{"people": [{"name": "a"}, {"name": "b"}]}"#;
    assert_eq!(eval_json("people[*].name[0]", doc), "[]");
    assert_eq!(eval_json("people[*].name | [0]", doc), r#""a""#);
}

// ============================================================================
// Filters and truthiness
// ============================================================================

#[test]
fn test_filter_people_by_age() {
    assert_eq!(
        eval_json("people[?age > `20`].[name, age]", PEOPLE),
        r#"[["Fred",25],["George",30]]"#
    );
}

#[test]
fn test_zero_is_truthy() {
    assert_eq!(eval_json("[?0]", "[1, 2, 3]"), "[1,2,3]");
    assert_eq!(eval_json("[?`0`]", r#"["a"]"#), r#"["a"]"#);
}

#[test]
fn test_falsy_values_filtered_out() {
    let doc = r#"[{"v": null}, {"v": false}, {"v": ""}, {"v": []}, {"v": {}}, {"v": 0}, {"v": "x"}]"#;
    assert_eq!(eval_json("[?v].v", doc), r#"[0,"x"]"#);
}

#[test]
fn test_filter_with_raw_string() {
    let doc = r#"[{"s": "on"}, {"s": "off"}]"#;
    assert_eq!(eval_json("[?s == 'on']", doc), r#"[{"s":"on"}]"#);
}

// ============================================================================
// Comparisons and boolean operators
// ============================================================================

#[test]
fn test_comparisons() {
    assert_eq!(eval_json("a == b", r#"{"a": 1, "b": 1.0}"#), "true");
    assert_eq!(eval_json("a == b", r#"{"a": {"x": [1]}, "b": {"x": [1]}}"#), "true");
    assert_eq!(eval_json("a != b", r#"{"a": "1", "b": 1}"#), "true");
    assert_eq!(eval_json("a < b", r#"{"a": "abc", "b": "abd"}"#), "true");
    assert_eq!(eval_json("a <= b", r#"{"a": 2, "b": 2}"#), "true");
    assert_eq!(eval_json("a < b", r#"{"a": "1", "b": 2}"#), "null");
    assert_eq!(eval_json("a > b", r#"{"a": true, "b": false}"#), "null");
}

#[test]
fn test_or_and_return_operands() {
    let doc = r#"{"a": null, "b": "x", "c": 0}"#;
    assert_eq!(eval_json("a || b", doc), r#""x""#);
    assert_eq!(eval_json("b || a", doc), r#""x""#);
    assert_eq!(eval_json("a && b", doc), "null");
    assert_eq!(eval_json("c && b", doc), r#""x""#);
}

#[test]
fn test_not() {
    let doc = r#"{"a": [], "b": 0}"#;
    assert_eq!(eval_json("!a", doc), "true");
    assert_eq!(eval_json("!b", doc), "false");
    assert_eq!(eval_json("!missing", doc), "true");
}

// ============================================================================
// Multi-select
// ============================================================================

#[test]
fn test_multi_select_hash() {
    assert_eq!(
        eval_json("{n: name, y: age}", r#"{"name": "a", "age": 3}"#),
        r#"{"n":"a","y":3}"#
    );
}

#[test]
fn test_multi_select_on_null_is_null() {
    assert_eq!(eval_json("missing.[a, b]", "{}"), "null");
    assert_eq!(eval_json("missing.{a: a}", "{}"), "null");
}

#[test]
fn test_number_list() {
    assert_eq!(eval_json("[0, `1`, a]", r#"{"a": 2}"#), "[0,1,2]");
    assert_eq!(eval_json("[0, 1]", "null"), "null");
}

#[test]
fn test_literal_values() {
    assert_eq!(eval_json("`{\"a\": [1, 2]}`", "null"), r#"{"a":[1,2]}"#);
    assert_eq!(eval_json("'it\\'s'", "null"), r#""it's""#);
}

// ============================================================================
// let / in
// ============================================================================

#[test]
fn test_let_with_home_state() {
    assert_eq!(
        eval_json(
            "[*].[let $home_state = home_state in states[? name == $home_state].cities[]][]",
            STATES
        ),
        r#"[["Seattle","Bellevue","Olympia"],["New York City","Albany"]]"#
    );
}

#[test]
fn test_let_sequential_bindings() {
    assert_eq!(
        eval_json("let $a = x, $b = [$a, $a] in $b", r#"{"x": 1}"#),
        "[1,1]"
    );
}

#[test]
fn test_let_shadowing() {
    assert_eq!(
        eval_json("let $v = `1` in [let $v = `2` in $v, $v]", "{}"),
        "[2,1]"
    );
}

#[test]
fn test_let_bindings_use_outer_current() {
    // the binding sees the current node at the let, not the root
    assert_eq!(
        eval_json("items[*].[let $n = name in {n: $n}]", r#"{"items": [{"name": "a"}]}"#),
        r#"[[{"n":"a"}]]"#
    );
}

#[test]
fn test_let_scope_ends_with_body() {
    let result = eval("[let $x = `1` in $x, $x]", "{}");
    assert!(
        matches!(result, Err(Error::Runtime(EvalError::UndefinedVariable(ref name))) if name == "x"),
        "{:?}",
        result
    );
}

#[test]
fn test_undefined_variable_message() {
    let err = eval("$nope", "{}").unwrap_err();
    assert!(err.to_string().contains("undefined variable: nope"), "{}", err);
}

#[test]
fn test_expref_outside_function() {
    assert!(matches!(
        eval("&a", "{}"),
        Err(Error::Runtime(EvalError::UnexpectedExpressionRef))
    ));
}
