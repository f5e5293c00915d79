use jsonquery::functions::{ArgType, Signature};
use jsonquery::{Error, FunctionError, QuerySession, Value};

fn eval(query: &str, json: &str) -> Result<String, Error> {
    QuerySession::new(json)?.eval(query)
}

fn eval_ok(query: &str, json: &str) -> String {
    match eval(query, json) {
        Ok(out) => out,
        Err(e) => panic!("{} failed: {}", query, e),
    }
}

const PEOPLE: &str = r#"{"people": [
    {"name": "b", "age": 30},
    {"name": "a", "age": 25},
    {"name": "c", "age": 30}
]}"#;

// ============================================================================
// Numeric
// ============================================================================

#[test]
fn test_abs() {
    assert_eq!(eval_ok("abs(`-3`)", "null"), "3");
    assert_eq!(eval_ok("abs(`-2.5`)", "null"), "2.5");
}

#[test]
fn test_ceil_floor_return_integers() {
    assert_eq!(eval_ok("ceil(`1.2`)", "null"), "2");
    assert_eq!(eval_ok("floor(`1.8`)", "null"), "1");
    assert_eq!(eval_ok("floor(`-1.2`)", "null"), "-2");
    assert_eq!(eval_ok("ceil(`4`)", "null"), "4");
}

#[test]
fn test_sum_and_avg() {
    assert_eq!(eval_ok("sum(@)", "[1, 2, 3]"), "6");
    assert_eq!(eval_ok("sum(@)", "[]"), "0");
    assert_eq!(eval_ok("sum(@)", "[0.1, 0.2]"), "0.3");
    assert_eq!(eval_ok("avg(@)", "[1, 2, 3, 4]"), "2.5");
    assert_eq!(eval_ok("avg(@)", "[]"), "null");
}

#[test]
fn test_max_min() {
    assert_eq!(eval_ok("max(@)", "[1, 5, 3]"), "5");
    assert_eq!(eval_ok("min(@)", "[1, 5, -3.5]"), "-3.5");
    assert_eq!(eval_ok("max(@)", r#"["a", "c", "b"]"#), r#""c""#);
    assert_eq!(eval_ok("min(@)", "[]"), "null");
}

#[test]
fn test_max_by_min_by() {
    assert_eq!(eval_ok("max_by(people, &age).name", PEOPLE), r#""b""#);
    assert_eq!(eval_ok("min_by(people, &age).name", PEOPLE), r#""a""#);
    assert_eq!(eval_ok("max_by(people, &name).name", PEOPLE), r#""c""#);
}

#[test]
fn test_max_by_rejects_mixed_keys() {
    let err = eval("max_by(@, &k)", r#"[{"k": 1}, {"k": "x"}]"#).unwrap_err();
    assert!(matches!(err, Error::Function(FunctionError::Invalid { .. })), "{:?}", err);
}

// ============================================================================
// Strings and collections
// ============================================================================

#[test]
fn test_length() {
    assert_eq!(eval_ok("length(@)", r#""héllo""#), "5");
    assert_eq!(eval_ok("length(@)", "[1, 2]"), "2");
    assert_eq!(eval_ok("length(@)", r#"{"a": 1}"#), "1");
}

#[test]
fn test_contains() {
    assert_eq!(eval_ok("contains(@, `2`)", "[1, 2]"), "true");
    assert_eq!(eval_ok("contains(@, `2.0`)", "[1, 2]"), "true");
    assert_eq!(eval_ok("contains(@, 'ell')", r#""hello""#), "true");
    assert_eq!(eval_ok("contains(@, `1`)", r#""1""#), "false");
}

#[test]
fn test_starts_ends_with() {
    assert_eq!(eval_ok("starts_with(@, 'ab')", r#""abc""#), "true");
    assert_eq!(eval_ok("ends_with(@, 'ab')", r#""abc""#), "false");
}

#[test]
fn test_join() {
    assert_eq!(eval_ok("join(', ', @)", r#"["a", "b"]"#), r#""a, b""#);
    assert!(eval("join(', ', @)", r#"["a", 1]"#).is_err());
}

#[test]
fn test_keys_values_preserve_order() {
    let doc = r#"{"z": 1, "a": 2}"#;
    assert_eq!(eval_ok("keys(@)", doc), r#"["z","a"]"#);
    assert_eq!(eval_ok("values(@)", doc), "[1,2]");
}

#[test]
fn test_merge() {
    assert_eq!(
        eval_ok("merge(a, b)", r#"{"a": {"x": 1, "y": 2}, "b": {"y": 3, "z": 4}}"#),
        r#"{"x":1,"y":3,"z":4}"#
    );
}

#[test]
fn test_not_null() {
    assert_eq!(eval_ok("not_null(a, b, c)", r#"{"b": 0, "c": 1}"#), "0");
    assert_eq!(eval_ok("not_null(a)", "{}"), "null");
}

#[test]
fn test_reverse() {
    assert_eq!(eval_ok("reverse(@)", "[1, 2, 3]"), "[3,2,1]");
    assert_eq!(eval_ok("reverse(@)", r#""abc""#), r#""cba""#);
}

#[test]
fn test_flatten_function() {
    assert_eq!(eval_ok("flatten(@)", "[[1], 2, [[3]]]"), "[1,2,[3]]");
}

#[test]
fn test_sort_and_sort_by() {
    assert_eq!(eval_ok("sort(@)", "[3, 1.5, 2]"), "[1.5,2,3]");
    assert_eq!(eval_ok("sort(@)", r#"["b", "a"]"#), r#"["a","b"]"#);
    // stable for equal keys
    assert_eq!(
        eval_ok("sort_by(people, &age)[*].name", PEOPLE),
        r#"["a","b","c"]"#
    );
    assert!(eval("sort(@)", r#"[1, "a"]"#).is_err());
}

#[test]
fn test_map() {
    assert_eq!(
        eval_ok("map(&age, people)", PEOPLE),
        "[30,25,30]"
    );
    assert_eq!(eval_ok("map(&missing, @)", "[{}, {}]"), "[null,null]");
}

// ============================================================================
// Conversions
// ============================================================================

#[test]
fn test_to_string_and_number() {
    assert_eq!(eval_ok("to_string(@)", "[1, 2]"), r#""[1,2]""#);
    assert_eq!(eval_ok("to_string(@)", r#""x""#), r#""x""#);
    assert_eq!(eval_ok("to_number(@)", r#""42""#), "42");
    assert_eq!(eval_ok("to_number(@)", r#""1.5""#), "1.5");
    assert_eq!(eval_ok("to_number(@)", r#""abc""#), "null");
    assert_eq!(eval_ok("to_number(@)", "true"), "null");
}

#[test]
fn test_to_array_and_type() {
    assert_eq!(eval_ok("to_array(@)", "1"), "[1]");
    assert_eq!(eval_ok("to_array(@)", "[1]"), "[1]");
    assert_eq!(eval_ok("type(@)", "1.5"), r#""number""#);
    assert_eq!(eval_ok("type(@)", "{}"), r#""object""#);
}

// ============================================================================
// Errors and extension
// ============================================================================

#[test]
fn test_unknown_function() {
    let err = eval("nope(@)", "{}").unwrap_err();
    assert!(matches!(err, Error::Function(FunctionError::UnknownFunction(_))));
}

#[test]
fn test_arity_error_names_signature() {
    let err = eval("abs(`1`, `2`)", "{}").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("abs(number)"), "{}", message);
}

#[test]
fn test_type_error_names_argument() {
    let err = eval("length(`1`)", "{}").unwrap_err();
    match err {
        Error::Function(FunctionError::ArgumentType { position, actual, .. }) => {
            assert_eq!(position, 1);
            assert_eq!(actual, "number");
        }
        other => panic!("Expected argument type error, got {:?}", other),
    }
}

#[test]
fn test_expref_where_value_expected() {
    assert!(eval("length(&a)", "{}").is_err());
}

#[test]
fn test_register_custom_function() {
    let mut session = QuerySession::new(r#"{"n": 4}"#).unwrap();
    session.registry_mut().register(
        "double",
        Signature::new(vec![ArgType::Number]),
        |args, _ctx| {
            let n = args[0].as_value().and_then(Value::as_float).unwrap_or_default();
            Ok(Value::Float(n * 2.0))
        },
    );
    assert_eq!(session.eval("double(n)").unwrap(), "8.0");
}
