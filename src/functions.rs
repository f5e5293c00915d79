//! Built-in functions and the registry that dispatches them.
//!
//! Every entry pairs a [`Signature`] with an implementation. Arguments are
//! checked against the signature before the implementation runs, so
//! implementations only see argument kinds they declared.
//!
//! New functions can be added with [`FunctionRegistry::register`]:
//!
//! ```
//! use jsonquery::functions::{ArgType, FunctionRegistry, Signature};
//! use jsonquery::Value;
//!
//! let mut registry = FunctionRegistry::with_builtins();
//! registry.register("double", Signature::new(vec![ArgType::Number]), |args, _ctx| {
//!     let n = args[0].as_value().and_then(Value::as_float).unwrap_or_default();
//!     Ok(Value::Float(n * 2.0))
//! });
//! assert!(registry.contains("double"));
//! ```

use std::{cmp::Ordering, collections::HashMap, fmt};

use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};
use thiserror::Error;

use crate::{
    ast::Expr,
    evaluator::EvalError,
    output::to_json,
    value::{Map, Value},
};

/// Errors raised while resolving or validating a function call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FunctionError {
    /// No function with this name is registered
    #[error("unknown function: {0}()")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("{name}() takes {expected} but {actual} given; expected {signature}")]
    Arity {
        name: String,
        signature: String,
        expected: String,
        actual: usize,
    },

    /// An argument has the wrong kind
    #[error("{name}() argument {position} must be {expected}, got {actual}; expected {signature}")]
    ArgumentType {
        name: String,
        signature: String,
        position: usize,
        expected: String,
        actual: String,
    },

    /// Arguments have the right kinds but cannot be processed
    #[error("{name}(): {message}")]
    Invalid { name: String, message: String },
}

fn invalid(name: &str, message: impl Into<String>) -> FunctionError {
    FunctionError::Invalid {
        name: name.to_string(),
        message: message.into(),
    }
}

/// Argument kinds a signature can require.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgType {
    Any,
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
    /// An expression reference (`&expr`)
    Expression,
    /// An array whose every element matches the inner kind
    ArrayOf(Box<ArgType>),
    /// Any one of the listed kinds
    OneOf(Vec<ArgType>),
}

impl ArgType {
    fn accepts(&self, arg: &Arg<'_>) -> bool {
        match (self, arg) {
            (ArgType::Expression, Arg::Expression(_)) => true,
            (ArgType::OneOf(kinds), arg) => kinds.iter().any(|kind| kind.accepts(arg)),
            (kind, Arg::Value(value)) => kind.accepts_value(value),
            _ => false,
        }
    }

    fn accepts_value(&self, value: &Value) -> bool {
        match self {
            ArgType::Any => true,
            ArgType::Null => value.is_null(),
            ArgType::Boolean => matches!(value, Value::Boolean(_)),
            ArgType::Number => value.is_number(),
            ArgType::String => matches!(value, Value::String(_)),
            ArgType::Array => matches!(value, Value::Array(_)),
            ArgType::Object => matches!(value, Value::Object(_)),
            ArgType::Expression => false,
            ArgType::ArrayOf(inner) => match value {
                Value::Array(items) => items.iter().all(|item| inner.accepts_value(item)),
                _ => false,
            },
            ArgType::OneOf(kinds) => kinds.iter().any(|kind| kind.accepts_value(value)),
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::Any => f.write_str("any"),
            ArgType::Null => f.write_str("null"),
            ArgType::Boolean => f.write_str("boolean"),
            ArgType::Number => f.write_str("number"),
            ArgType::String => f.write_str("string"),
            ArgType::Array => f.write_str("array"),
            ArgType::Object => f.write_str("object"),
            ArgType::Expression => f.write_str("expression"),
            ArgType::ArrayOf(inner) => write!(f, "array[{}]", inner),
            ArgType::OneOf(kinds) => {
                for (i, kind) in kinds.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{}", kind)?;
                }
                Ok(())
            }
        }
    }
}

/// Function signature: positional argument kinds, optionally repeating the
/// last one.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<ArgType>,
    pub variadic: bool,
}

impl Signature {
    pub fn new(params: Vec<ArgType>) -> Self {
        Signature {
            params,
            variadic: false,
        }
    }

    /// The last parameter may repeat any number of times (at least once).
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Checks argument count and kinds for a call to `name`.
    pub fn validate(&self, name: &str, args: &[Arg<'_>]) -> Result<(), FunctionError> {
        let required = self.params.len();
        let count_ok = if self.variadic {
            args.len() >= required
        } else {
            args.len() == required
        };

        if !count_ok {
            let plural = if required == 1 { "argument" } else { "arguments" };
            let expected = if self.variadic {
                format!("at least {} {}", required, plural)
            } else {
                format!("{} {}", required, plural)
            };
            return Err(FunctionError::Arity {
                name: name.to_string(),
                signature: self.describe(name),
                expected,
                actual: args.len(),
            });
        }

        for (i, arg) in args.iter().enumerate() {
            let Some(kind) = self.params.get(i).or_else(|| self.params.last()) else {
                break;
            };
            if !kind.accepts(arg) {
                return Err(FunctionError::ArgumentType {
                    name: name.to_string(),
                    signature: self.describe(name),
                    position: i + 1,
                    expected: kind.to_string(),
                    actual: arg.kind_name().to_string(),
                });
            }
        }

        Ok(())
    }

    /// Renders the signature as `name(kind, kind...)`.
    pub fn describe(&self, name: &str) -> String {
        let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        let ellipsis = if self.variadic { "..." } else { "" };
        format!("{}({}{})", name, params.join(", "), ellipsis)
    }
}

/// A function argument: an evaluated value, or an unevaluated expression
/// reference.
#[derive(Debug, Clone)]
pub enum Arg<'a> {
    Value(Value),
    Expression(&'a Expr),
}

impl Arg<'_> {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Arg::Value(value) => Some(value),
            Arg::Expression(_) => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Arg::Value(value) => value.type_name(),
            Arg::Expression(_) => "expression",
        }
    }
}

/// Evaluates expression references on behalf of functions such as
/// `sort_by` and `map`.
pub trait ExpressionContext {
    fn eval_expression(&mut self, expr: &Expr, current: &Value) -> Result<Value, EvalError>;
}

/// Implementation of a registered function.
pub type FunctionImpl =
    Box<dyn Fn(&[Arg<'_>], &mut dyn ExpressionContext) -> Result<Value, EvalError> + Send + Sync>;

struct FunctionEntry {
    signature: Signature,
    func: FunctionImpl,
}

/// Name to (signature, implementation) table.
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionEntry>,
}

impl FunctionRegistry {
    /// A registry with no functions.
    pub fn new() -> Self {
        FunctionRegistry {
            functions: HashMap::new(),
        }
    }

    /// A registry holding every built-in function.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_builtins(&mut registry);
        registry
    }

    /// Adds or replaces a function.
    pub fn register<F>(&mut self, name: impl Into<String>, signature: Signature, func: F)
    where
        F: Fn(&[Arg<'_>], &mut dyn ExpressionContext) -> Result<Value, EvalError>
            + Send
            + Sync
            + 'static,
    {
        self.functions.insert(
            name.into(),
            FunctionEntry {
                signature,
                func: Box::new(func),
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn signature(&self, name: &str) -> Option<&Signature> {
        self.functions.get(name).map(|entry| &entry.signature)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Validates `args` against the signature of `name` and runs it.
    pub fn call(
        &self,
        name: &str,
        args: &[Arg<'_>],
        ctx: &mut dyn ExpressionContext,
    ) -> Result<Value, EvalError> {
        let entry = self
            .functions
            .get(name)
            .ok_or_else(|| FunctionError::UnknownFunction(name.to_string()))?;
        entry.signature.validate(name, args)?;
        (entry.func)(args, ctx)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

fn register_builtins(registry: &mut FunctionRegistry) {
    let numbers = || ArgType::ArrayOf(Box::new(ArgType::Number));
    let strings = || ArgType::ArrayOf(Box::new(ArgType::String));
    let sortable = || ArgType::OneOf(vec![numbers(), strings()]);

    registry.register("abs", Signature::new(vec![ArgType::Number]), abs);
    registry.register("avg", Signature::new(vec![numbers()]), avg);
    registry.register("ceil", Signature::new(vec![ArgType::Number]), ceil);
    registry.register(
        "contains",
        Signature::new(vec![
            ArgType::OneOf(vec![ArgType::Array, ArgType::String]),
            ArgType::Any,
        ]),
        contains,
    );
    registry.register(
        "ends_with",
        Signature::new(vec![ArgType::String, ArgType::String]),
        ends_with,
    );
    registry.register("flatten", Signature::new(vec![ArgType::Array]), flatten);
    registry.register("floor", Signature::new(vec![ArgType::Number]), floor);
    registry.register(
        "join",
        Signature::new(vec![ArgType::String, strings()]),
        join,
    );
    registry.register("keys", Signature::new(vec![ArgType::Object]), keys);
    registry.register(
        "length",
        Signature::new(vec![ArgType::OneOf(vec![
            ArgType::String,
            ArgType::Array,
            ArgType::Object,
        ])]),
        length,
    );
    registry.register(
        "map",
        Signature::new(vec![ArgType::Expression, ArgType::Array]),
        map,
    );
    registry.register("max", Signature::new(vec![sortable()]), max);
    registry.register(
        "max_by",
        Signature::new(vec![ArgType::Array, ArgType::Expression]),
        max_by,
    );
    registry.register(
        "merge",
        Signature::new(vec![ArgType::Object]).variadic(),
        merge,
    );
    registry.register("min", Signature::new(vec![sortable()]), min);
    registry.register(
        "min_by",
        Signature::new(vec![ArgType::Array, ArgType::Expression]),
        min_by,
    );
    registry.register(
        "not_null",
        Signature::new(vec![ArgType::Any]).variadic(),
        not_null,
    );
    registry.register(
        "reverse",
        Signature::new(vec![ArgType::OneOf(vec![ArgType::String, ArgType::Array])]),
        reverse,
    );
    registry.register("sort", Signature::new(vec![sortable()]), sort);
    registry.register(
        "sort_by",
        Signature::new(vec![ArgType::Array, ArgType::Expression]),
        sort_by,
    );
    registry.register(
        "starts_with",
        Signature::new(vec![ArgType::String, ArgType::String]),
        starts_with,
    );
    registry.register("sum", Signature::new(vec![numbers()]), sum);
    registry.register("to_array", Signature::new(vec![ArgType::Any]), to_array);
    registry.register("to_number", Signature::new(vec![ArgType::Any]), to_number);
    registry.register("to_string", Signature::new(vec![ArgType::Any]), to_string);
    registry.register("type", Signature::new(vec![ArgType::Any]), type_of);
    registry.register("values", Signature::new(vec![ArgType::Object]), values);
}

// ========================================
// Argument access
// ========================================

fn value_at<'v>(name: &str, args: &'v [Arg<'_>], index: usize) -> Result<&'v Value, FunctionError> {
    match args.get(index) {
        Some(Arg::Value(value)) => Ok(value),
        _ => Err(invalid(name, format!("argument {} must be a value", index + 1))),
    }
}

fn expression_at<'a>(name: &str, args: &[Arg<'a>], index: usize) -> Result<&'a Expr, FunctionError> {
    match args.get(index) {
        Some(Arg::Expression(expr)) => Ok(*expr),
        _ => Err(invalid(name, format!("argument {} must be an expression", index + 1))),
    }
}

fn array_at<'v>(name: &str, args: &'v [Arg<'_>], index: usize) -> Result<&'v [Value], FunctionError> {
    match value_at(name, args, index)? {
        Value::Array(items) => Ok(items),
        other => Err(invalid(
            name,
            format!("argument {} must be an array, got {}", index + 1, other.type_name()),
        )),
    }
}

fn str_at<'v>(name: &str, args: &'v [Arg<'_>], index: usize) -> Result<&'v str, FunctionError> {
    match value_at(name, args, index)? {
        Value::String(s) => Ok(s),
        other => Err(invalid(
            name,
            format!("argument {} must be a string, got {}", index + 1, other.type_name()),
        )),
    }
}

fn object_at<'v>(name: &str, args: &'v [Arg<'_>], index: usize) -> Result<&'v Map, FunctionError> {
    match value_at(name, args, index)? {
        Value::Object(obj) => Ok(obj),
        other => Err(invalid(
            name,
            format!("argument {} must be an object, got {}", index + 1, other.type_name()),
        )),
    }
}

// ========================================
// Numeric helpers
// ========================================

/// Integers stay integers; anything involving a float is summed in decimal
/// and returned as a float, falling back to `f64` outside decimal range.
fn numeric_sum(items: &[Value]) -> Value {
    let mut int_total: Option<i64> = Some(0);
    for item in items {
        int_total = match (int_total, item) {
            (Some(total), Value::Integer(n)) => total.checked_add(*n),
            _ => None,
        };
    }
    if let Some(total) = int_total {
        return Value::Integer(total);
    }

    match decimal_sum(items).and_then(|d| d.to_f64()) {
        Some(total) => Value::Float(total),
        None => Value::Float(items.iter().filter_map(Value::as_float).sum()),
    }
}

fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Integer(n) => Some(Decimal::from(*n)),
        Value::Float(f) => Decimal::from_f64(*f),
        _ => None,
    }
}

fn decimal_sum(items: &[Value]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |total, item| total.checked_add(to_decimal(item)?))
}

/// Rounded float to integer when it fits, float otherwise.
fn integral(n: f64) -> Value {
    if n.is_finite() && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Value::Integer(n as i64)
    } else {
        Value::Float(n)
    }
}

/// Ordering for sort keys; callers guarantee both are numbers or both
/// strings.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => match (a.as_float(), b.as_float()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

/// Evaluates `expr` against every item, requiring all keys to be numbers or
/// all to be strings.
fn sort_keys(
    name: &str,
    items: &[Value],
    expr: &Expr,
    ctx: &mut dyn ExpressionContext,
) -> Result<Vec<Value>, EvalError> {
    let mut keys = Vec::with_capacity(items.len());
    for item in items {
        keys.push(ctx.eval_expression(expr, item)?);
    }

    let all_numbers = keys.iter().all(Value::is_number);
    let all_strings = keys.iter().all(|k| matches!(k, Value::String(_)));
    if !all_numbers && !all_strings {
        let kinds: Vec<&str> = keys.iter().map(Value::type_name).collect();
        return Err(invalid(
            name,
            format!(
                "expression must evaluate to all numbers or all strings, got [{}]",
                kinds.join(", ")
            ),
        )
        .into());
    }
    Ok(keys)
}

/// Index of the extreme element according to `keys`.
fn extreme_by(keys: &[Value], wanted: Ordering) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, key) in keys.iter().enumerate() {
        best = match best {
            Some(b) if compare_values(key, &keys[b]) != wanted => Some(b),
            _ => Some(i),
        };
    }
    best
}

// ========================================
// Built-ins
// ========================================

fn abs(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    match value_at("abs", args, 0)? {
        Value::Integer(n) => Ok(n
            .checked_abs()
            .map(Value::Integer)
            .unwrap_or_else(|| Value::Float((*n as f64).abs()))),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(invalid("abs", format!("expected number, got {}", other.type_name())).into()),
    }
}

fn avg(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let items = array_at("avg", args, 0)?;
    if items.is_empty() {
        return Ok(Value::Null);
    }

    let count = items.len();
    let exact = decimal_sum(items)
        .and_then(|total| total.checked_div(Decimal::from(count as u64)))
        .and_then(|mean| mean.to_f64());
    let mean = match exact {
        Some(mean) => mean,
        None => items.iter().filter_map(Value::as_float).sum::<f64>() / count as f64,
    };
    Ok(Value::Float(mean))
}

fn ceil(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    match value_at("ceil", args, 0)? {
        Value::Integer(n) => Ok(Value::Integer(*n)),
        Value::Float(f) => Ok(integral(f.ceil())),
        other => Err(invalid("ceil", format!("expected number, got {}", other.type_name())).into()),
    }
}

fn floor(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    match value_at("floor", args, 0)? {
        Value::Integer(n) => Ok(Value::Integer(*n)),
        Value::Float(f) => Ok(integral(f.floor())),
        other => Err(invalid("floor", format!("expected number, got {}", other.type_name())).into()),
    }
}

fn contains(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let search = value_at("contains", args, 1)?;
    match value_at("contains", args, 0)? {
        Value::Array(items) => Ok(Value::Boolean(items.iter().any(|item| item.json_eq(search)))),
        Value::String(s) => Ok(Value::Boolean(match search {
            Value::String(needle) => s.contains(needle.as_str()),
            _ => false,
        })),
        other => Err(invalid(
            "contains",
            format!("expected array or string, got {}", other.type_name()),
        )
        .into()),
    }
}

fn ends_with(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let subject = str_at("ends_with", args, 0)?;
    let suffix = str_at("ends_with", args, 1)?;
    Ok(Value::Boolean(subject.ends_with(suffix)))
}

fn starts_with(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let subject = str_at("starts_with", args, 0)?;
    let prefix = str_at("starts_with", args, 1)?;
    Ok(Value::Boolean(subject.starts_with(prefix)))
}

fn flatten(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let items = array_at("flatten", args, 0)?;
    let mut result = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Array(inner) => result.extend(inner.iter().cloned()),
            other => result.push(other.clone()),
        }
    }
    Ok(Value::Array(result))
}

fn join(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let glue = str_at("join", args, 0)?;
    let items = array_at("join", args, 1)?;
    let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
    Ok(Value::String(parts.join(glue)))
}

fn keys(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let obj = object_at("keys", args, 0)?;
    Ok(Value::Array(
        obj.keys().map(|k| Value::String(k.clone())).collect(),
    ))
}

fn values(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let obj = object_at("values", args, 0)?;
    Ok(Value::Array(obj.values().cloned().collect()))
}

fn length(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let len = match value_at("length", args, 0)? {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(obj) => obj.len(),
        other => {
            return Err(invalid(
                "length",
                format!("expected string, array or object, got {}", other.type_name()),
            )
            .into());
        }
    };
    Ok(Value::Integer(len as i64))
}

fn map(args: &[Arg<'_>], ctx: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let expr = expression_at("map", args, 0)?;
    let items = array_at("map", args, 1)?;
    let mut result = Vec::with_capacity(items.len());
    for item in items {
        result.push(ctx.eval_expression(expr, item)?);
    }
    Ok(Value::Array(result))
}

fn max(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let items = array_at("max", args, 0)?;
    Ok(extreme_by(items, Ordering::Greater)
        .map(|i| items[i].clone())
        .unwrap_or(Value::Null))
}

fn min(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let items = array_at("min", args, 0)?;
    Ok(extreme_by(items, Ordering::Less)
        .map(|i| items[i].clone())
        .unwrap_or(Value::Null))
}

fn max_by(args: &[Arg<'_>], ctx: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let items = array_at("max_by", args, 0)?;
    let expr = expression_at("max_by", args, 1)?;
    let keys = sort_keys("max_by", items, expr, ctx)?;
    Ok(extreme_by(&keys, Ordering::Greater)
        .map(|i| items[i].clone())
        .unwrap_or(Value::Null))
}

fn min_by(args: &[Arg<'_>], ctx: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let items = array_at("min_by", args, 0)?;
    let expr = expression_at("min_by", args, 1)?;
    let keys = sort_keys("min_by", items, expr, ctx)?;
    Ok(extreme_by(&keys, Ordering::Less)
        .map(|i| items[i].clone())
        .unwrap_or(Value::Null))
}

fn merge(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let mut merged = Map::new();
    for index in 0..args.len() {
        for (k, v) in object_at("merge", args, index)? {
            merged.insert(k.clone(), v.clone());
        }
    }
    Ok(Value::Object(merged))
}

fn not_null(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    Ok(args
        .iter()
        .filter_map(Arg::as_value)
        .find(|v| !v.is_null())
        .cloned()
        .unwrap_or(Value::Null))
}

fn reverse(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    match value_at("reverse", args, 0)? {
        Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
        Value::Array(items) => Ok(Value::Array(items.iter().rev().cloned().collect())),
        other => Err(invalid(
            "reverse",
            format!("expected string or array, got {}", other.type_name()),
        )
        .into()),
    }
}

fn sort(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let mut items = array_at("sort", args, 0)?.to_vec();
    items.sort_by(compare_values);
    Ok(Value::Array(items))
}

fn sort_by(args: &[Arg<'_>], ctx: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let items = array_at("sort_by", args, 0)?;
    let expr = expression_at("sort_by", args, 1)?;
    let keys = sort_keys("sort_by", items, expr, ctx)?;

    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| compare_values(&keys[a], &keys[b]));
    Ok(Value::Array(order.into_iter().map(|i| items[i].clone()).collect()))
}

fn sum(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let items = array_at("sum", args, 0)?;
    Ok(numeric_sum(items))
}

fn to_array(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    match value_at("to_array", args, 0)? {
        Value::Array(items) => Ok(Value::Array(items.clone())),
        other => Ok(Value::Array(vec![other.clone()])),
    }
}

fn to_number(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    match value_at("to_number", args, 0)? {
        value @ (Value::Integer(_) | Value::Float(_)) => Ok(value.clone()),
        Value::String(s) => match Value::from_json(s) {
            Ok(number @ (Value::Integer(_) | Value::Float(_))) => Ok(number),
            _ => Ok(Value::Null),
        },
        _ => Ok(Value::Null),
    }
}

fn to_string(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    match value_at("to_string", args, 0)? {
        Value::String(s) => Ok(Value::String(s.clone())),
        other => Ok(Value::String(to_json(other))),
    }
}

fn type_of(args: &[Arg<'_>], _: &mut dyn ExpressionContext) -> Result<Value, EvalError> {
    let value = value_at("type", args, 0)?;
    Ok(Value::String(value.type_name().to_string()))
}
