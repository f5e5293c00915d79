use std::cmp::Ordering;

use thiserror::Error;
use tracing::trace;

use crate::{
    ast::{Comparator, Expr},
    environment::{Environment, Scope},
    functions::{Arg, ExpressionContext, FunctionError, FunctionRegistry},
    indexing::{normalize_index, slice},
    value::{Map, Value},
};

/// Errors that can occur during query evaluation.
///
/// Type mismatches inside an expression are not errors: they evaluate to
/// `null` (or `false` for comparisons that cannot hold).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// `$name` is bound neither by a `let` nor by a session parameter
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    /// A slice with a literal step of 0
    #[error("slice step cannot be 0")]
    ZeroSliceStep,

    /// `&expr` used somewhere other than a function argument
    #[error("expression reference is only valid as a function argument")]
    UnexpectedExpressionRef,

    /// Unknown function or bad arguments
    #[error(transparent)]
    Function(#[from] FunctionError),
}

/// The query evaluator.
///
/// Walks an [`Expr`] against a current value. The document the evaluation
/// started from stays reachable as `$`, and `$name` variables resolve through
/// the [`Environment`].
///
/// # Examples
///
/// ```
/// use jsonquery::{Evaluator, FunctionRegistry, Value, parser::compile};
///
/// let doc = Value::from_json(r#"{"a": {"b": [1, 2, 3]}}"#).unwrap();
/// let functions = FunctionRegistry::with_builtins();
/// let expr = compile("length(a.b)").unwrap();
///
/// let mut evaluator = Evaluator::new(&doc, &functions);
/// assert_eq!(evaluator.evaluate(&expr, &doc).unwrap(), Value::Integer(3));
/// ```
pub struct Evaluator<'a> {
    root: &'a Value,
    functions: &'a FunctionRegistry,
    env: Environment<'a>,
}

impl<'a> Evaluator<'a> {
    pub fn new(root: &'a Value, functions: &'a FunctionRegistry) -> Self {
        Evaluator {
            root,
            functions,
            env: Environment::new(),
        }
    }

    /// An evaluator whose outermost variable scope is `params`.
    pub fn with_params(root: &'a Value, functions: &'a FunctionRegistry, params: &'a Scope) -> Self {
        Evaluator {
            root,
            functions,
            env: Environment::with_params(params),
        }
    }

    pub fn env(&self) -> &Environment<'a> {
        &self.env
    }

    /// Evaluates `expr` with `current` as the value `@` refers to.
    pub fn evaluate(&mut self, expr: &Expr, current: &Value) -> Result<Value, EvalError> {
        match expr {
            Expr::Identifier(name) => Ok(match current {
                Value::Object(obj) => obj.get(name).cloned().unwrap_or(Value::Null),
                _ => Value::Null,
            }),
            Expr::CurrentNode => Ok(current.clone()),
            Expr::Root => Ok(self.root.clone()),
            Expr::VariableRef(name) => self
                .env
                .lookup(name)
                .cloned()
                .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),

            Expr::Literal(value) => Ok(value.clone()),
            Expr::RawString(s) => Ok(Value::String(s.clone())),

            Expr::Index(index) => Ok(match current {
                Value::Array(items) => normalize_index(*index, items.len())
                    .map(|i| items[i].clone())
                    .unwrap_or(Value::Null),
                _ => Value::Null,
            }),
            Expr::Slice { start, stop, step } => {
                if *step == Some(0) {
                    return Err(EvalError::ZeroSliceStep);
                }
                match current {
                    Value::Array(items) => slice(items, *start, *stop, *step)
                        .map(Value::Array)
                        .ok_or(EvalError::ZeroSliceStep),
                    _ => Ok(Value::Null),
                }
            }

            Expr::Subexpression { lhs, rhs } => {
                let left = self.evaluate(lhs, current)?;
                if left.is_null() {
                    return Ok(Value::Null);
                }
                self.evaluate(rhs, &left)
            }

            Expr::WildcardArray { lhs, rhs } => match self.evaluate(lhs, current)? {
                Value::Array(items) => self.project(items.iter(), rhs),
                _ => Ok(Value::Null),
            },
            Expr::WildcardObject { lhs, rhs } => match self.evaluate(lhs, current)? {
                Value::Object(obj) => self.project(obj.values(), rhs),
                _ => Ok(Value::Null),
            },
            Expr::Flatten { lhs, rhs } => match self.evaluate(lhs, current)? {
                Value::Array(items) => {
                    let mut flattened = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            Value::Array(inner) => flattened.extend(inner),
                            other => flattened.push(other),
                        }
                    }
                    self.project(flattened.iter(), rhs)
                }
                _ => Ok(Value::Null),
            },
            Expr::Filter { lhs, predicate, rhs } => match self.evaluate(lhs, current)? {
                Value::Array(items) => {
                    let mut kept = Vec::new();
                    for item in &items {
                        if self.evaluate(predicate, item)?.is_truthy() {
                            kept.push(item);
                        }
                    }
                    self.project(kept.into_iter(), rhs)
                }
                _ => Ok(Value::Null),
            },

            Expr::Pipe { lhs, rhs } => {
                let left = self.evaluate(lhs, current)?;
                self.evaluate(rhs, &left)
            }
            Expr::Or { lhs, rhs } => {
                let left = self.evaluate(lhs, current)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.evaluate(rhs, current)
                }
            }
            Expr::And { lhs, rhs } => {
                let left = self.evaluate(lhs, current)?;
                if left.is_truthy() {
                    self.evaluate(rhs, current)
                } else {
                    Ok(left)
                }
            }
            Expr::Not(operand) => {
                let value = self.evaluate(operand, current)?;
                Ok(Value::Boolean(!value.is_truthy()))
            }
            Expr::Comparison { op, lhs, rhs } => {
                let left = self.evaluate(lhs, current)?;
                let right = self.evaluate(rhs, current)?;
                Ok(compare(*op, &left, &right))
            }

            Expr::MultiSelectList(elements) => {
                if current.is_null() {
                    return Ok(Value::Null);
                }
                let mut result = Vec::with_capacity(elements.len());
                for element in elements {
                    result.push(self.evaluate(element, current)?);
                }
                Ok(Value::Array(result))
            }
            Expr::MultiSelectHash(pairs) => {
                if current.is_null() {
                    return Ok(Value::Null);
                }
                let mut result = Map::with_capacity(pairs.len());
                for (key, value) in pairs {
                    let value = self.evaluate(value, current)?;
                    result.insert(key.clone(), value);
                }
                Ok(Value::Object(result))
            }

            Expr::FunctionCall { name, args } => self.call_function(name, args, current),
            Expr::ExpressionRef(_) => Err(EvalError::UnexpectedExpressionRef),

            Expr::LetExpression { bindings, body } => {
                self.env.push_scope();
                trace!(depth = self.env.depth(), "entered let scope");
                let result = self.eval_let(bindings, body, current);
                self.env.pop_scope();
                result
            }
        }
    }

    /// Applies `rhs` to each item, dropping null results.
    fn project<'v>(
        &mut self,
        items: impl Iterator<Item = &'v Value>,
        rhs: &Expr,
    ) -> Result<Value, EvalError> {
        let mut result = Vec::new();
        for item in items {
            let value = self.evaluate(rhs, item)?;
            if !value.is_null() {
                result.push(value);
            }
        }
        Ok(Value::Array(result))
    }

    fn eval_let(
        &mut self,
        bindings: &[(String, Expr)],
        body: &Expr,
        current: &Value,
    ) -> Result<Value, EvalError> {
        for (name, expr) in bindings {
            let value = self.evaluate(expr, current)?;
            self.env.bind(name.clone(), value);
        }
        self.evaluate(body, current)
    }

    fn call_function(&mut self, name: &str, args: &[Expr], current: &Value) -> Result<Value, EvalError> {
        let mut evaluated = Vec::with_capacity(args.len());
        for arg in args {
            evaluated.push(match arg {
                Expr::ExpressionRef(inner) => Arg::Expression(inner.as_ref()),
                other => Arg::Value(self.evaluate(other, current)?),
            });
        }

        let functions = self.functions;
        functions.call(name, &evaluated, self)
    }
}

impl ExpressionContext for Evaluator<'_> {
    fn eval_expression(&mut self, expr: &Expr, current: &Value) -> Result<Value, EvalError> {
        self.evaluate(expr, current)
    }
}

/// Applies a comparator. Ordering is defined only between two numbers or
/// two strings; any other pairing yields null.
fn compare(op: Comparator, left: &Value, right: &Value) -> Value {
    if !op.is_ordering() {
        let equal = left.json_eq(right);
        return Value::Boolean(if op == Comparator::Equal { equal } else { !equal });
    }
    match ordering(left, right) {
        Some(ord) => Value::Boolean(match op {
            Comparator::LessThan => ord == Ordering::Less,
            Comparator::LessEqual => ord != Ordering::Greater,
            Comparator::GreaterThan => ord == Ordering::Greater,
            _ => ord != Ordering::Less,
        }),
        None => Value::Null,
    }
}

fn ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => left.as_float()?.partial_cmp(&right.as_float()?),
    }
}
