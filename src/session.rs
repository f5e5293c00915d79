//! Interactive query sessions.
//!
//! A [`QuerySession`] owns one document, a set of named parameters and the
//! function registry. Queries are compiled and evaluated on each call; the
//! document and parameters stay unchanged between calls.

use tracing::{debug, trace};

use crate::{
    ast::Expr,
    config::QueryConfig,
    environment::Scope,
    error::Result,
    evaluator::Evaluator,
    functions::FunctionRegistry,
    output::to_json,
    parser::compile_with_max_depth,
    value::Value,
};

/// A document plus the parameters queries against it may reference.
///
/// # Examples
///
/// ```
/// use jsonquery::QuerySession;
///
/// let mut session = QuerySession::new(r#"{"results": [{"name": "a"}, {"name": "b"}]}"#).unwrap();
/// session.add_params("host", r#""localhost""#).unwrap();
/// assert_eq!(
///     session.eval("results[*].[name, $host]").unwrap(),
///     r#"[["a","localhost"],["b","localhost"]]"#
/// );
/// ```
#[derive(Debug)]
pub struct QuerySession {
    document: Value,
    params: Scope,
    functions: FunctionRegistry,
    config: QueryConfig,
}

impl QuerySession {
    /// Parses `json` as the session document.
    pub fn new(json: &str) -> Result<Self> {
        Self::with_config(json, QueryConfig::default())
    }

    pub fn with_config(json: &str, config: QueryConfig) -> Result<Self> {
        let document = Value::from_json(json)?;
        Ok(QuerySession {
            document,
            params: Scope::new(),
            functions: FunctionRegistry::with_builtins(),
            config,
        })
    }

    /// Binds `$name` to the value parsed from `json`, replacing an earlier
    /// binding.
    ///
    /// The text must be JSON: a string needs its quotes.
    pub fn add_params(&mut self, name: &str, json: &str) -> Result<()> {
        let value = Value::from_json(json)?;
        trace!(name, "bound parameter");
        self.params.insert(name.to_string(), value);
        Ok(())
    }

    /// Evaluates `query` and renders the result as compact JSON.
    pub fn eval(&self, query: &str) -> Result<String> {
        let result = self.eval_value(query)?;
        Ok(to_json(&result))
    }

    /// Evaluates `query` and returns the result value.
    pub fn eval_value(&self, query: &str) -> Result<Value> {
        let expr = self.compile(query)?;
        if self.config.debug {
            debug!(query, ast = ?expr, "compiled query");
        }

        let result = self.eval_expr(&expr)?;
        if self.config.debug {
            debug!(query, result = %result, "evaluated query");
        }
        Ok(result)
    }

    /// Compiles `query` using the session's nesting bound.
    pub fn compile(&self, query: &str) -> Result<Expr> {
        Ok(compile_with_max_depth(query, self.config.max_nesting_depth)?)
    }

    /// Evaluates an already compiled expression against the document.
    pub fn eval_expr(&self, expr: &Expr) -> Result<Value> {
        let mut evaluator = Evaluator::with_params(&self.document, &self.functions, &self.params);
        Ok(evaluator.evaluate(expr, &self.document)?)
    }

    /// Replaces the document, keeping parameters.
    pub fn set_document(&mut self, json: &str) -> Result<()> {
        self.document = Value::from_json(json)?;
        Ok(())
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }

    pub fn debug(&self) -> bool {
        self.config.debug
    }

    pub fn params(&self) -> &Scope {
        &self.params
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Registry access for adding custom functions.
    pub fn registry_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }
}
