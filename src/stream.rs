//! Predicate-and-transform filtering over a stream of keyed messages.

use tracing::trace;

use crate::{
    ast::Expr,
    error::Result,
    evaluator::Evaluator,
    functions::FunctionRegistry,
    output::to_json,
    parser::compile,
    value::Value,
};

/// Filters JSON messages with an optional predicate and collects transform
/// results.
///
/// Each accepted message yields one `(key, json)` output per transform whose
/// result is not null. Without transforms the message itself is recorded.
///
/// # Examples
///
/// ```
/// use jsonquery::JsonQuery;
///
/// let mut query = JsonQuery::new();
/// query.setup_predicate("level == 'error'").unwrap();
/// query.setup_transforms(&["message"]).unwrap();
///
/// assert!(query.process("k1", r#"{"level": "error", "message": "disk full"}"#, false).unwrap());
/// assert!(!query.process("k2", r#"{"level": "info", "message": "ok"}"#, false).unwrap());
/// assert_eq!(query.outputs_json(), r#"[["k1","disk full"]]"#);
/// ```
#[derive(Debug, Default)]
pub struct JsonQuery {
    predicate: Option<Expr>,
    transforms: Vec<Expr>,
    outputs: Vec<(String, String)>,
    functions: FunctionRegistry,
}

impl JsonQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles and installs the predicate.
    pub fn setup_predicate(&mut self, query: &str) -> Result<()> {
        self.predicate = Some(compile(query)?);
        Ok(())
    }

    /// Compiles and installs the transforms. On error the previous transforms
    /// stay in place.
    pub fn setup_transforms<S: AsRef<str>>(&mut self, queries: &[S]) -> Result<()> {
        let transforms = queries
            .iter()
            .map(|q| compile(q.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.transforms = transforms;
        Ok(())
    }

    /// Whether `message` satisfies the predicate. Always true without one.
    pub fn matches(&self, message: &str) -> Result<bool> {
        let value = Value::from_json(message)?;
        self.matches_value(&value)
    }

    fn matches_value(&self, message: &Value) -> Result<bool> {
        match &self.predicate {
            Some(predicate) => Ok(self.evaluate(predicate, message)?.is_truthy()),
            None => Ok(true),
        }
    }

    /// Runs the transforms over `message` when it matches, recording outputs
    /// under `key`. Returns whether the message was accepted.
    pub fn process(&mut self, key: &str, message: &str, skip_predicate: bool) -> Result<bool> {
        let value = Value::from_json(message)?;
        if !skip_predicate && !self.matches_value(&value)? {
            trace!(key, "message rejected by predicate");
            return Ok(false);
        }

        if self.transforms.is_empty() {
            self.outputs.push((key.to_string(), to_json(&value)));
            return Ok(true);
        }

        let mut produced = Vec::with_capacity(self.transforms.len());
        for transform in &self.transforms {
            let result = self.evaluate(transform, &value)?;
            if !result.is_null() {
                produced.push((key.to_string(), to_json(&result)));
            }
        }
        trace!(key, outputs = produced.len(), "message accepted");
        self.outputs.extend(produced);
        Ok(true)
    }

    pub fn outputs(&self) -> &[(String, String)] {
        &self.outputs
    }

    /// Collected outputs as a JSON array of `[key, value]` pairs.
    pub fn outputs_json(&self) -> String {
        let pairs: Vec<String> = self
            .outputs
            .iter()
            .map(|(key, json)| format!("[{},{}]", to_json(&Value::String(key.clone())), json))
            .collect();
        format!("[{}]", pairs.join(","))
    }

    /// Removes and returns the collected outputs.
    pub fn take_outputs(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.outputs)
    }

    /// Registry access for adding custom functions.
    pub fn registry_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }

    fn evaluate(&self, expr: &Expr, message: &Value) -> Result<Value> {
        let mut evaluator = Evaluator::new(message, &self.functions);
        Ok(evaluator.evaluate(expr, message)?)
    }
}
