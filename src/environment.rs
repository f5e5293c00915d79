//! Variable scopes for `$name` references.
//!
//! The environment is a stack. The bottom is the session's parameter scope,
//! borrowed for the duration of an evaluation; `let` expressions push child
//! scopes on top and pop them when their body finishes.

use indexmap::IndexMap;

use crate::value::Value;

/// One layer of bindings, name (without the `$`) to value.
pub type Scope = IndexMap<String, Value>;

#[derive(Debug)]
pub struct Environment<'a> {
    params: Option<&'a Scope>,
    scopes: Vec<Scope>,
}

impl<'a> Environment<'a> {
    /// An environment with no parameters.
    pub fn new() -> Self {
        Environment {
            params: None,
            scopes: Vec::new(),
        }
    }

    /// An environment whose outermost scope is `params`.
    pub fn with_params(params: &'a Scope) -> Self {
        Environment {
            params: Some(params),
            scopes: Vec::new(),
        }
    }

    /// Opens a new innermost scope.
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Discards the innermost scope pushed with [`push_scope`](Self::push_scope).
    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Number of scopes pushed on top of the parameters.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Binds `name` in the innermost scope, replacing an earlier binding of
    /// the same name in that scope.
    ///
    /// Without a pushed scope there is nowhere to bind; the call opens one.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        if self.scopes.is_empty() {
            self.push_scope();
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), value);
        }
    }

    /// Looks `name` up from the innermost scope outwards, ending with the
    /// parameters.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .or_else(|| self.params.and_then(|params| params.get(name)))
    }
}

impl Default for Environment<'_> {
    fn default() -> Self {
        Self::new()
    }
}
