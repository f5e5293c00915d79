pub mod ast;
pub mod cli;
pub mod codec;
pub mod config;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod indexing;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod session;
pub mod stream;
pub mod value;

pub use ast::{Comparator, Expr, Token};
pub use codec::{DecodeError, EncodeError, decode, encode};
pub use config::QueryConfig;
pub use environment::Environment;
pub use error::{Error, Result};
pub use evaluator::{EvalError, Evaluator};
pub use functions::{FunctionError, FunctionRegistry};
pub use lexer::{LexError, Lexer};
pub use output::{to_json, to_json_pretty};
pub use parser::{ParseError, Parser};
pub use session::QuerySession;
pub use stream::JsonQuery;
pub use value::{Map, Value};

/// Evaluates `query` against `document` with the built-in functions and no
/// parameters.
///
/// # Examples
///
/// ```
/// use jsonquery::{Value, search};
///
/// let doc = Value::from_json(r#"{"a": [1, 2, 3]}"#).unwrap();
/// assert_eq!(search("a[-1]", &doc).unwrap(), Value::Integer(3));
/// ```
pub fn search(query: &str, document: &Value) -> Result<Value> {
    let expr = parser::compile(query)?;
    let functions = FunctionRegistry::with_builtins();
    let mut evaluator = Evaluator::new(document, &functions);
    Ok(evaluator.evaluate(&expr, document)?)
}
