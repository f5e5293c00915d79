//! Crate-level error type.

use crate::{
    codec::{DecodeError, EncodeError},
    evaluator::EvalError,
    functions::FunctionError,
    lexer::LexError,
    parser::ParseError,
};

/// Any failure surfaced by the public API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The query text could not be tokenized.
    #[error(transparent)]
    Lex(LexError),

    /// The query text is not a valid expression.
    #[error(transparent)]
    Parse(ParseError),

    /// Evaluation failed (undefined variable, zero slice step, ...).
    #[error("runtime error: {0}")]
    Runtime(EvalError),

    /// A function was called with the wrong arity or argument kinds.
    #[error(transparent)]
    Function(FunctionError),

    /// A document or parameter is not valid JSON.
    #[error("JSON syntax error: {0}")]
    JsonSyntax(#[from] serde_json::Error),

    /// A value has no MessagePack representation.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Bytes are not a supported MessagePack document.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl From<LexError> for Error {
    fn from(err: LexError) -> Self {
        Error::Lex(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Lex(lex) => Error::Lex(lex),
            other => Error::Parse(other),
        }
    }
}

impl From<EvalError> for Error {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::Function(func) => Error::Function(func),
            other => Error::Runtime(other),
        }
    }
}

impl From<FunctionError> for Error {
    fn from(err: FunctionError) -> Self {
        Error::Function(err)
    }
}

/// Convenience result type for query operations.
pub type Result<T> = std::result::Result<T, Error>;
