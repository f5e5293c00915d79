//! Command implementations for the `jsonquery` binary.
//!
//! Every command writes its output to an injected sink, so the binary passes
//! stdout and tests pass a buffer.

mod codec;
mod eval;

pub use codec::{DecodeOptions, EncodeOptions, execute_decode, execute_encode};
pub use eval::{EvalOptions, execute_eval};

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Query, JSON or codec failure
    #[error(transparent)]
    Query(#[from] crate::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// `--hex` input that is not valid hexadecimal
    #[error("invalid hex input: {0}")]
    Hex(#[from] hex::FromHexError),

    /// `--param` without a `name=JSON` shape
    #[error("invalid parameter '{0}': expected name=JSON")]
    InvalidParam(String),

    /// No input provided
    #[error("No input provided. Use --input or pipe data to stdin.")]
    NoInput,
}
