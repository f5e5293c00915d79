//! Execute queries against JSON input

use std::io::Write;

use super::CliError;
use crate::{QuerySession, config::QueryConfig, output::to_json_pretty};

/// Options for the eval command
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// The query to execute
    pub query: String,
    /// JSON input string
    pub input: Option<String>,
    /// `name=JSON` parameter bindings
    pub params: Vec<String>,
    /// Pretty-print the output
    pub pretty: bool,
    pub config: QueryConfig,
}

/// Runs one query and writes the result followed by a newline.
pub fn execute_eval(options: &EvalOptions, out: &mut dyn Write) -> Result<(), CliError> {
    let input = options.input.as_deref().ok_or(CliError::NoInput)?;
    let mut session = QuerySession::with_config(input, options.config.clone())?;

    for param in &options.params {
        let (name, json) = param
            .split_once('=')
            .filter(|(name, _)| !name.is_empty())
            .ok_or_else(|| CliError::InvalidParam(param.clone()))?;
        session.add_params(name.trim_start_matches('$'), json)?;
    }

    let rendered = if options.pretty {
        to_json_pretty(&session.eval_value(&options.query)?)
    } else {
        session.eval(&options.query)?
    };
    writeln!(out, "{}", rendered)?;
    Ok(())
}
