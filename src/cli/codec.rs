//! MessagePack conversion commands

use std::io::Write;

use super::CliError;
use crate::{
    codec::{decode_with_max_depth, encode_json},
    config::QueryConfig,
    output::to_json,
};

/// Options for the encode command
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// JSON input string
    pub input: Option<String>,
    /// Write raw bytes instead of hex text
    pub raw: bool,
}

/// Options for the decode command
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// MessagePack input
    pub input: Option<Vec<u8>>,
    /// Input is hex text rather than raw bytes
    pub hex: bool,
    /// Supplies the nesting limit
    pub config: QueryConfig,
}

/// Encodes JSON input as MessagePack.
pub fn execute_encode(options: &EncodeOptions, out: &mut dyn Write) -> Result<(), CliError> {
    let input = options.input.as_deref().ok_or(CliError::NoInput)?;
    let bytes = encode_json(input)?;
    if options.raw {
        out.write_all(&bytes)?;
    } else {
        writeln!(out, "{}", hex::encode(bytes))?;
    }
    Ok(())
}

/// Decodes MessagePack input and writes compact JSON.
pub fn execute_decode(options: &DecodeOptions, out: &mut dyn Write) -> Result<(), CliError> {
    let input = options.input.as_deref().ok_or(CliError::NoInput)?;
    let bytes = if options.hex {
        let text = String::from_utf8_lossy(input);
        hex::decode(text.trim())?
    } else {
        input.to_vec()
    };
    let value = decode_with_max_depth(&bytes, options.config.max_decode_depth)
        .map_err(crate::Error::from)?;
    writeln!(out, "{}", to_json(&value))?;
    Ok(())
}
