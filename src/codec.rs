//! MessagePack codec
//!
//! Converts [`Value`]s to and from MessagePack. Integers use the smallest
//! format that holds them, floats are always written as float64, and object
//! keys keep their order. Types without a JSON counterpart (bin, ext) and
//! non-finite floats are rejected on decode.

use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;
use tracing::debug;

use crate::{
    error::Result,
    output::to_json,
    value::{Map, Value},
};

/// Default bound on array/map nesting while decoding.
pub const DEFAULT_MAX_DECODE_DEPTH: usize = 512;

/// A value that cannot be written as MessagePack.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    /// NaN and the infinities have no JSON form
    #[error("cannot encode non-finite float {0}")]
    NonFiniteFloat(f64),

    /// String, array or map longer than a 32-bit length prefix allows
    #[error("{kind} of length {len} exceeds the MessagePack size limit")]
    TooLarge { kind: &'static str, len: usize },
}

/// Bytes that are not a supported MessagePack document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended inside a value
    #[error("unexpected end of input at offset {offset}: {needed} more bytes needed")]
    Truncated { offset: usize, needed: usize },

    /// The never-used marker 0xc1
    #[error("reserved byte 0xc1 at offset {0}")]
    Reserved(usize),

    /// bin and ext families
    #[error("unsupported {kind} type 0x{byte:02x} at offset {offset}")]
    Unsupported {
        byte: u8,
        offset: usize,
        kind: &'static str,
    },

    /// Map keys must be strings to form a JSON object
    #[error("map key at offset {0} is not a string")]
    NonStringKey(usize),

    #[error("invalid UTF-8 in string at offset {0}")]
    InvalidUtf8(usize),

    /// Bytes left over after the first complete value
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    #[error("nesting depth exceeds limit of {0}")]
    DepthExceeded(usize),

    /// NaN or an infinity, which JSON cannot represent
    #[error("non-finite float at offset {offset}")]
    NonFiniteFloat { offset: usize },
}

#[cold]
#[inline(never)]
fn truncated_error(offset: usize, needed: usize) -> DecodeError {
    DecodeError::Truncated { offset, needed }
}

#[cold]
#[inline(never)]
fn unsupported_error(byte: u8, offset: usize) -> DecodeError {
    let kind = match byte {
        0xc4..=0xc6 => "bin",
        _ => "ext",
    };
    DecodeError::Unsupported { byte, offset, kind }
}

#[cold]
#[inline(never)]
fn too_large_error(kind: &'static str, len: usize) -> EncodeError {
    EncodeError::TooLarge { kind, len }
}

// ========================================
// Encoding
// ========================================

/// Encodes a value as MessagePack.
///
/// # Examples
///
/// ```
/// use jsonquery::{Value, codec::encode};
///
/// assert_eq!(encode(&Value::Integer(1)).unwrap(), vec![0x01]);
/// assert_eq!(encode(&Value::Null).unwrap(), vec![0xc0]);
/// ```
pub fn encode(value: &Value) -> std::result::Result<Vec<u8>, EncodeError> {
    let mut buf = BytesMut::new();
    encode_value(value, &mut buf)?;
    debug!(bytes = buf.len(), "encoded msgpack");
    Ok(buf.to_vec())
}

/// Appends the encoding of `value` to `buf`.
pub fn encode_value(value: &Value, buf: &mut BytesMut) -> std::result::Result<(), EncodeError> {
    match value {
        Value::Null => buf.put_u8(0xc0),
        Value::Boolean(false) => buf.put_u8(0xc2),
        Value::Boolean(true) => buf.put_u8(0xc3),
        Value::Integer(n) => encode_int(*n, buf),
        Value::Float(f) => {
            if !f.is_finite() {
                return Err(EncodeError::NonFiniteFloat(*f));
            }
            buf.put_u8(0xcb);
            buf.put_f64(*f);
        }
        Value::String(s) => {
            let len = s.len();
            match len {
                0..=31 => buf.put_u8(0xa0 | len as u8),
                32..=0xff => {
                    buf.put_u8(0xd9);
                    buf.put_u8(len as u8);
                }
                0x100..=0xffff => {
                    buf.put_u8(0xda);
                    buf.put_u16(len as u16);
                }
                _ => {
                    let len = u32::try_from(len).map_err(|_| too_large_error("string", len))?;
                    buf.put_u8(0xdb);
                    buf.put_u32(len);
                }
            }
            buf.put_slice(s.as_bytes());
        }
        Value::Array(items) => {
            encode_len(items.len(), [0x90, 0xdc, 0xdd], "array", buf)?;
            for item in items {
                encode_value(item, buf)?;
            }
        }
        Value::Object(obj) => {
            encode_len(obj.len(), [0x80, 0xde, 0xdf], "map", buf)?;
            for (k, v) in obj {
                encode_value(&Value::String(k.clone()), buf)?;
                encode_value(v, buf)?;
            }
        }
    }
    Ok(())
}

fn encode_int(n: i64, buf: &mut BytesMut) {
    if n >= 0 {
        match n {
            0..=0x7f => buf.put_u8(n as u8),
            0x80..=0xff => {
                buf.put_u8(0xcc);
                buf.put_u8(n as u8);
            }
            0x100..=0xffff => {
                buf.put_u8(0xcd);
                buf.put_u16(n as u16);
            }
            0x1_0000..=0xffff_ffff => {
                buf.put_u8(0xce);
                buf.put_u32(n as u32);
            }
            _ => {
                buf.put_u8(0xcf);
                buf.put_u64(n as u64);
            }
        }
    } else if n >= -32 {
        buf.put_i8(n as i8);
    } else if n >= i64::from(i8::MIN) {
        buf.put_u8(0xd0);
        buf.put_i8(n as i8);
    } else if n >= i64::from(i16::MIN) {
        buf.put_u8(0xd1);
        buf.put_i16(n as i16);
    } else if n >= i64::from(i32::MIN) {
        buf.put_u8(0xd2);
        buf.put_i32(n as i32);
    } else {
        buf.put_u8(0xd3);
        buf.put_i64(n);
    }
}

/// Writes a fix/16/32 container header. `markers` are the fix base, the
/// 16-bit marker and the 32-bit marker.
fn encode_len(
    len: usize,
    markers: [u8; 3],
    kind: &'static str,
    buf: &mut BytesMut,
) -> std::result::Result<(), EncodeError> {
    match len {
        0..=15 => buf.put_u8(markers[0] | len as u8),
        16..=0xffff => {
            buf.put_u8(markers[1]);
            buf.put_u16(len as u16);
        }
        _ => {
            let len = u32::try_from(len).map_err(|_| too_large_error(kind, len))?;
            buf.put_u8(markers[2]);
            buf.put_u32(len);
        }
    }
    Ok(())
}

// ========================================
// Decoding
// ========================================

/// Decodes one MessagePack value occupying all of `bytes`.
///
/// # Examples
///
/// ```
/// use jsonquery::{Value, codec::decode};
///
/// assert_eq!(decode(&[0x92, 0x01, 0xc3]).unwrap(),
///            Value::Array(vec![Value::Integer(1), Value::Boolean(true)]));
/// assert!(decode(&[0xc1]).is_err());
/// ```
pub fn decode(bytes: &[u8]) -> std::result::Result<Value, DecodeError> {
    decode_with_max_depth(bytes, DEFAULT_MAX_DECODE_DEPTH)
}

/// Like [`decode`], with an explicit nesting bound.
pub fn decode_with_max_depth(bytes: &[u8], max_depth: usize) -> std::result::Result<Value, DecodeError> {
    let mut decoder = Decoder {
        input_len: bytes.len(),
        buf: bytes,
        max_depth,
    };
    let value = decoder.read_value(0)?;
    if decoder.buf.has_remaining() {
        return Err(DecodeError::TrailingBytes(decoder.buf.remaining()));
    }
    debug!(bytes = bytes.len(), "decoded msgpack");
    Ok(value)
}

fn finite(f: f64, offset: usize) -> std::result::Result<Value, DecodeError> {
    if f.is_finite() {
        Ok(Value::Float(f))
    } else {
        Err(DecodeError::NonFiniteFloat { offset })
    }
}

struct Decoder<'a> {
    input_len: usize,
    buf: &'a [u8],
    max_depth: usize,
}

impl Decoder<'_> {
    fn offset(&self) -> usize {
        self.input_len - self.buf.remaining()
    }

    fn need(&self, n: usize) -> std::result::Result<(), DecodeError> {
        if self.buf.remaining() < n {
            return Err(truncated_error(self.offset(), n - self.buf.remaining()));
        }
        Ok(())
    }

    fn u8(&mut self) -> std::result::Result<u8, DecodeError> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    fn u16(&mut self) -> std::result::Result<u16, DecodeError> {
        self.need(2)?;
        Ok(self.buf.get_u16())
    }

    fn u32(&mut self) -> std::result::Result<u32, DecodeError> {
        self.need(4)?;
        Ok(self.buf.get_u32())
    }

    fn u64(&mut self) -> std::result::Result<u64, DecodeError> {
        self.need(8)?;
        Ok(self.buf.get_u64())
    }

    fn read_value(&mut self, depth: usize) -> std::result::Result<Value, DecodeError> {
        let offset = self.offset();
        let marker = self.u8()?;

        let value = match marker {
            0x00..=0x7f => Value::Integer(i64::from(marker)),
            0xe0..=0xff => Value::Integer(i64::from(marker as i8)),
            0x80..=0x8f => self.read_map(usize::from(marker & 0x0f), depth)?,
            0x90..=0x9f => self.read_array(usize::from(marker & 0x0f), depth)?,
            0xa0..=0xbf => self.read_str(usize::from(marker & 0x1f))?,

            0xc0 => Value::Null,
            0xc1 => return Err(DecodeError::Reserved(offset)),
            0xc2 => Value::Boolean(false),
            0xc3 => Value::Boolean(true),
            0xc4..=0xc9 | 0xd4..=0xd8 => return Err(unsupported_error(marker, offset)),

            0xca => {
                self.need(4)?;
                finite(f64::from(self.buf.get_f32()), offset)?
            }
            0xcb => {
                self.need(8)?;
                finite(self.buf.get_f64(), offset)?
            }

            0xcc => Value::Integer(i64::from(self.u8()?)),
            0xcd => Value::Integer(i64::from(self.u16()?)),
            0xce => Value::Integer(i64::from(self.u32()?)),
            0xcf => {
                let n = self.u64()?;
                i64::try_from(n)
                    .map(Value::Integer)
                    .unwrap_or(Value::Float(n as f64))
            }
            0xd0 => Value::Integer(i64::from(self.u8()? as i8)),
            0xd1 => Value::Integer(i64::from(self.u16()? as i16)),
            0xd2 => Value::Integer(i64::from(self.u32()? as i32)),
            0xd3 => Value::Integer(self.u64()? as i64),

            0xd9 => {
                let len = usize::from(self.u8()?);
                self.read_str(len)?
            }
            0xda => {
                let len = usize::from(self.u16()?);
                self.read_str(len)?
            }
            0xdb => {
                let len = self.u32()? as usize;
                self.read_str(len)?
            }
            0xdc => {
                let len = usize::from(self.u16()?);
                self.read_array(len, depth)?
            }
            0xdd => {
                let len = self.u32()? as usize;
                self.read_array(len, depth)?
            }
            0xde => {
                let len = usize::from(self.u16()?);
                self.read_map(len, depth)?
            }
            0xdf => {
                let len = self.u32()? as usize;
                self.read_map(len, depth)?
            }
        };

        Ok(value)
    }

    fn read_str(&mut self, len: usize) -> std::result::Result<Value, DecodeError> {
        let offset = self.offset();
        self.need(len)?;
        let text = std::str::from_utf8(&self.buf[..len])
            .map_err(|_| DecodeError::InvalidUtf8(offset))?
            .to_string();
        self.buf.advance(len);
        Ok(Value::String(text))
    }

    fn enter(&self, depth: usize) -> std::result::Result<usize, DecodeError> {
        let depth = depth + 1;
        if depth > self.max_depth {
            return Err(DecodeError::DepthExceeded(self.max_depth));
        }
        Ok(depth)
    }

    fn read_array(&mut self, len: usize, depth: usize) -> std::result::Result<Value, DecodeError> {
        let depth = self.enter(depth)?;
        // every element takes at least one byte
        let mut items = Vec::with_capacity(len.min(self.buf.remaining()));
        for _ in 0..len {
            items.push(self.read_value(depth)?);
        }
        Ok(Value::Array(items))
    }

    fn read_map(&mut self, len: usize, depth: usize) -> std::result::Result<Value, DecodeError> {
        let depth = self.enter(depth)?;
        let mut obj = Map::with_capacity(len.min(self.buf.remaining() / 2));
        for _ in 0..len {
            let key_offset = self.offset();
            let key = match self.read_value(depth)? {
                Value::String(k) => k,
                _ => return Err(DecodeError::NonStringKey(key_offset)),
            };
            let value = self.read_value(depth)?;
            obj.insert(key, value);
        }
        Ok(Value::Object(obj))
    }
}

// ========================================
// JSON text wrappers
// ========================================

/// Parses JSON text and encodes it as MessagePack.
pub fn encode_json(json: &str) -> Result<Vec<u8>> {
    let value = Value::from_json(json)?;
    Ok(encode(&value)?)
}

/// Decodes MessagePack and renders it as compact JSON text.
pub fn decode_to_json(bytes: &[u8]) -> Result<String> {
    let value = decode(bytes)?;
    Ok(to_json(&value))
}
