//! JSON output serialization for query results.
//!
//! This module provides JSON serialization with support for both compact and
//! pretty-printed output formats. Output follows standard JSON formatting
//! rules and is canonical for a given value.
//!
//! # Features
//!
//! - **Compact output** via [`to_json()`] - no inserted whitespace
//! - **Pretty output** via [`to_json_pretty()`] - human-readable with 2-space indentation
//! - **String escaping** - quotes, backslashes and control codes
//! - **Type preservation** - integers never carry a decimal point, floats
//!   use the shortest representation that round-trips (`2.5`, `1.0`, `1e20`)
//! - **Order preservation** - object keys are written in insertion order
//!
//! # Examples
//!
//! ```
//! use jsonquery::Value;
//! use jsonquery::output::{to_json, to_json_pretty};
//!
//! let value = Value::from_json(r#"{"b": 1, "a": [2.5, null]}"#).unwrap();
//!
//! assert_eq!(to_json(&value), r#"{"b":1,"a":[2.5,null]}"#);
//! assert_eq!(to_json_pretty(&Value::Integer(42)), "42");
//! ```

use crate::value::{Map, Value};

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        let mut out = String::new();
        self.print_value(value, 0, &mut out);
        out
    }

    fn print_value(&self, value: &Value, indent: usize, out: &mut String) {
        match value {
            Value::Null => out.push_str("null"),
            Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Integer(n) => out.push_str(&n.to_string()),
            Value::Float(n) => out.push_str(&format_float(*n)),
            Value::String(s) => self.print_string(s, out),
            Value::Array(arr) => self.print_array(arr, indent, out),
            Value::Object(obj) => self.print_object(obj, indent, out),
        }
    }

    fn print_array(&self, arr: &[Value], indent: usize, out: &mut String) {
        if arr.is_empty() {
            out.push_str("[]");
            return;
        }

        out.push('[');
        for (i, item) in arr.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            if self.pretty {
                out.push('\n');
                self.indent(indent + 1, out);
            }
            self.print_value(item, indent + 1, out);
        }
        if self.pretty {
            out.push('\n');
            self.indent(indent, out);
        }
        out.push(']');
    }

    fn print_object(&self, obj: &Map, indent: usize, out: &mut String) {
        if obj.is_empty() {
            out.push_str("{}");
            return;
        }

        out.push('{');
        for (i, (key, value)) in obj.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            if self.pretty {
                out.push('\n');
                self.indent(indent + 1, out);
            }
            self.print_string(key, out);
            out.push(':');
            if self.pretty {
                out.push(' ');
            }
            self.print_value(value, indent + 1, out);
        }
        if self.pretty {
            out.push('\n');
            self.indent(indent, out);
        }
        out.push('}');
    }

    fn indent(&self, level: usize, out: &mut String) {
        for _ in 0..level {
            out.push_str("  ");
        }
    }

    fn print_string(&self, s: &str, out: &mut String) {
        out.push('"');
        for c in s.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\u{08}' => out.push_str("\\b"),
                '\u{0c}' => out.push_str("\\f"),
                c if (c as u32) < 0x20 => {
                    out.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => out.push(c),
            }
        }
        out.push('"');
    }
}

/// Shortest round-trip rendering of a float; non-finite values have no JSON
/// form and render as `null`.
fn format_float(n: f64) -> String {
    match serde_json::Number::from_f64(n) {
        Some(num) => num.to_string(),
        None => "null".to_string(),
    }
}

// Convenience functions

/// Converts a Value to compact JSON string representation.
///
/// # Examples
///
/// ```
/// use jsonquery::Value;
/// use jsonquery::output::to_json;
///
/// let value = Value::from_json(r#"{ "name": "Alice", "age": 30 }"#).unwrap();
/// assert_eq!(to_json(&value), r#"{"name":"Alice","age":30}"#);
/// ```
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Converts a Value to pretty-printed JSON string representation.
///
/// # Examples
///
/// ```
/// use jsonquery::Value;
/// use jsonquery::output::to_json_pretty;
///
/// let value = Value::from_json(r#"{"name": "Alice", "tags": []}"#).unwrap();
/// assert_eq!(to_json_pretty(&value), "{\n  \"name\": \"Alice\",\n  \"tags\": []\n}");
/// ```
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}
