//! Colorized pretty-printing of decoded token segments.
//!
//! JSON is rendered with syntax highlighting:
//! - Field names in cyan
//! - Strings in green
//! - Numbers in yellow
//! - Booleans in magenta
//! - Null in red
//!
//! Bytes that are not JSON fall back to plain text when they are printable
//! UTF-8, and to lowercase hex otherwise, so signatures never write raw
//! binary to the terminal.

use std::io::{self, Write};

use colored::{Color, Colorize};
use serde_json::Value;

const INDENT: &str = "  ";

/// Write a human-readable rendering of `bytes` followed by a newline.
///
/// When `use_color` is false the JSON output is identical to
/// `serde_json::to_string_pretty`.
pub fn write_pretty<W: Write>(out: &mut W, bytes: &[u8], use_color: bool) -> io::Result<()> {
    if let Ok(value) = serde_json::from_slice::<Value>(bytes) {
        let mut rendered = String::new();
        render_value(&mut rendered, &value, 0, use_color);
        return writeln!(out, "{rendered}");
    }

    match std::str::from_utf8(bytes) {
        Ok(text) if is_printable(text) => writeln!(out, "{}", text.trim_end_matches('\n')),
        _ => writeln!(out, "{}", to_hex(bytes)),
    }
}

fn is_printable(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| !c.is_control() || c == '\n' || c == '\t')
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn paint(text: &str, color: Color, use_color: bool) -> String {
    if use_color {
        text.color(color).to_string()
    } else {
        text.to_string()
    }
}

/// Quote a string the way serde_json does, escapes included.
fn quoted(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

fn render_value(out: &mut String, value: &Value, depth: usize, use_color: bool) {
    match value {
        Value::Null => out.push_str(&paint("null", Color::Red, use_color)),
        Value::Bool(b) => out.push_str(&paint(&b.to_string(), Color::Magenta, use_color)),
        Value::Number(n) => out.push_str(&paint(&n.to_string(), Color::Yellow, use_color)),
        Value::String(s) => out.push_str(&paint(&quoted(s), Color::Green, use_color)),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                push_indent(out, depth + 1);
                render_value(out, item, depth + 1, use_color);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, depth);
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            out.push_str("{\n");
            for (i, (key, item)) in map.iter().enumerate() {
                push_indent(out, depth + 1);
                out.push_str(&paint(&quoted(key), Color::Cyan, use_color));
                out.push_str(": ");
                render_value(out, item, depth + 1, use_color);
                if i + 1 < map.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, depth);
            out.push('}');
        }
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
