//! Literal rendering for generated artifacts.
//!
//! Scalars are written as JSON string literals. For the character set the
//! generator accepts, JSON and Rust agree on every escape, so the same text is
//! a valid Rust literal and can be decoded back with `serde_json`.
//!
//! Tools and schemas are JSON documents embedded in raw string literals and
//! decoded when the artifact runs. The compiler never expands them, so their
//! size is unbounded and any text JSON can escape is accepted.

use crate::domain::{GenerationError, Schema, ToolBinding};

/// Longest hash fence a Rust raw string literal accepts.
pub const MAX_FENCE: usize = 255;

/// Characters whose JSON escape (`\b`, `\f`, `\u00XX`) is not valid in Rust.
fn is_unrenderable(c: char) -> bool {
    (c as u32) < 0x20 && !matches!(c, '\n' | '\r' | '\t')
}

pub fn check_renderable(field: &str, value: &str) -> Result<(), GenerationError> {
    if value.chars().any(is_unrenderable) {
        return Err(GenerationError::ControlCharacter {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Render a string as a double-quoted literal.
pub fn string_literal(value: &str) -> String {
    // Serializing a str cannot fail.
    serde_json::to_string(value).unwrap_or_else(|_| String::from("\"\""))
}

/// Number of hashes needed so `"` + hashes never occurs inside `text`.
pub fn fence_len(text: &str) -> usize {
    let mut longest = 0usize;
    let mut run: Option<usize> = None;

    for c in text.chars() {
        match (c, run) {
            ('"', _) => run = Some(0),
            ('#', Some(n)) => {
                run = Some(n + 1);
                longest = longest.max(n + 1);
            }
            _ => run = None,
        }
    }

    longest + 1
}

fn fenced(text: &str) -> Result<String, GenerationError> {
    let hashes = fence_len(text);
    if hashes > MAX_FENCE {
        return Err(GenerationError::FenceTooLong { hashes });
    }
    let fence = "#".repeat(hashes);
    Ok(format!("r{fence}\"{text}\"{fence}"))
}

/// Render a raw multi-line literal whose fence the content cannot close.
pub fn raw_literal(text: &str) -> Result<String, GenerationError> {
    if text.contains('\r') {
        return Err(GenerationError::CarriageReturnInPrompt);
    }
    fenced(text)
}

/// JSON text of the tools array, one binding per line.
pub fn tools_json(tools: &[ToolBinding], indent: &str) -> String {
    if tools.is_empty() {
        return "[]".to_string();
    }

    let mut lines = Vec::with_capacity(tools.len());
    for tool in tools {
        lines.push(format!(
            "{indent}    {{\"id\": {}, \"displayName\": {}, \"category\": {}}}",
            string_literal(&tool.id),
            string_literal(&tool.display_name),
            string_literal(&tool.category),
        ));
    }

    format!("[\n{}\n{indent}]", lines.join(",\n"))
}

/// JSON text of a schema object, one field per line, in insertion order.
pub fn schema_json(schema: &Schema, indent: &str) -> String {
    if schema.is_empty() {
        return "{}".to_string();
    }

    let mut lines = Vec::with_capacity(schema.len());
    for (name, field) in schema.iter() {
        lines.push(format!(
            "{indent}    {}: {{\"type\": {}, \"required\": {}, \"description\": {}}}",
            string_literal(name),
            string_literal(field.field_type.as_str()),
            field.required,
            string_literal(&field.description),
        ));
    }

    format!("{{\n{}\n{indent}}}", lines.join(",\n"))
}

/// Embed a JSON document as a raw literal.
pub fn json_literal(json: &str) -> Result<String, GenerationError> {
    fenced(json)
}
