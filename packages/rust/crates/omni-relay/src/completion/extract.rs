//! Plain-text extraction from Responses API bodies.
//!
//! Two shapes are known:
//! - consolidated: `{"output_text": "..."}`
//! - output items: `{"output": [{"content": [{"type": "output_text", "text": "..."}]}]}`
//!
//! Missing or mistyped fields read as absent; nothing here fails.

use serde_json::Value;

const TEXT_BLOCK_TYPE: &str = "output_text";

/// Which shape a response body carries text in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseShape<'a> {
    /// Non-blank top-level `output_text`.
    Consolidated(&'a str),
    /// Text fragments of `output_text` blocks, in document order.
    OutputItems(Vec<&'a str>),
    /// Neither shape carries text.
    Empty,
}

impl<'a> ResponseShape<'a> {
    pub fn classify(body: &'a Value) -> Self {
        if let Some(text) = consolidated_text(body) {
            return Self::Consolidated(text);
        }
        let fragments = output_item_fragments(body);
        if fragments.is_empty() {
            Self::Empty
        } else {
            Self::OutputItems(fragments)
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Consolidated(text) => text.trim().to_string(),
            Self::OutputItems(fragments) => fragments.join("\n").trim().to_string(),
            Self::Empty => String::new(),
        }
    }
}

/// Extract the answer text; empty string means the model returned no text.
pub fn extract_text(body: &Value) -> String {
    ResponseShape::classify(body).into_text()
}

/// Whitespace-only `output_text` counts as absent rather than as an empty answer, so the output
/// items still get a chance to supply text.
fn consolidated_text(body: &Value) -> Option<&str> {
    body.get("output_text")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
}

fn output_item_fragments(body: &Value) -> Vec<&str> {
    let Some(items) = body.get("output").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|block| block.get("type").and_then(Value::as_str) == Some(TEXT_BLOCK_TYPE))
        .map(|block| block.get("text").and_then(Value::as_str).unwrap_or_default())
        .collect()
}
