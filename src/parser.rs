use crate::ir::Document;
use anyhow::{Context, Result};

/// Parses a graph document. Strict JSON is tried first; JSON5 (comments,
/// trailing commas, unquoted keys) is accepted as a fallback.
pub fn parse_document(input: &str) -> Result<Document> {
    if let Ok(document) = serde_json::from_str::<Document>(input) {
        return Ok(document);
    }
    json5::from_str::<Document>(input).context("invalid graph document")
}
