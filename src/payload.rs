//! Structured payload recovery from upstream text.
//!
//! Recipe/technique/troubleshoot responses are expected to be JSON objects,
//! but models sometimes wrap them in markdown fences or prose. Direct parse
//! first; on failure, extract the first top-level `{...}` span and parse
//! that. If both fail the caller gets a `PayloadParse` error and the cache
//! is never populated.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{CrumbError, Result};

/// First `{` through last `}` — greedy, same recovery the fallback needs
/// for fenced or prose-wrapped objects.
static JSON_SPAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[\s\S]*\}").unwrap());

/// Parse upstream text into a JSON object, with fallback span extraction.
pub fn parse_structured(text: &str) -> Result<Value> {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() {
            return Ok(value);
        }
    }

    if let Some(span) = JSON_SPAN_RE.find(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(span.as_str()) {
            if value.is_object() {
                return Ok(value);
            }
        }
    }

    Err(CrumbError::PayloadParse(
        "no JSON object found in upstream text".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_clean_json() {
        let value = parse_structured(r#"{"name": "Ciabatta", "difficulty": "Medium"}"#).unwrap();
        assert_eq!(value["name"], "Ciabatta");
    }

    #[test]
    fn test_parses_markdown_wrapped_json() {
        let text = "```json\n{\"name\": \"Focaccia\", \"difficulty\": \"Easy\"}\n```";
        let value = parse_structured(text).unwrap();
        assert_eq!(value["name"], "Focaccia");
    }

    #[test]
    fn test_parses_json_with_surrounding_prose() {
        let text = "Here is your recipe:\n{\"name\": \"Rye\"}\nEnjoy!";
        let value = parse_structured(text).unwrap();
        assert_eq!(value["name"], "Rye");
    }

    #[test]
    fn test_rejects_plain_prose() {
        let err = parse_structured("This is not JSON at all").unwrap_err();
        assert!(matches!(err, CrumbError::PayloadParse(_)));
    }

    #[test]
    fn test_rejects_non_object_json() {
        assert!(parse_structured("[1, 2, 3]").is_err());
        assert!(parse_structured("\"just a string\"").is_err());
    }

    #[test]
    fn test_nested_objects_survive_greedy_span() {
        let text = "x {\"a\": {\"b\": 1}, \"c\": [2, 3]} y";
        let value = parse_structured(text).unwrap();
        assert_eq!(value, json!({"a": {"b": 1}, "c": [2, 3]}));
    }
}
