//! Recovering schema-shaped values from model completions
//!
//! The ladder: strip code fences and parse, then parse the first balanced
//! `{...}` span, then fall back to a value built from known inputs. Callers
//! always receive a value of the schema type.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// A JSON shape the model is asked to produce
pub trait ResponseSchema: Serialize + DeserializeOwned {
    /// Checks beyond field presence and types
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SchemaViolation {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema check failed: {0}")]
    Check(String),
}

/// Outcome of [`parse_structured`]. Both arms carry the same type.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Structured(T),
    Fallback(T),
}

impl<T> Parsed<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Parsed::Fallback(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Parsed::Structured(v) | Parsed::Fallback(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Parsed::Structured(v) | Parsed::Fallback(v) => v,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<U> {
        match self {
            Parsed::Structured(v) => Parsed::Structured(f(v)),
            Parsed::Fallback(v) => Parsed::Fallback(f(v)),
        }
    }
}

/// The schema checker shared by parsed and fallback values
pub fn conform<T: ResponseSchema>(json: &str) -> Result<T, SchemaViolation> {
    let value: T = serde_json::from_str(json)?;
    value.check().map_err(SchemaViolation::Check)?;
    Ok(value)
}

/// Remove a surrounding markdown code fence, with or without a language tag
pub fn strip_code_fences(text: &str) -> &str {
    let s = text.trim();
    let s = match s.strip_prefix("```") {
        Some(rest) => rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest),
        None => s,
    };
    let s = s.trim();
    s.strip_suffix("```").unwrap_or(s).trim()
}

/// First `{...}` span whose braces balance, ignoring braces inside strings
pub fn first_balanced_object(text: &str) -> Option<&str> {
    text.match_indices('{')
        .find_map(|(start, _)| balanced_end(&text[start..]).map(|end| &text[start..start + end]))
}

/// Byte length of the balanced object at the start of `text`
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse `completion` as `T`, falling back to `fallback()` when every step fails
pub fn parse_structured<T: ResponseSchema>(
    completion: &str,
    fallback: impl FnOnce() -> T,
) -> Parsed<T> {
    let stripped = strip_code_fences(completion);
    let first_error = match conform::<T>(stripped) {
        Ok(value) => return Parsed::Structured(value),
        Err(e) => e,
    };

    if let Some(span) = first_balanced_object(stripped) {
        match conform::<T>(span) {
            Ok(value) => {
                tracing::debug!("recovered structured value from embedded JSON");
                return Parsed::Structured(value);
            }
            Err(e) => tracing::debug!(error = %e, "embedded JSON did not conform"),
        }
    }

    tracing::warn!(error = %first_error, "completion did not match schema, using fallback");
    Parsed::Fallback(fallback())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: usize,
    }

    impl ResponseSchema for Sample {
        fn check(&self) -> Result<(), String> {
            if self.name.is_empty() {
                return Err("name is empty".to_string());
            }
            Ok(())
        }
    }

    fn fallback() -> Sample {
        Sample {
            name: "fallback".to_string(),
            count: 3,
        }
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_fenced_and_bare_parse_identically() {
        let bare = r#"{"name": "Ava", "count": 2}"#;
        let fenced = format!("```json\n{bare}\n```");
        assert_eq!(
            parse_structured(bare, fallback),
            parse_structured(&fenced, fallback)
        );
        assert!(!parse_structured(&fenced, fallback).is_fallback());
    }

    #[test]
    fn test_embedded_object_recovered() {
        let text = r#"Here you go: {"name": "Ava {the} great", "count": 2} hope it helps"#;
        let parsed = parse_structured(text, fallback);
        assert_eq!(parsed.value().name, "Ava {the} great");
        assert!(!parsed.is_fallback());
    }

    #[test]
    fn test_prose_falls_back() {
        let parsed = parse_structured("I could not produce a report today.", fallback);
        assert!(parsed.is_fallback());
        assert_eq!(parsed.into_inner().count, 3);
    }

    #[test]
    fn test_failed_check_falls_back() {
        let parsed = parse_structured(r#"{"name": "", "count": 1}"#, fallback);
        assert!(parsed.is_fallback());
    }

    #[test]
    fn test_balanced_scanner_handles_escapes() {
        let text = r#"x {"a": "quote \" and brace }", "b": {"c": 1}} y"#;
        assert_eq!(
            first_balanced_object(text),
            Some(r#"{"a": "quote \" and brace }", "b": {"c": 1}}"#)
        );
        assert_eq!(first_balanced_object("{ never closed"), None);
    }

    #[test]
    fn test_fallback_conforms_to_schema() {
        let json = serde_json::to_string(&fallback()).unwrap();
        assert!(conform::<Sample>(&json).is_ok());
    }
}
