//! Robust JSON extraction for LLM responses that may wrap the requested
//! object in prose instead of returning it bare.

use serde::de::DeserializeOwned;

/// Attempt a direct JSON parse; on failure, extract the first balanced
/// `{...}` substring and retry. Returns `None` if both attempts fail.
pub fn parse_lenient<T: DeserializeOwned>(text: &str) -> Option<T> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<T>(trimmed) {
        return Some(value);
    }
    let candidate = extract_balanced_braces(trimmed)?;
    serde_json::from_str::<T>(&candidate).ok()
}

/// Scan for the first `{` and return the substring through its matching
/// `}`, tolerant of nested braces and of braces inside quoted strings.
pub fn extract_balanced_braces(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &byte) in bytes.iter().enumerate().skip(start) {
        let c = byte as char;
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..=i].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        a: bool,
        b: String,
    }

    #[test]
    fn direct_parse_succeeds() {
        let sample: Sample = parse_lenient(r#"{"a": true, "b": "x"}"#).unwrap();
        assert_eq!(sample, Sample { a: true, b: "x".to_string() });
    }

    #[test]
    fn extracts_object_wrapped_in_prose() {
        let text = r#"Sure, here you go: {"a": true, "b": "y"} hope that helps"#;
        let sample: Sample = parse_lenient(text).unwrap();
        assert_eq!(sample, Sample { a: true, b: "y".to_string() });
    }

    #[test]
    fn tolerates_nested_braces() {
        let text = r#"note {"a": false, "b": "{nested}"} trailing"#;
        let sample: Sample = parse_lenient(text).unwrap();
        assert_eq!(sample, Sample { a: false, b: "{nested}".to_string() });
    }

    #[test]
    fn returns_none_for_garbage() {
        let result: Option<Sample> = parse_lenient("not json at all");
        assert!(result.is_none());
    }
}
