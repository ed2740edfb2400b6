//! Pulls a single JSON object out of an LLM response (spec.md §4.4 step 3).
//!
//! Responses routinely wrap the object in ```` ```json ```` fences, prepend
//! a sentence of commentary, or include a `<thinking>...</thinking>` block
//! before the payload. This scans for the outermost balanced `{...}`,
//! tracking whether we're inside a string literal (and whether the next
//! character is escaped) so braces quoted in string values don't throw off
//! the balance count.

use crate::error::PipelineError;

const FENCE_MARKERS: &[&str] = &["```json", "```JSON", "```"];

/// Strip leading fences/commentary/thinking tags, find the outermost
/// balanced `{...}`, and parse it as JSON.
pub fn extract_json(text: &str) -> Result<serde_json::Value, PipelineError> {
    let stripped = strip_wrappers(text);
    let object = find_balanced_object(&stripped)
        .ok_or_else(|| PipelineError::ResponseNotJson(truncate(text)))?;
    serde_json::from_str(object).map_err(|e| PipelineError::ResponseNotJson(format!("{e}: {}", truncate(object))))
}

fn strip_wrappers(text: &str) -> String {
    let mut s = text;

    while let Some(start) = s.find("<thinking>") {
        if let Some(end) = s.find("</thinking>") {
            if end > start {
                let after = end + "</thinking>".len();
                s = &s[after..];
                continue;
            }
        }
        break;
    }

    for marker in FENCE_MARKERS {
        if let Some(pos) = s.find(marker) {
            let after_marker = pos + marker.len();
            let rest = &s[after_marker..];
            s = rest;
            break;
        }
    }

    s.to_string()
}

/// Scan for the first `{`, then walk forward tracking brace depth and
/// string/escape state until that brace closes; return the full slice.
fn find_balanced_object(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let start = s.find('{')?;

    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        let ch = byte as char;

        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + 1;
                    return Some(&s[start..end]);
                }
            }
            _ => {}
        }
    }

    None
}

fn truncate(text: &str) -> String {
    const LIMIT: usize = 200;
    if text.len() <= LIMIT {
        text.to_string()
    } else {
        let end = (0..=LIMIT).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &text[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bare_object() {
        let value = extract_json(r#"{"a": 1, "b": "two"}"#).unwrap();
        assert_eq!(value["a"], 1);
        assert_eq!(value["b"], "two");
    }

    #[test]
    fn strips_json_fence_and_leading_commentary() {
        let text = "Here is the result:\n```json\n{\"ok\": true}\n```\n";
        let value = extract_json(text).unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn strips_thinking_block_before_object() {
        let text = "<thinking>let me reason about this</thinking>{\"x\": 5}";
        let value = extract_json(text).unwrap();
        assert_eq!(value["x"], 5);
    }

    #[test]
    fn braces_inside_string_values_do_not_break_balance() {
        let text = r#"{"note": "use {curly} braces carefully", "n": 2}"#;
        let value = extract_json(text).unwrap();
        assert_eq!(value["n"], 2);
    }

    #[test]
    fn escaped_quote_inside_string_does_not_end_string_early() {
        let text = r#"{"note": "she said \"hi {there}\"", "n": 3}"#;
        let value = extract_json(text).unwrap();
        assert_eq!(value["n"], 3);
    }

    #[test]
    fn no_object_present_is_response_not_json() {
        let err = extract_json("no JSON here at all").unwrap_err();
        assert!(matches!(err, PipelineError::ResponseNotJson(_)));
    }

    #[test]
    fn unbalanced_braces_is_response_not_json() {
        let err = extract_json("{\"a\": 1").unwrap_err();
        assert!(matches!(err, PipelineError::ResponseNotJson(_)));
    }

    #[test]
    fn picks_outermost_object_when_nested() {
        let text = r#"{"outer": {"inner": 1}, "n": 4}"#;
        let value = extract_json(text).unwrap();
        assert_eq!(value["n"], 4);
        assert_eq!(value["outer"]["inner"], 1);
    }
}
