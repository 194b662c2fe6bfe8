//! Tolerant JSON extraction from model output.
//!
//! Models are instructed to return bare JSON but routinely wrap it in prose
//! or markdown fences anyway. Extraction tries a direct parse first, then
//! falls back to the substring between the first opening bracket and the
//! last matching closer.

use serde_json::Value;

/// Extracts the first JSON object or array from `text`.
/// Returns `None` when no parseable JSON is present.
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    let obj = slice_between(trimmed, '{', '}');
    let arr = slice_between(trimmed, '[', ']');

    // Prefer whichever opener appears first in the text.
    let candidates = match (obj, arr) {
        (Some(o), Some(a)) => {
            if o.0 < a.0 {
                vec![o.1, a.1]
            } else {
                vec![a.1, o.1]
            }
        }
        (Some(o), None) => vec![o.1],
        (None, Some(a)) => vec![a.1],
        (None, None) => return None,
    };

    candidates
        .into_iter()
        .find_map(|s| serde_json::from_str::<Value>(s).ok())
}

/// Returns the byte offset of the first `open` and the substring through the
/// last `close` after it, if both exist.
fn slice_between(text: &str, open: char, close: char) -> Option<(usize, &str)> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }
    Some((start, &text[start..=end]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_json_object_parses_directly() {
        let value = extract_json(r#"{"score": 82}"#).unwrap();
        assert_eq!(value["score"], json!(82));
    }

    #[test]
    fn test_bare_json_array_parses_directly() {
        let value = extract_json(r#"[{"question": "q1"}]"#).unwrap();
        assert_eq!(value[0]["question"], json!("q1"));
    }

    #[test]
    fn test_markdown_fenced_json_recovers_same_value() {
        let fenced = "Sure! ```json\n{\"score\": 82, \"reason\": \"fit\"}\n```";
        let bare = r#"{"score": 82, "reason": "fit"}"#;
        assert_eq!(extract_json(fenced), extract_json(bare));
    }

    #[test]
    fn test_prose_wrapped_object_recovers() {
        let text = "Here is my analysis:\n{\"recommendation\": \"hire\"}\nLet me know!";
        let value = extract_json(text).unwrap();
        assert_eq!(value["recommendation"], json!("hire"));
    }

    #[test]
    fn test_prose_wrapped_array_recovers() {
        let text = "The questions are: [\"a\", \"b\"] — good luck";
        let value = extract_json(text).unwrap();
        assert_eq!(value, json!(["a", "b"]));
    }

    #[test]
    fn test_earliest_opener_wins_when_both_present() {
        let text = "[1, 2] trailing {\"x\": 1}";
        assert_eq!(extract_json(text).unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_nested_objects_survive_substring_recovery() {
        let text = "note: {\"contact\": {\"email\": \"a@b.c\"}, \"skills\": []} done";
        let value = extract_json(text).unwrap();
        assert_eq!(value["contact"]["email"], json!("a@b.c"));
    }

    #[test]
    fn test_plain_prose_yields_none() {
        assert!(extract_json("I could not produce an answer.").is_none());
    }

    #[test]
    fn test_unbalanced_json_yields_none() {
        assert!(extract_json(r#"{"score": 82"#).is_none());
    }

    #[test]
    fn test_empty_input_yields_none() {
        assert!(extract_json("").is_none());
        assert!(extract_json("   \n").is_none());
    }
}
