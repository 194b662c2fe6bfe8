// Shared prompt fragments. Each task module owns its full prompt template;
// this file holds only the cross-cutting pieces.

/// Closing instruction appended to every task prompt. Models ignore it often
/// enough that extraction stays tolerant anyway.
pub const JSON_ONLY_NOTE: &str = "Return ONLY the JSON, no additional text or explanation.";

/// Renders an optional labeled context block, truncated to `budget` chars.
/// Empty when the field is absent — prompts stay compact.
pub fn context_block(label: &str, text: Option<&str>, budget: usize) -> String {
    match text {
        Some(t) if !t.trim().is_empty() => {
            format!(
                "\n{label}:\n{}\n",
                crate::ai::schema::truncate_chars(t, budget)
            )
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_block_truncates_to_budget() {
        let long = "x".repeat(600);
        let block = context_block("Resume", Some(&long), 500);
        assert!(block.contains(&"x".repeat(500)));
        assert!(!block.contains(&"x".repeat(501)));
    }

    #[test]
    fn test_context_block_empty_for_missing_or_blank() {
        assert_eq!(context_block("Resume", None, 500), "");
        assert_eq!(context_block("Resume", Some("   "), 500), "");
    }
}
