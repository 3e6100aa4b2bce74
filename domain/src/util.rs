//! Small shared helpers

/// Extract the JSON payload from an LLM reply.
///
/// Models frequently wrap JSON in fenced code blocks or surround it with
/// prose. This walks fenced blocks first (```json or bare ```), then falls
/// back to the outermost `{ … }` span, then to the raw trimmed text.
pub fn extract_json_payload(response: &str) -> &str {
    let trimmed = response.trim();

    // Fenced code block: take the first block's body
    if let Some(open) = trimmed.find("```") {
        let after_fence = &trimmed[open + 3..];
        // Skip an optional language tag on the fence line
        let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after_fence[body_start..];
        if let Some(close) = body.find("```") {
            let inner = body[..close].trim();
            if !inner.is_empty() {
                return inner;
            }
        }
    }

    // Outermost object span
    if let Some(start) = trimmed.find('{')
        && let Some(end) = trimmed.rfind('}')
        && end > start
    {
        return &trimmed[start..=end];
    }

    trimmed
}

/// Truncate a string to at most `max_bytes`, respecting char boundaries.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_json() {
        let payload = extract_json_payload(r#"{"is_valid": true}"#);
        assert_eq!(payload, r#"{"is_valid": true}"#);
    }

    #[test]
    fn test_extract_fenced_json() {
        let response = "Here you go:\n```json\n{\"is_valid\": false}\n```\nDone.";
        assert_eq!(extract_json_payload(response), r#"{"is_valid": false}"#);
    }

    #[test]
    fn test_extract_fenced_without_language_tag() {
        let response = "```\n{\"tasks\": []}\n```";
        assert_eq!(extract_json_payload(response), r#"{"tasks": []}"#);
    }

    #[test]
    fn test_extract_embedded_object() {
        let response = "The verdict is {\"is_valid\": true, \"reasoning\": \"ok\"} as requested.";
        assert_eq!(
            extract_json_payload(response),
            r#"{"is_valid": true, "reasoning": "ok"}"#
        );
    }

    #[test]
    fn test_extract_no_json_returns_trimmed() {
        assert_eq!(extract_json_payload("  not json  "), "not json");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let s = "héllo";
        // 'é' is two bytes; cutting at 2 would split it
        assert_eq!(truncate_str(s, 2), "h");
        assert_eq!(truncate_str(s, 100), "héllo");
    }
}
