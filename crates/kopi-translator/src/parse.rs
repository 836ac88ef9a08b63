//! Extracts the translation from backend output that should contain a
//! `{"translation": "..."}` object but may be wrapped in tool banners and
//! log lines.

const KEY: &str = "\"translation\"";

/// Never fails: when no well-formed object is found the trimmed raw output
/// is returned as-is (idempotent under re-parsing).
pub fn extract_translation(raw: &str) -> String {
    if let Some(text) = find_json_translation(raw) {
        return text;
    }
    raw.trim().to_string()
}

/// Finds the first `{`-rooted object whose flat region (before any nested
/// brace) contains a `"translation": "` key, then balanced-brace scans to
/// the matching close and decodes that slice strictly.
///
/// Values are assumed flat; a literal brace inside the translation itself
/// may mis-terminate the scan. Accepted limitation.
fn find_json_translation(raw: &str) -> Option<String> {
    let start = candidate_start(raw)?;

    let mut depth = 0usize;
    for (offset, ch) in raw[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    let candidate = &raw[start..start + offset + ch.len_utf8()];
                    let value: serde_json::Value = serde_json::from_str(candidate).ok()?;
                    return value.get("translation")?.as_str().map(str::to_string);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte index of the opening brace of the first object containing the key,
/// not the first brace overall.
fn candidate_start(raw: &str) -> Option<usize> {
    for (open, _) in raw.match_indices('{') {
        let flat_end = raw[open + 1..]
            .find(['{', '}'])
            .map(|j| open + 1 + j)
            .unwrap_or(raw.len());
        let flat = &raw[open + 1..flat_end];

        if let Some(k) = flat.find(KEY) {
            let after = flat[k + KEY.len()..].trim_start();
            if let Some(rest) = after.strip_prefix(':')
                && rest.trim_start().starts_with('"')
            {
                return Some(open);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_object() {
        assert_eq!(
            extract_translation(r#"{"translation": "Bonjour"}"#),
            "Bonjour"
        );
    }

    #[test]
    fn surrounding_noise_is_ignored() {
        let raw = "tool v1.2 starting...\n{\"translation\": \"Bonjour\"}\ndone in 1.3s";
        assert_eq!(extract_translation(raw), "Bonjour");
    }

    #[test]
    fn first_object_with_the_key_wins() {
        assert_eq!(
            extract_translation(r#"{"a":1} {"translation":"Hola"}"#),
            "Hola"
        );
    }

    #[test]
    fn fallback_returns_trimmed_input() {
        assert_eq!(extract_translation("  plain output, no json \n"), "plain output, no json");
    }

    #[test]
    fn fallback_is_idempotent() {
        let once = extract_translation("no json here at all");
        assert_eq!(extract_translation(&once), once);
    }

    #[test]
    fn escaped_quotes_in_the_value_survive() {
        let raw = r#"{"translation": "she said \"hi\""}"#;
        assert_eq!(extract_translation(raw), "she said \"hi\"");
    }

    #[test]
    fn malformed_candidate_falls_back_to_raw() {
        let raw = r#"{"translation": "unterminated"#;
        assert_eq!(extract_translation(raw), raw.trim());
    }

    #[test]
    fn key_with_spaced_colon_is_accepted() {
        assert_eq!(
            extract_translation("log: {\"translation\"  :  \"Ciao\"}"),
            "Ciao"
        );
    }

    #[test]
    fn object_missing_quote_after_colon_is_not_a_candidate() {
        // The key must open a string value, as the prompt requests.
        let raw = r#"{"translation": 42} {"translation": "two"}"#;
        assert_eq!(extract_translation(raw), "two");
    }
}
