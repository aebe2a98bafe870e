use serde_json::{Map, Value};

/// Key substrings whose values are always redacted, case-insensitively.
const SENSITIVE_KEY_FRAGMENTS: &[&str] = &[
    "password",
    "token",
    "secret",
    "key",
    "authorization",
    "cookie",
];

pub const REDACTED: &str = "[REDACTED]";

fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    SENSITIVE_KEY_FRAGMENTS
        .iter()
        .any(|fragment| lower.contains(fragment))
}

/// Produce a redacted copy of a JSON value for the audit record.
///
/// The input is never mutated; the live request keeps its original body.
/// Redaction applies to any object key containing a sensitive fragment, at
/// any nesting depth. Long strings are truncated with a trailing ellipsis
/// so a single oversized field cannot bloat the log.
pub fn sanitize(value: &Value, max_string_len: usize) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, val) in map {
                if is_sensitive_key(key) {
                    out.insert(key.clone(), Value::String(REDACTED.to_string()));
                } else {
                    out.insert(key.clone(), sanitize(val, max_string_len));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| sanitize(v, max_string_len)).collect())
        }
        Value::String(s) if s.chars().count() > max_string_len => {
            let truncated: String = s.chars().take(max_string_len).collect();
            Value::String(format!("{truncated}…"))
        }
        other => other.clone(),
    }
}

/// Truncate an error message for storage.
pub fn truncate_error(message: &str, max_len: usize) -> String {
    if message.chars().count() <= max_len {
        message.to_string()
    } else {
        let truncated: String = message.chars().take(max_len).collect();
        format!("{truncated}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_sensitive_keys_at_any_depth() {
        let input = json!({
            "email": "jo@example.com",
            "password": "hunter2",
            "profile": {
                "apiKey": "abc123",
                "nested": { "refresh_token": "xyz" }
            },
            "items": [{ "secretAnswer": "blue" }]
        });

        let out = sanitize(&input, 2048);

        assert_eq!(out["email"], "jo@example.com");
        assert_eq!(out["password"], REDACTED);
        assert_eq!(out["profile"]["apiKey"], REDACTED);
        assert_eq!(out["profile"]["nested"]["refresh_token"], REDACTED);
        assert_eq!(out["items"][0]["secretAnswer"], REDACTED);
    }

    #[test]
    fn key_matching_is_case_insensitive() {
        let input = json!({ "Authorization": "Bearer abc", "COOKIE": "a=b" });
        let out = sanitize(&input, 2048);
        assert_eq!(out["Authorization"], REDACTED);
        assert_eq!(out["COOKIE"], REDACTED);
    }

    #[test]
    fn does_not_mutate_the_input() {
        let input = json!({ "password": "hunter2" });
        let _ = sanitize(&input, 2048);
        assert_eq!(input["password"], "hunter2");
    }

    #[test]
    fn truncates_long_strings() {
        let input = json!({ "note": "a".repeat(100) });
        let out = sanitize(&input, 10);
        assert_eq!(out["note"].as_str().unwrap(), format!("{}…", "a".repeat(10)));
    }

    #[test]
    fn leaves_numbers_and_booleans_alone() {
        let input = json!({ "count": 7, "active": true, "ratio": 0.5 });
        let out = sanitize(&input, 2048);
        assert_eq!(out, input);
    }

    #[test]
    fn truncate_error_keeps_short_messages() {
        assert_eq!(truncate_error("boom", 512), "boom");
        assert_eq!(truncate_error(&"x".repeat(600), 512).chars().count(), 513);
    }
}
