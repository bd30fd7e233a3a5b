use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

const EXPIRY_MARGIN_SECS: i64 = 30;

pub fn check_expired(expires_at: DateTime<Utc>) -> bool {
    let now_with_margin = Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS);
    now_with_margin > expires_at
}

/// Cut `text` down to at most `max_len` characters, never splitting a char.
pub fn truncate_field(text: &str, max_len: usize) -> &str {
    match text.char_indices().nth(max_len) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Truncate every string leaf of a JSON payload in place.
pub fn truncate_json_strings(value: &mut Value, max_len: usize) {
    match value {
        Value::String(s) => {
            let cut = truncate_field(s, max_len).len();
            s.truncate(cut);
        }
        Value::Array(items) => items
            .iter_mut()
            .for_each(|item| truncate_json_strings(item, max_len)),
        Value::Object(map) => map
            .values_mut()
            .for_each(|item| truncate_json_strings(item, max_len)),
        _ => {}
    }
}

pub fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("• {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truncate_field_counts_chars() {
        assert_eq!(truncate_field("abcdef", 3), "abc");
        assert_eq!(truncate_field("abc", 3), "abc");
        assert_eq!(truncate_field("", 3), "");
        // multi-byte chars are never split
        assert_eq!(truncate_field("⚡⚡⚡⚡", 2), "⚡⚡");
    }

    #[test]
    fn test_truncate_json_strings_walks_nested_values() {
        let long = "x".repeat(2500);
        let mut payload = json!({
            "text": long,
            "blocks": [{"fields": [{"text": "y".repeat(2001)}]}],
            "count": 3
        });

        truncate_json_strings(&mut payload, 2000);

        assert_eq!(payload["text"].as_str().unwrap().len(), 2000);
        assert_eq!(
            payload["blocks"][0]["fields"][0]["text"]
                .as_str()
                .unwrap()
                .len(),
            2000
        );
        assert_eq!(payload["count"], 3);
    }

    #[test]
    fn test_check_expired_uses_margin() {
        assert!(check_expired(Utc::now() + Duration::seconds(10)));
        assert!(!check_expired(Utc::now() + Duration::minutes(10)));
    }

    #[test]
    fn test_bullet_list() {
        let items = vec!["one".to_string(), "two".to_string()];
        assert_eq!(bullet_list(&items), "• one\n• two");
        assert_eq!(bullet_list(&[]), "");
    }
}
