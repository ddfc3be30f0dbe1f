use serde_json::Value;

/// Sanitizes sensitive fields in JSON payloads for logging
pub fn sanitize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sanitized = serde_json::Map::new();
            for (key, val) in map {
                let sanitized_val = if is_sensitive_field(key) {
                    mask_value(val)
                } else {
                    sanitize_json(val)
                };
                sanitized.insert(key.clone(), sanitized_val);
            }
            Value::Object(sanitized)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sanitize_json).collect()),
        _ => value.clone(),
    }
}

fn is_sensitive_field(key: &str) -> bool {
    matches!(
        key.to_lowercase().as_str(),
        "password"
            | "secret"
            | "token"
            | "api_key"
            | "authorization"
            | "student_id"
            | "phone"
    )
}

fn mask_value(value: &Value) -> Value {
    match value {
        Value::String(s) if s.len() > 8 => {
            let visible = &s[..4];
            let end = &s[s.len() - 4..];
            Value::String(format!("{}****{}", visible, end))
        }
        _ => Value::String("****".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_phone() {
        let input = json!({
            "phone": "+91-9876543210",
            "amount": "100.00"
        });

        let sanitized = sanitize_json(&input);
        let phone = sanitized["phone"].as_str().unwrap();

        assert!(phone.contains("****"));
        assert_eq!(sanitized["amount"], "100.00");
    }

    #[test]
    fn test_sanitize_nested() {
        let input = json!({
            "user": {
                "token": "secret_token_abc123",
                "name": "Priya"
            }
        });

        let sanitized = sanitize_json(&input);
        assert!(sanitized["user"]["token"].as_str().unwrap().contains("****"));
        assert_eq!(sanitized["user"]["name"], "Priya");
    }

    #[test]
    fn test_short_values_fully_masked() {
        let input = json!({ "password": "abc" });
        let sanitized = sanitize_json(&input);
        assert_eq!(sanitized["password"], "****");
    }
}
