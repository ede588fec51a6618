use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body the backend sends with a non-success status.
///
/// `detail` is usually a string. Request validation failures carry a list of
/// `{ "msg": ..., "loc": ..., "type": ... }` objects instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ApiErrorBody {
    /// Human readable detail, if the body carries a usable one.
    pub fn detail_message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            Value::Array(items) => {
                let messages = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .filter(|msg| !msg.trim().is_empty())
                    .collect::<Vec<_>>();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: Value) -> ApiErrorBody {
        serde_json::from_value(value).expect("error body")
    }

    #[test]
    fn string_detail_is_used_verbatim() {
        let body = parse(json!({ "detail": "invalid url" }));
        assert_eq!(body.detail_message().as_deref(), Some("invalid url"));
    }

    #[test]
    fn validation_detail_joins_messages() {
        let body = parse(json!({
            "detail": [
                { "loc": ["body", "url"], "msg": "invalid or missing URL scheme", "type": "url_parsing" },
                { "loc": ["body"], "msg": "field required", "type": "missing" }
            ]
        }));
        assert_eq!(
            body.detail_message().as_deref(),
            Some("invalid or missing URL scheme; field required")
        );
    }

    #[test]
    fn missing_or_unusable_detail_yields_none() {
        assert!(parse(json!({})).detail_message().is_none());
        assert!(parse(json!({ "detail": null })).detail_message().is_none());
        assert!(parse(json!({ "detail": "   " })).detail_message().is_none());
        assert!(parse(json!({ "detail": 42 })).detail_message().is_none());
        assert!(parse(json!({ "detail": [] })).detail_message().is_none());
    }
}
