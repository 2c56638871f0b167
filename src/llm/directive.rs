// src/llm/directive.rs

use serde_json::{json, Value};

/// The model's reply, classified against the output contract.
///
/// The contract allows exactly two JSON shapes: `{"action", "payload"}` and
/// `{"response"}`. Everything else, JSON or not, is a plain conversational
/// reply carried verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// `{"action": ..., "payload": ...}` — a request to invoke a tenant
    /// endpoint. Payload defaults to an empty object when absent.
    Call { action: String, payload: Value },
    /// `{"response": ...}` — a conversational reply authored by the model.
    Reply(String),
    /// Anything outside the contract, returned to the user as-is.
    Plain(String),
}

/// Total parse: never fails, never branches on an error path.
pub fn parse_directive(text: &str) -> Directive {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) else {
        return Directive::Plain(text.to_string());
    };

    if let Some(response) = map.get("response").and_then(Value::as_str) {
        return Directive::Reply(response.to_string());
    }

    if let Some(action) = map.get("action").and_then(Value::as_str) {
        let payload = map.get("payload").cloned().unwrap_or_else(|| json!({}));
        return Directive::Call { action: action.to_string(), payload };
    }

    Directive::Plain(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_json_is_plain() {
        assert_eq!(parse_directive("hello"), Directive::Plain("hello".to_string()));
    }

    #[test]
    fn test_response_shape() {
        let d = parse_directive(r#"{"response": "Sure thing"}"#);
        assert_eq!(d, Directive::Reply("Sure thing".to_string()));
    }

    #[test]
    fn test_action_shape_with_payload() {
        let d = parse_directive(r#"{"action": "get_news", "payload": {"topic": "ai"}}"#);
        match d {
            Directive::Call { action, payload } => {
                assert_eq!(action, "get_news");
                assert_eq!(payload["topic"], "ai");
            }
            other => panic!("expected Call, got {:?}", other),
        }
    }

    #[test]
    fn test_action_shape_without_payload_defaults_empty() {
        let d = parse_directive(r#"{"action": "get_news"}"#);
        match d {
            Directive::Call { payload, .. } => assert_eq!(payload, json!({})),
            other => panic!("expected Call, got {:?}", other),
        }
    }

    #[test]
    fn test_response_key_wins_over_action() {
        let d = parse_directive(r#"{"response": "hi", "action": "get_news"}"#);
        assert_eq!(d, Directive::Reply("hi".to_string()));
    }

    #[test]
    fn test_other_json_shapes_are_plain() {
        assert!(matches!(parse_directive("[1, 2, 3]"), Directive::Plain(_)));
        assert!(matches!(parse_directive("42"), Directive::Plain(_)));
        assert!(matches!(parse_directive(r#"{"other": true}"#), Directive::Plain(_)));
        // Non-string response is outside the contract too.
        assert!(matches!(parse_directive(r#"{"response": 5}"#), Directive::Plain(_)));
    }
}
