use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::EntityId;

/// Wire envelope for realtime traffic, both directions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Envelope {
    pub fn new(event: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self::new(
            "error",
            Some(serde_json::json!({ "code": code, "message": message })),
        )
    }
}

/// Validate an inbound event's payload before it reaches any handler.
/// Unknown events are rejected here so a client cannot probe for
/// unvalidated paths.
pub fn validate_event(event: &str, payload: Option<&Value>) -> Result<(), String> {
    match event {
        "ping" => Ok(()),
        "notification:read" => {
            let payload = payload.ok_or("notification:read requires a payload")?;
            let id = payload
                .get("notificationId")
                .ok_or("notificationId is required")?;
            parse_entity_id(id).map(|_| ()).ok_or_else(|| {
                "notificationId must be a valid identifier".to_string()
            })
        }
        _ => Err(format!("unknown event: {event}")),
    }
}

/// Accept an id as either a JSON number or a decimal string, matching the
/// HTTP side's wide-integer handling.
pub fn parse_entity_id(value: &Value) -> Option<EntityId> {
    match value {
        Value::Number(n) => n.as_i64().map(EntityId),
        Value::String(s) => EntityId::parse_optional(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_round_trips() {
        let raw = r#"{"event":"ping"}"#;
        let envelope: Envelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.event, "ping");
        assert!(envelope.payload.is_none());
    }

    #[test]
    fn ping_needs_no_payload() {
        assert!(validate_event("ping", None).is_ok());
    }

    #[test]
    fn notification_read_requires_an_id() {
        assert!(validate_event("notification:read", None).is_err());
        assert!(validate_event("notification:read", Some(&json!({}))).is_err());
        assert!(
            validate_event("notification:read", Some(&json!({ "notificationId": 42 }))).is_ok()
        );
        assert!(
            validate_event(
                "notification:read",
                Some(&json!({ "notificationId": "9223372036854775807" }))
            )
            .is_ok()
        );
        assert!(
            validate_event(
                "notification:read",
                Some(&json!({ "notificationId": "not-a-number" }))
            )
            .is_err()
        );
    }

    #[test]
    fn unknown_events_are_rejected() {
        assert!(validate_event("admin:grant", Some(&json!({}))).is_err());
    }
}
