//! Wire codec - flat JSON payloads to and from [`GamificationEvent`].
//!
//! Encoding writes the envelope and payload fields side by side with the
//! discriminator under `type`. Decoding reads `type` first and fails before
//! touching any other field if it is missing or unknown; otherwise the
//! registered variant decodes and validates the remaining fields.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::envelope::ENVELOPE_FIELDS;
use crate::error::{DecodeError, EncodeError};
use crate::event::GamificationEvent;
use crate::kind::fields;
use crate::registry::registry;

/// Typed access to the fields of a payload object.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    pub fn new(fields: &'a Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Reads a field that must be present and non-null.
    pub fn required<T: DeserializeOwned>(&self, name: &str) -> Result<T, DecodeError> {
        self.optional(name)?
            .ok_or_else(|| DecodeError::MissingField(name.to_string()))
    }

    /// Reads a field that may be absent or null.
    pub fn optional<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, DecodeError> {
        match self.fields.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => <T as Deserialize<'_>>::deserialize(value)
                .map(Some)
                .map_err(|e| DecodeError::MalformedField {
                    field: name.to_string(),
                    reason: e.to_string(),
                }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}

/// Encodes an event as a flat JSON object.
pub fn encode(event: &GamificationEvent) -> Result<Value, EncodeError> {
    Ok(serde_json::to_value(event)?)
}

pub fn encode_to_string(event: &GamificationEvent) -> Result<String, EncodeError> {
    Ok(serde_json::to_string(event)?)
}

pub fn encode_to_vec(event: &GamificationEvent) -> Result<Vec<u8>, EncodeError> {
    Ok(serde_json::to_vec(event)?)
}

/// Decodes a JSON payload into its concrete variant.
pub fn decode(payload: &Value) -> Result<GamificationEvent, DecodeError> {
    match decode_object(payload) {
        Ok(event) => {
            debug!(
                event_type = event.event_type(),
                event_id = %event.event_id(),
                "decoded gamification event"
            );
            Ok(event)
        }
        Err(err) => {
            let event_type = payload.get(fields::TYPE).and_then(Value::as_str);
            warn!(
                event_type,
                error = %err,
                "rejected gamification event payload"
            );
            Err(err)
        }
    }
}

/// Parses and decodes a JSON text payload.
pub fn decode_str(payload: &str) -> Result<GamificationEvent, DecodeError> {
    let value: Value = serde_json::from_str(payload)?;
    decode(&value)
}

/// Parses and decodes a JSON byte payload.
pub fn decode_slice(payload: &[u8]) -> Result<GamificationEvent, DecodeError> {
    let value: Value = serde_json::from_slice(payload)?;
    decode(&value)
}

fn decode_object(payload: &Value) -> Result<GamificationEvent, DecodeError> {
    let object = payload
        .as_object()
        .ok_or_else(|| DecodeError::NotAnObject(json_type(payload)))?;

    let event_type = match object.get(fields::TYPE) {
        None | Some(Value::Null) => return Err(DecodeError::MissingDiscriminator),
        Some(Value::String(event_type)) => event_type.as_str(),
        Some(other) => {
            return Err(DecodeError::MalformedField {
                field: fields::TYPE.to_string(),
                reason: format!("expected string, got {}", json_type(other)),
            })
        }
    };

    let entry = registry()?
        .lookup(event_type)
        .ok_or_else(|| DecodeError::UnknownDiscriminator(event_type.to_string()))?;

    for key in object.keys() {
        let known = key == fields::TYPE
            || ENVELOPE_FIELDS.contains(&key.as_str())
            || entry.payload_fields().contains(&key.as_str());
        if !known {
            debug!(event_type, field = %key, "ignoring unknown payload field");
        }
    }

    entry.decode(&FieldReader::new(object))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Constraint, EventKind};
    use serde_json::json;

    fn task_payload() -> Value {
        json!({
            "type": "TASK_COMPLETED",
            "eventId": "3f2b8c1e-9a4d-4c6e-8f0a-1b2c3d4e5f60",
            "userId": "user-42",
            "occurredAt": "2024-03-01T10:15:30",
            "taskId": "task-7",
            "score": 85
        })
    }

    #[test]
    fn test_decode_task_completed() {
        let event = decode(&task_payload()).unwrap();
        assert_eq!(event.kind(), EventKind::TaskCompleted);
        assert_eq!(event.user_id(), "user-42");
        assert_eq!(
            event.event_id().to_string(),
            "3f2b8c1e-9a4d-4c6e-8f0a-1b2c3d4e5f60"
        );

        let GamificationEvent::TaskCompleted(task) = event else {
            panic!("expected TaskCompleted");
        };
        assert_eq!(task.task_id(), "task-7");
        assert_eq!(task.score(), 85);
    }

    #[test]
    fn test_unknown_discriminator() {
        let mut payload = task_payload();
        payload["type"] = json!("UNKNOWN_X");
        assert_eq!(
            decode(&payload).unwrap_err(),
            DecodeError::UnknownDiscriminator("UNKNOWN_X".to_string())
        );
    }

    #[test]
    fn test_missing_discriminator() {
        let mut payload = task_payload();
        payload.as_object_mut().unwrap().remove("type");
        assert_eq!(decode(&payload).unwrap_err(), DecodeError::MissingDiscriminator);

        payload["type"] = Value::Null;
        assert_eq!(decode(&payload).unwrap_err(), DecodeError::MissingDiscriminator);
    }

    #[test]
    fn test_discriminator_checked_before_fields() {
        // Every other field is broken; only the tag error must surface.
        let payload = json!({ "type": "NOPE", "eventId": 7, "score": "high" });
        assert!(matches!(
            decode(&payload).unwrap_err(),
            DecodeError::UnknownDiscriminator(_)
        ));
    }

    #[test]
    fn test_rejections_are_returned_unchanged() {
        // Each case goes through the rejection log before returning.
        let cases = [
            (
                json!({ "type": "UNKNOWN_X" }),
                DecodeError::UnknownDiscriminator("UNKNOWN_X".to_string()),
            ),
            (json!({ "type": null }), DecodeError::MissingDiscriminator),
            (json!("TASK_COMPLETED"), DecodeError::NotAnObject("string")),
        ];
        for (payload, expected) in cases {
            assert_eq!(decode(&payload).unwrap_err(), expected);
        }
    }

    #[test]
    fn test_non_string_discriminator() {
        let mut payload = task_payload();
        payload["type"] = json!(3);
        let err = decode(&payload).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedField { ref field, .. } if field == "type"));
        assert!(err.is_discriminator_error());
    }

    #[test]
    fn test_malformed_uuid() {
        let mut payload = task_payload();
        payload["eventId"] = json!("not-a-uuid");
        assert!(matches!(
            decode(&payload).unwrap_err(),
            DecodeError::MalformedField { ref field, .. } if field == "eventId"
        ));
    }

    #[test]
    fn test_malformed_timestamp() {
        let mut payload = task_payload();
        payload["occurredAt"] = json!("yesterday");
        assert!(matches!(
            decode(&payload).unwrap_err(),
            DecodeError::MalformedField { ref field, .. } if field == "occurredAt"
        ));
    }

    #[test]
    fn test_missing_field() {
        let mut payload = task_payload();
        payload.as_object_mut().unwrap().remove("score");
        assert_eq!(
            decode(&payload).unwrap_err(),
            DecodeError::MissingField("score".to_string())
        );
    }

    #[test]
    fn test_validation_failure_aborts_decode() {
        let mut payload = task_payload();
        payload["score"] = json!(101);
        let err = decode(&payload).unwrap_err();
        let validation = err.as_validation().unwrap();
        assert_eq!(validation.field(), "score");
        assert_eq!(validation.constraint(), &Constraint::Range);
    }

    #[test]
    fn test_invalid_rarity_reported_with_other_violations() {
        let payload = json!({
            "type": "ACHIEVEMENT_UNLOCKED",
            "eventId": "3f2b8c1e-9a4d-4c6e-8f0a-1b2c3d4e5f60",
            "userId": "user-42",
            "occurredAt": "2024-03-01T10:15:30",
            "achievementId": "streak-7",
            "achievementName": "On Fire",
            "description": "",
            "pointsReward": 100,
            "rarity": "mythic"
        });
        let err = decode(&payload).unwrap_err();
        let validation = err.as_validation().unwrap();
        assert!(validation.has_violation("rarity", &Constraint::OneOf));
        assert!(validation.has_violation("description", &Constraint::NotBlank));
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(
            decode(&json!([1, 2])).unwrap_err(),
            DecodeError::NotAnObject("array")
        );
    }

    #[test]
    fn test_decode_str_invalid_json() {
        assert!(matches!(
            decode_str("{ not json").unwrap_err(),
            DecodeError::InvalidJson(_)
        ));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let mut payload = task_payload();
        payload["source"] = json!("lms");
        assert!(decode(&payload).is_ok());
    }

    #[test]
    fn test_encode_matches_wire_shape() {
        let event = decode(&task_payload()).unwrap();
        assert_eq!(encode(&event).unwrap(), task_payload());
    }

    #[test]
    fn test_roundtrip_through_bytes() {
        let event = decode(&task_payload()).unwrap();
        let bytes = encode_to_vec(&event).unwrap();
        assert_eq!(decode_slice(&bytes).unwrap(), event);

        let text = encode_to_string(&event).unwrap();
        assert_eq!(decode_str(&text).unwrap(), event);
    }

    #[test]
    fn test_field_reader_optional() {
        let object = json!({ "iconUrl": null, "rarity": "RARE" });
        let reader = FieldReader::new(object.as_object().unwrap());
        assert_eq!(reader.optional::<String>("iconUrl").unwrap(), None);
        assert_eq!(reader.optional::<String>("missing").unwrap(), None);
        assert_eq!(
            reader.required::<String>("rarity").unwrap(),
            "RARE".to_string()
        );
        assert!(reader.contains("iconUrl"));
    }
}
