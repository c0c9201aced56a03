//! The event envelope and its payload shapes.
//!
//! Every event published by the generator is one JSON document:
//!
//! ```text
//! {"messageType": ..., "timestamp": ..., "sourceId": "load-generator", "payload": {...}}
//! ```
//!
//! with the payload shape keyed by `messageType`. Field order and naming are
//! part of the contract with the downstream consumer and are pinned by tests.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::Error;
use crate::bacnet::{ObjectType, PointValue, ValueKind};

/// Source identifier stamped on every envelope.
pub const SOURCE_ID: &str = "load-generator";

/// Reason code carried by every delete payload.
pub const DELETE_REASON: &str = "load-test-cleanup";

/// The three kinds of event the generator produces. The serialized form of
/// the variant name is the envelope's `messageType` and the event-type tag
/// given to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// A new point came into existence.
    ObjectDefinition,
    /// An existing point produced a fresh reading.
    ValueUpdate,
    /// A point was decommissioned.
    ObjectDelete,
}

impl MessageKind {
    /// The wire spelling, identical to the variant name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::ObjectDefinition => "ObjectDefinition",
            MessageKind::ValueUpdate => "ValueUpdate",
            MessageKind::ObjectDelete => "ObjectDelete",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reading quality reported with every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// The reading is trustworthy.
    Good,
    /// An alarm or fault condition casts doubt on the reading.
    Uncertain,
}

/// BACnet status flags attached to every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusFlags {
    /// The point is in an alarm condition.
    pub in_alarm: bool,
    /// The point has detected an internal fault.
    pub fault: bool,
    /// The point's value has been manually overridden. Always false for
    /// synthetic points.
    pub overridden: bool,
    /// The point has been taken out of service. Always false for synthetic
    /// points.
    pub out_of_service: bool,
}

impl StatusFlags {
    /// Flags for a point that is in service and not overridden.
    #[must_use]
    pub fn new(in_alarm: bool, fault: bool) -> Self {
        Self {
            in_alarm,
            fault,
            overridden: false,
            out_of_service: false,
        }
    }
}

/// Payload of an [`MessageKind::ObjectDefinition`] event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    /// Type of the new point.
    pub object_type: ObjectType,
    /// Per-type instance number of the new point.
    pub object_instance: u32,
    /// Human-readable point name.
    pub object_name: String,
    /// Free-text description.
    pub description: String,
    /// Value representation the point will report.
    pub present_value_type: ValueKind,
    /// BACnet engineering-unit code.
    pub units: u16,
    /// Human-readable unit text, possibly empty.
    pub units_text: String,
    /// The point's value at creation.
    pub initial_value: PointValue,
    /// Change-of-value threshold. Only analog points carry one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cov_increment: Option<f64>,
}

/// Payload of a [`MessageKind::ValueUpdate`] event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    /// Type of the updated point.
    pub object_type: ObjectType,
    /// Instance of the updated point.
    pub object_instance: u32,
    /// The fresh reading.
    pub present_value: PointValue,
    /// Whether the reading can be trusted.
    pub quality: Quality,
    /// BACnet status flags accompanying the reading.
    pub status_flags: StatusFlags,
}

/// Payload of an [`MessageKind::ObjectDelete`] event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delete {
    /// Type of the removed point.
    pub object_type: ObjectType,
    /// Instance of the removed point.
    pub object_instance: u32,
    /// Why the point went away, always [`DELETE_REASON`].
    pub reason: String,
}

/// The kind-specific payload. Serialization is untagged; the envelope's
/// `messageType` is the discriminant consumers use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// See [`Definition`].
    Definition(Definition),
    /// See [`Update`].
    Update(Update),
    /// See [`Delete`].
    Delete(Delete),
}

/// One complete event as published to the sink. Field declaration order is
/// the serialization order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Discriminant for the payload shape.
    pub message_type: MessageKind,
    /// RFC 3339 UTC timestamp taken when the event was built.
    pub timestamp: String,
    /// Always [`SOURCE_ID`].
    pub source_id: String,
    /// The kind-specific body.
    pub payload: Payload,
}

impl Message {
    /// Wrap a definition payload in a fresh envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the current instant cannot be formatted, which
    /// would indicate a broken clock rather than bad input.
    pub fn definition(payload: Definition) -> Result<Self, Error> {
        Self::envelope(MessageKind::ObjectDefinition, Payload::Definition(payload))
    }

    /// Wrap an update payload in a fresh envelope.
    ///
    /// # Errors
    ///
    /// See [`Message::definition`].
    pub fn update(payload: Update) -> Result<Self, Error> {
        Self::envelope(MessageKind::ValueUpdate, Payload::Update(payload))
    }

    /// Wrap a delete payload in a fresh envelope.
    ///
    /// # Errors
    ///
    /// See [`Message::definition`].
    pub fn delete(payload: Delete) -> Result<Self, Error> {
        Self::envelope(MessageKind::ObjectDelete, Payload::Delete(payload))
    }

    fn envelope(kind: MessageKind, payload: Payload) -> Result<Self, Error> {
        let timestamp = OffsetDateTime::now_utc().format(&Rfc3339)?;
        Ok(Self {
            message_type: kind,
            timestamp,
            source_id: SOURCE_ID.to_string(),
            payload,
        })
    }

    /// The envelope's discriminant.
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        self.message_type
    }

    /// Serialize the envelope to the JSON bytes handed to the sink.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON encoding fails.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DELETE_REASON, Definition, Delete, Message, MessageKind, Quality, SOURCE_ID, StatusFlags,
        Update,
    };
    use crate::bacnet::{ObjectType, PointValue, ValueKind};

    fn sample_message() -> Message {
        Message::definition(sample_definition()).expect("failed to build definition")
    }

    fn sample_definition() -> Definition {
        Definition {
            object_type: ObjectType::AnalogInput,
            object_instance: 3,
            object_name: ObjectType::AnalogInput.object_name(3),
            description: "Load test object 3".to_string(),
            present_value_type: ValueKind::Real,
            units: 62,
            units_text: "degC".to_string(),
            initial_value: PointValue::Real(21.5),
            cov_increment: Some(0.5),
        }
    }

    #[test]
    fn envelope_field_order_is_stable() {
        let message = sample_message();
        let rendered = serde_json::to_string(&message).expect("failed to serialize");

        let position = |field: &str| rendered.find(field).expect("field missing");
        let message_type = position("\"messageType\"");
        let timestamp = position("\"timestamp\"");
        let source_id = position("\"sourceId\"");
        let payload = position("\"payload\"");
        assert!(message_type < timestamp);
        assert!(timestamp < source_id);
        assert!(source_id < payload);
    }

    #[test]
    fn definition_payload_shape() {
        let message = sample_message();
        let value = serde_json::to_value(&message).expect("failed to serialize");

        assert_eq!(value["messageType"], "ObjectDefinition");
        assert_eq!(value["sourceId"], SOURCE_ID);
        let payload = &value["payload"];
        assert_eq!(payload["objectType"], "analog-input");
        assert_eq!(payload["objectInstance"], 3);
        assert_eq!(payload["objectName"], "Test_analog_input_3");
        assert_eq!(payload["description"], "Load test object 3");
        assert_eq!(payload["presentValueType"], "real");
        assert_eq!(payload["units"], 62);
        assert_eq!(payload["unitsText"], "degC");
        assert_eq!(payload["initialValue"], 21.5);
        assert_eq!(payload["covIncrement"], 0.5);
    }

    #[test]
    fn cov_increment_is_omitted_when_absent() {
        let mut definition = sample_definition();
        definition.object_type = ObjectType::BinaryInput;
        definition.present_value_type = ValueKind::Boolean;
        definition.initial_value = PointValue::Boolean(true);
        definition.cov_increment = None;
        let message = Message::definition(definition).expect("failed to build definition");
        let value = serde_json::to_value(&message).expect("failed to serialize");
        assert!(
            value["payload"].get("covIncrement").is_none(),
            "covIncrement must be omitted for binary points"
        );
        assert_eq!(value["payload"]["initialValue"], true);
    }

    #[test]
    fn update_payload_shape() {
        let update = Update {
            object_type: ObjectType::MultiStateValue,
            object_instance: 9,
            present_value: PointValue::Unsigned(4),
            quality: Quality::Uncertain,
            status_flags: StatusFlags::new(true, false),
        };
        let message = Message::update(update).expect("failed to build update");
        let value = serde_json::to_value(&message).expect("failed to serialize");

        assert_eq!(value["messageType"], "ValueUpdate");
        let payload = &value["payload"];
        assert_eq!(payload["objectType"], "multi-state-value");
        assert_eq!(payload["objectInstance"], 9);
        assert_eq!(payload["presentValue"], 4);
        assert_eq!(payload["quality"], "uncertain");
        let flags = &payload["statusFlags"];
        assert_eq!(flags["inAlarm"], true);
        assert_eq!(flags["fault"], false);
        assert_eq!(flags["overridden"], false);
        assert_eq!(flags["outOfService"], false);
    }

    #[test]
    fn delete_payload_shape() {
        let delete = Delete {
            object_type: ObjectType::AnalogValue,
            object_instance: 2,
            reason: DELETE_REASON.to_string(),
        };
        let message = Message::delete(delete).expect("failed to build delete");
        let value = serde_json::to_value(&message).expect("failed to serialize");

        assert_eq!(value["messageType"], "ObjectDelete");
        assert_eq!(value["payload"]["reason"], "load-test-cleanup");
    }

    #[test]
    fn kind_matches_payload_constructor() {
        let message = sample_message();
        assert_eq!(message.kind(), MessageKind::ObjectDefinition);
        assert_eq!(message.kind().as_str(), "ObjectDefinition");
    }

    #[test]
    fn encode_round_trips() {
        let message = sample_message();
        let bytes = message.encode().expect("failed to encode");
        let back: Message = serde_json::from_slice(&bytes).expect("failed to decode");
        assert_eq!(back, message);
    }

    #[test]
    fn timestamp_is_rfc3339_utc() {
        let message = sample_message();
        let timestamp = &message.timestamp;
        // 2026-08-23T12:34:56Z at minimum; fractional seconds may follow the
        // time before the UTC designator.
        assert!(timestamp.len() >= 20, "timestamp too short: {timestamp}");
        assert_eq!(&timestamp[4..5], "-");
        assert_eq!(&timestamp[7..8], "-");
        assert_eq!(&timestamp[10..11], "T");
        assert!(timestamp.ends_with('Z'), "not UTC: {timestamp}");
    }
}
