//! BACnet object taxonomy.
//!
//! The five simulated point types, their engineering-unit tables and the
//! value representations a point can carry. These mirror the vocabulary of a
//! building-automation deployment closely enough that downstream consumers
//! exercise their real parsing paths.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a simulated point: its type and per-type instance number.
pub type ObjectKey = (ObjectType, u32);

/// The kinds of BACnet objects the generator simulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectType {
    /// A physical analog sensor, a meter or temperature probe.
    AnalogInput,
    /// A computed analog point.
    AnalogValue,
    /// A physical two-state sensor, a contact or switch.
    BinaryInput,
    /// A computed two-state point.
    BinaryValue,
    /// A point with a small set of discrete states.
    MultiStateValue,
}

impl ObjectType {
    /// Wire spelling of the type, `analog-input` and friends.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::AnalogInput => "analog-input",
            ObjectType::AnalogValue => "analog-value",
            ObjectType::BinaryInput => "binary-input",
            ObjectType::BinaryValue => "binary-value",
            ObjectType::MultiStateValue => "multi-state-value",
        }
    }

    /// The value representation points of this type carry.
    #[must_use]
    pub fn value_kind(self) -> ValueKind {
        match self {
            ObjectType::AnalogInput | ObjectType::AnalogValue => ValueKind::Real,
            ObjectType::BinaryInput | ObjectType::BinaryValue => ValueKind::Boolean,
            ObjectType::MultiStateValue => ValueKind::Unsigned,
        }
    }

    /// Engineering units plausible for this type, as BACnet `(code, text)`
    /// pairs. Binary and multi-state points carry only the dimensionless
    /// unit, code 95.
    #[must_use]
    pub fn units(self) -> &'static [(u16, &'static str)] {
        match self {
            ObjectType::AnalogInput => &[(169, "kWh"), (95, ""), (62, "degC"), (91, "percent")],
            ObjectType::AnalogValue => &[(95, ""), (169, "kWh"), (119, "kW")],
            ObjectType::BinaryInput | ObjectType::BinaryValue | ObjectType::MultiStateValue => {
                &[(95, "")]
            }
        }
    }

    /// Synthetic object name for an instance, `Test_analog_input_7` style.
    #[must_use]
    pub fn object_name(self, instance: u32) -> String {
        let stem = match self {
            ObjectType::AnalogInput => "analog_input",
            ObjectType::AnalogValue => "analog_value",
            ObjectType::BinaryInput => "binary_input",
            ObjectType::BinaryValue => "binary_value",
            ObjectType::MultiStateValue => "multi_state_value",
        };
        format!("Test_{stem}_{instance}")
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value representation of a point, named in definition payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Continuous reading, serialized as a float.
    Real,
    /// Two-state reading.
    Boolean,
    /// Discrete state in a small range.
    Unsigned,
}

/// A point's present value. Serialization is untagged: the JSON carries a
/// bare bool, integer or float and the consumer keys off `presentValueType`
/// from the definition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointValue {
    /// Value of a binary point.
    Boolean(bool),
    /// Value of a multi-state point.
    Unsigned(u8),
    /// Value of an analog point.
    Real(f64),
}

impl PointValue {
    /// The representation this value belongs to.
    #[must_use]
    pub fn kind(self) -> ValueKind {
        match self {
            PointValue::Boolean(_) => ValueKind::Boolean,
            PointValue::Unsigned(_) => ValueKind::Unsigned,
            PointValue::Real(_) => ValueKind::Real,
        }
    }
}
