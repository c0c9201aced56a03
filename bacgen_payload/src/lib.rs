//! The bacgen payloads
//!
//! This library supports payload generation for the bacgen project: the
//! BACnet object taxonomy, the JSON message envelope understood by the
//! downstream event consumer and the stateful generator that produces one
//! plausible event per call. Nothing in here performs IO; callers supply
//! their own RNG and hand the encoded bytes to a sink.

#![deny(clippy::cargo)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::multiple_crate_versions)]

pub use bacnet::{ObjectKey, ObjectType, PointValue, ValueKind};
pub use generator::BacnetGenerator;
pub use message::{Message, MessageKind, Quality, StatusFlags};

pub mod bacnet;
pub mod generator;
pub mod message;
pub mod weighted;

/// Errors related to payload generation
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Json payload could not be encoded
    #[error("Json payload could not be encoded: {0}")]
    Json(#[from] serde_json::Error),
    /// Envelope timestamp could not be formatted
    #[error("Envelope timestamp could not be formatted: {0}")]
    TimeFormat(#[from] time::error::Format),
}
