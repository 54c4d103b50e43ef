//! Line decoder: one JSON envelope per line.
//!
//! Envelope shape (as emitted by the radio decoder):
//!
//! ```json
//! {"Time": "2020-01-01T00:00:00Z", "Type": "IDM", "Message": { ... }}
//! ```
//!
//! The payload is decoded only after the discriminator is known, so an
//! unrecognised `Type` is reported as such rather than as a payload error.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::{IdmBatch, Message, ScmReading, KIND_IDM, KIND_SCM};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Time")]
    time: DateTime<Utc>,
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Message")]
    message: Value,
}

/// Errors produced while decoding an input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The line is not a valid envelope (bad JSON, missing `Time`/`Type`/`Message`).
    Malformed(String),
    /// The envelope was fine but the payload does not match its declared type.
    InvalidPayload { kind: String, reason: String },
    /// The `Type` discriminator is not a supported message family.
    UnknownType(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Malformed(reason) => write!(f, "malformed envelope: {reason}"),
            DecodeError::InvalidPayload { kind, reason } => {
                write!(f, "invalid {kind} payload: {reason}")
            }
            DecodeError::UnknownType(kind) => write!(f, "unknown message type '{kind}'"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decode one input line into a [`Message`].
pub fn decode_line(line: &str) -> Result<Message, DecodeError> {
    let env: Envelope =
        serde_json::from_str(line.trim()).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    match env.kind.as_str() {
        KIND_IDM => {
            let mut batch: IdmBatch =
                serde_json::from_value(env.message).map_err(|e| DecodeError::InvalidPayload {
                    kind: env.kind.clone(),
                    reason: e.to_string(),
                })?;
            batch.received_at = env.time;
            Ok(Message::Idm(batch))
        }
        KIND_SCM => {
            let mut reading: ScmReading =
                serde_json::from_value(env.message).map_err(|e| DecodeError::InvalidPayload {
                    kind: env.kind.clone(),
                    reason: e.to_string(),
                })?;
            reading.received_at = env.time;
            Ok(Message::Scm(reading))
        }
        _ => Err(DecodeError::UnknownType(env.kind)),
    }
}
