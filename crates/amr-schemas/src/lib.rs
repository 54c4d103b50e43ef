//! amr-schemas
//!
//! Wire types for decoded meter messages (one JSON envelope per input line)
//! and the time-series [`Point`] shape handed to the store.
//!
//! This crate does **not** validate checksums or deduplicate readings.

mod decode;
mod point;

pub use decode::{decode_line, DecodeError};
pub use point::{endpoint_tags, FieldValue, Point};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope discriminator for interval data messages.
pub const KIND_IDM: &str = "IDM";
/// Envelope discriminator for standard consumption messages.
pub const KIND_SCM: &str = "SCM";

/// One decoded input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Idm(IdmBatch),
    Scm(ScmReading),
}

impl Message {
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Idm(_) => KIND_IDM,
            Message::Scm(_) => KIND_SCM,
        }
    }
}

/// Multi-interval reading batch (IDM).
///
/// `intervals[0]` is the most recent interval; `intervals[k]` is `k`
/// intervals older. `interval_count` is the absolute slot id (mod 256) of
/// `intervals[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdmBatch {
    #[serde(rename = "ERTSerialNumber")]
    pub endpoint_id: u32,
    #[serde(rename = "ERTType")]
    pub endpoint_type: u8,
    /// 62.5 µs ticks since the start of the most recent interval.
    #[serde(rename = "TransmitTimeOffset")]
    pub transmit_time_offset: u16,
    #[serde(rename = "ConsumptionIntervalCount")]
    pub interval_count: u8,
    #[serde(rename = "DifferentialConsumptionIntervals")]
    pub intervals: Vec<u16>,
    #[serde(rename = "SerialNumberCRC")]
    pub serial_checksum: u16,
    /// Envelope receipt time; not part of the message payload.
    #[serde(skip)]
    pub received_at: DateTime<Utc>,
}

/// Single cumulative reading (SCM). Pass-through: no history, no dedup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScmReading {
    #[serde(rename = "ID")]
    pub endpoint_id: u32,
    #[serde(rename = "Type")]
    pub endpoint_type: u8,
    #[serde(rename = "TamperPhy", default)]
    pub tamper_phy: u8,
    #[serde(rename = "TamperEnc", default)]
    pub tamper_enc: u8,
    #[serde(rename = "Consumption")]
    pub consumption: u32,
    #[serde(rename = "ChecksumVal", default)]
    pub checksum_val: u16,
    #[serde(skip)]
    pub received_at: DateTime<Utc>,
}
