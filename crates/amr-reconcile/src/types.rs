use std::collections::BTreeMap;

use amr_schemas::{endpoint_tags, FieldValue};
use chrono::{DateTime, Duration, Utc};

/// Field name carrying scaled interval usage.
pub const FIELD_CONSUMPTION: &str = "consumption";

/// Field name carrying the slot id in stored points (read back during bootstrap).
pub const FIELD_INTERVAL: &str = "interval";

/// Scaling and tolerance applied by the [`crate::Reconciler`].
#[derive(Clone, Debug, PartialEq)]
pub struct ReconcileConfig {
    /// Factor applied to raw interval deltas before storing.
    pub multiplier: f64,
    /// Maximum reconstructed-time drift (inclusive) still treated as the same observation.
    pub threshold: Duration,
    /// Length of one accounting interval.
    pub interval_length: Duration,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            multiplier: 10.0,
            threshold: Duration::seconds(30),
            interval_length: Duration::minutes(5),
        }
    }
}

/// Outcome counts of one reconciliation call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Batch positions that replaced their slot.
    pub new_slots: usize,
    /// Batch positions suppressed as retransmissions.
    pub duplicate_slots: usize,
}

/// One row of recent history from the external store.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoricalRow {
    pub meter_id: u32,
    pub meter_type: Option<u8>,
    pub slot: u8,
    pub usage: f64,
    pub time: DateTime<Utc>,
}

/// A newly observed interval reading, ready to persist.
#[derive(Clone, Debug, PartialEq)]
pub struct ConsumptionRecord {
    pub endpoint_id: u32,
    pub endpoint_type: u8,
    pub slot: u8,
    pub consumption: f64,
    pub time: DateTime<Utc>,
}

impl ConsumptionRecord {
    pub fn tags(&self) -> BTreeMap<String, String> {
        endpoint_tags(self.endpoint_id, self.endpoint_type)
    }

    pub fn fields(&self) -> BTreeMap<String, FieldValue> {
        BTreeMap::from([(
            FIELD_CONSUMPTION.to_string(),
            FieldValue::Float(self.consumption),
        )])
    }
}
