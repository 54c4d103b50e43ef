use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single field value. Floats carry consumption; integers carry slot ids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
}

impl FieldValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            FieldValue::Float(v) => v,
            FieldValue::Integer(v) => v as f64,
        }
    }
}

/// One time-series row for the external store.
///
/// Tags and fields are kept in `BTreeMap`s so serialization order is stable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
    pub time: DateTime<Utc>,
}

impl Point {
    pub fn new(measurement: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            time,
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }
}

/// Canonical tag set shared by both message families.
pub fn endpoint_tags(endpoint_id: u32, endpoint_type: u8) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("endpoint_id".to_string(), endpoint_id.to_string()),
        ("endpoint_type".to_string(), endpoint_type.to_string()),
    ])
}
