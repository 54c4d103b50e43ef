//! Fixtures for pipeline and store tests.
//!
//! - [`IdmFixture`] builds interval batches (and their input lines) with a
//!   valid serial checksum unless told otherwise.
//! - [`scm_line`] / [`envelope_line`] build other input lines.
//! - [`MemorySink`], [`FailingSink`] and [`StaticHistory`] stand in for the
//!   external store. No network I/O.

use std::sync::Mutex;

use amr_integrity::serial_checksum_for;
use amr_reconcile::HistoricalRow;
use amr_schemas::{IdmBatch, Point, ScmReading, KIND_IDM, KIND_SCM};
use amr_store::{HistorySource, PointSink, StoreError};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};

/// 2020-01-01T00:00:00Z, the reference receipt time used across scenarios.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).single().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Input lines
// ---------------------------------------------------------------------------

/// One envelope line with an arbitrary discriminator and payload.
pub fn envelope_line(kind: &str, at: DateTime<Utc>, message: Value) -> String {
    json!({
        "Time": at.to_rfc3339(),
        "Type": kind,
        "Message": message,
    })
    .to_string()
}

/// One SCM input line.
pub fn scm_line(
    endpoint_id: u32,
    endpoint_type: u8,
    consumption: u32,
    at: DateTime<Utc>,
) -> String {
    let reading = ScmReading {
        endpoint_id,
        endpoint_type,
        tamper_phy: 0,
        tamper_enc: 0,
        consumption,
        checksum_val: 0,
        received_at: at,
    };
    envelope_line(KIND_SCM, at, json!(reading))
}

/// Builder for IDM batches.
#[derive(Clone, Debug)]
pub struct IdmFixture {
    batch: IdmBatch,
    checksum_override: Option<u16>,
}

impl IdmFixture {
    /// Meter `endpoint_id`, type 7, slot 0, no intervals, offset 0, received at [`t0`].
    pub fn new(endpoint_id: u32) -> Self {
        Self {
            batch: IdmBatch {
                endpoint_id,
                endpoint_type: 7,
                transmit_time_offset: 0,
                interval_count: 0,
                intervals: Vec::new(),
                serial_checksum: 0,
                received_at: t0(),
            },
            checksum_override: None,
        }
    }

    pub fn endpoint_type(mut self, t: u8) -> Self {
        self.batch.endpoint_type = t;
        self
    }

    pub fn interval_count(mut self, count: u8) -> Self {
        self.batch.interval_count = count;
        self
    }

    pub fn intervals(mut self, intervals: impl Into<Vec<u16>>) -> Self {
        self.batch.intervals = intervals.into();
        self
    }

    pub fn offset_ticks(mut self, ticks: u16) -> Self {
        self.batch.transmit_time_offset = ticks;
        self
    }

    pub fn received_at(mut self, at: DateTime<Utc>) -> Self {
        self.batch.received_at = at;
        self
    }

    /// Shift receipt time by `by` (negative moves it earlier).
    pub fn shifted(mut self, by: Duration) -> Self {
        self.batch.received_at += by;
        self
    }

    /// Replace the computed checksum with one that fails validation.
    pub fn bad_checksum(mut self) -> Self {
        self.checksum_override = Some(serial_checksum_for(self.batch.endpoint_id) ^ 0x0001);
        self
    }

    pub fn batch(&self) -> IdmBatch {
        let mut b = self.batch.clone();
        b.serial_checksum = self
            .checksum_override
            .unwrap_or_else(|| serial_checksum_for(b.endpoint_id));
        b
    }

    pub fn line(&self) -> String {
        let b = self.batch();
        envelope_line(KIND_IDM, b.received_at, json!(b))
    }
}

// ---------------------------------------------------------------------------
// Store doubles
// ---------------------------------------------------------------------------

/// Records every write call.
#[derive(Debug, Default)]
pub struct MemorySink {
    writes: Mutex<Vec<Vec<Point>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points of every write call, one entry per call.
    pub fn writes(&self) -> Vec<Vec<Point>> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// All written points, flattened in write order.
    pub fn points(&self) -> Vec<Point> {
        self.writes().into_iter().flatten().collect()
    }
}

#[async_trait::async_trait]
impl PointSink for MemorySink {
    async fn write_points(&self, points: &[Point]) -> Result<(), StoreError> {
        if let Ok(mut w) = self.writes.lock() {
            w.push(points.to_vec());
        }
        Ok(())
    }
}

/// Fails every write; counts attempts.
#[derive(Debug, Default)]
pub struct FailingSink {
    attempts: Mutex<usize>,
}

impl FailingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.lock().map(|a| *a).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl PointSink for FailingSink {
    async fn write_points(&self, _points: &[Point]) -> Result<(), StoreError> {
        if let Ok(mut a) = self.attempts.lock() {
            *a += 1;
        }
        Err(StoreError::Transport("connection refused".to_string()))
    }
}

/// Canned history; ignores the requested window.
#[derive(Debug, Clone)]
pub struct StaticHistory {
    result: Result<Vec<HistoricalRow>, StoreError>,
}

impl StaticHistory {
    pub fn rows(rows: Vec<HistoricalRow>) -> Self {
        Self { result: Ok(rows) }
    }

    pub fn failing(err: StoreError) -> Self {
        Self { result: Err(err) }
    }
}

#[async_trait::async_trait]
impl HistorySource for StaticHistory {
    async fn fetch_recent(&self, _window: Duration) -> Result<Vec<HistoricalRow>, StoreError> {
        self.result.clone()
    }
}
