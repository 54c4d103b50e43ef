use amr_schemas::{FieldValue, IdmBatch, Point};

use crate::indexer::slot_id;
use crate::ring::RingStore;
use crate::{ConsumptionRecord, FIELD_INTERVAL, RING_SLOTS};

/// Projects slots flagged by the last reconciliation call into records.
#[derive(Clone, Debug)]
pub struct RecordEmitter {
    measurement: String,
}

impl RecordEmitter {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
        }
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    /// One record per slot of `batch` flagged new in `store`, in batch order.
    ///
    /// Must be called after [`crate::Reconciler::update`] on the same store and
    /// batch. Each slot is emitted at most once.
    pub fn emit(
        &self,
        meter_id: u32,
        endpoint_type: u8,
        store: &RingStore,
        batch: &IdmBatch,
    ) -> Vec<ConsumptionRecord> {
        let mut seen = [false; RING_SLOTS];
        let mut out = Vec::new();

        for index in 0..batch.intervals.len() {
            let slot = slot_id(batch.interval_count, index);
            if !store.is_new(slot) || seen[slot as usize] {
                continue;
            }
            seen[slot as usize] = true;

            let Some(time) = store.occupied_time(slot) else {
                continue;
            };
            out.push(ConsumptionRecord {
                endpoint_id: meter_id,
                endpoint_type,
                slot,
                consumption: store.usage(slot),
                time,
            });
        }

        out
    }

    /// Store-ready point for `record`.
    ///
    /// Besides the record's own tags and `consumption` field, the point
    /// carries the slot id as an integer `interval` field; bootstrap reads it
    /// back to rebuild ring stores after a restart.
    pub fn to_point(&self, record: &ConsumptionRecord) -> Point {
        Point {
            measurement: self.measurement.clone(),
            tags: record.tags(),
            fields: record.fields(),
            time: record.time,
        }
        .field(FIELD_INTERVAL, FieldValue::Integer(record.slot as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reconciler;
    use chrono::{Duration, TimeZone, Utc};

    fn batch(count: u8, intervals: Vec<u16>) -> IdmBatch {
        IdmBatch {
            endpoint_id: 99,
            endpoint_type: 8,
            transmit_time_offset: 0,
            interval_count: count,
            intervals,
            serial_checksum: 0,
            received_at: Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap(),
        }
    }

    #[test]
    fn emits_only_new_slots_in_batch_order() {
        let r = Reconciler::default();
        let e = RecordEmitter::new("power");
        let mut s = RingStore::new();

        let b1 = batch(1, vec![3]);
        r.update(&mut s, &b1);
        assert_eq!(e.emit(99, 8, &s, &b1).len(), 1);

        // Same receipt time shifted by one interval: slot 2 new, slot 1 dup.
        let mut b2 = batch(2, vec![4, 3]);
        b2.received_at += Duration::minutes(5);
        r.update(&mut s, &b2);
        let recs = e.emit(99, 8, &s, &b2);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].slot, 2);
        assert_eq!(recs[0].consumption, 40.0);
    }

    #[test]
    fn all_duplicates_emit_nothing() {
        let r = Reconciler::default();
        let e = RecordEmitter::new("power");
        let mut s = RingStore::new();
        let b = batch(50, vec![1, 1, 1]);
        r.update(&mut s, &b);
        r.update(&mut s, &b);
        assert!(e.emit(99, 8, &s, &b).is_empty());
    }

    #[test]
    fn point_carries_tags_consumption_and_slot() {
        let e = RecordEmitter::new("water");
        let rec = ConsumptionRecord {
            endpoint_id: 12345,
            endpoint_type: 7,
            slot: 253,
            consumption: 12.5,
            time: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        };
        let p = e.to_point(&rec);
        assert_eq!(p.measurement, "water");
        assert_eq!(p.tags["endpoint_id"], "12345");
        assert_eq!(p.tags["endpoint_type"], "7");
        assert_eq!(p.fields["consumption"], FieldValue::Float(12.5));
        assert_eq!(p.fields["interval"], FieldValue::Integer(253));
        assert_eq!(p.time, rec.time);
    }
}
