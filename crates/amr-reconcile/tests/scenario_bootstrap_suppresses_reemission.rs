use amr_reconcile::*;
use amr_schemas::IdmBatch;
use chrono::{Duration, TimeZone, Utc};

#[test]
fn scenario_preloaded_slot_within_threshold_not_new() {
    let t = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let mut reg = MeterRegistry::new();
    reg.bootstrap([HistoricalRow {
        meter_id: 12345,
        meter_type: Some(7),
        slot: 10,
        usage: 50.0,
        time: t,
    }]);

    let batch = IdmBatch {
        endpoint_id: 12345,
        endpoint_type: 7,
        transmit_time_offset: 0,
        interval_count: 10,
        intervals: vec![5, 5],
        serial_checksum: 0,
        received_at: t + Duration::seconds(12),
    };

    let store = reg.get_or_create(12345);
    let summary = Reconciler::default().update(store, &batch);

    assert!(!store.is_new(10), "history within threshold must suppress");
    assert!(store.is_new(9), "slot missing from history is still new");
    assert_eq!(summary, UpdateSummary { new_slots: 1, duplicate_slots: 1 });

    let recs = RecordEmitter::new("power").emit(12345, 7, store, &batch);
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].slot, 9);
}

#[test]
fn scenario_stale_history_is_overridden() {
    let t = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let mut reg = MeterRegistry::new();
    // Slot 10 last used one full ring revolution ago.
    reg.bootstrap([HistoricalRow {
        meter_id: 1,
        meter_type: None,
        slot: 10,
        usage: 1.0,
        time: t - Duration::minutes(5 * 256),
    }]);

    let batch = IdmBatch {
        endpoint_id: 1,
        endpoint_type: 7,
        transmit_time_offset: 0,
        interval_count: 10,
        intervals: vec![2],
        serial_checksum: 0,
        received_at: t,
    };
    let store = reg.get_or_create(1);
    Reconciler::default().update(store, &batch);
    assert!(store.is_new(10));
    assert_eq!(store.usage(10), 20.0);
}
