use amr_schemas::IdmBatch;
use chrono::{DateTime, Duration, SubsecRound, Utc};

use crate::indexer::slot_id;
use crate::ring::RingStore;
use crate::{ReconcileConfig, UpdateSummary};

/// Length of one transmit-time-offset tick (62.5 µs) in nanoseconds.
pub const TICK_NANOS: i64 = 62_500;

/// Time elapsed between the start of the most recent interval and transmission.
pub fn transmit_offset(ticks: u16) -> Duration {
    Duration::nanoseconds(ticks as i64 * TICK_NANOS)
}

/// Reconstruct the boundary time of the interval at `index`, truncated to
/// whole seconds.
pub fn interval_time(
    received_at: DateTime<Utc>,
    index: usize,
    offset: Duration,
    interval_length: Duration,
) -> DateTime<Utc> {
    let back = interval_length * index as i32;
    (received_at - back - offset).trunc_subsecs(0)
}

/// Applies IDM batches to per-meter ring stores.
#[derive(Clone, Debug, Default)]
pub struct Reconciler {
    cfg: ReconcileConfig,
}

impl Reconciler {
    pub fn new(cfg: ReconcileConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.cfg
    }

    /// Reconcile `batch` into `store`.
    ///
    /// Clears every `is_new` flag, then for each batch position either
    /// replaces its slot (empty, or reconstructed time moved beyond the
    /// threshold in either direction) or leaves it untouched. After the call,
    /// `store.is_new(slot)` is true exactly for slots replaced by this batch.
    pub fn update(&self, store: &mut RingStore, batch: &IdmBatch) -> UpdateSummary {
        store.clear_new_flags();

        let offset = transmit_offset(batch.transmit_time_offset);
        let mut summary = UpdateSummary::default();

        for (index, &raw) in batch.intervals.iter().enumerate() {
            let slot = slot_id(batch.interval_count, index);
            let t = interval_time(batch.received_at, index, offset, self.cfg.interval_length);

            let replace = match store.occupied_time(slot) {
                None => true,
                Some(held) => {
                    let diff = held - t;
                    diff > self.cfg.threshold || diff < -self.cfg.threshold
                }
            };

            if replace {
                store.replace(slot, t, raw as f64 * self.cfg.multiplier);
                summary.new_slots += 1;
            } else {
                summary.duplicate_slots += 1;
            }
        }

        summary
    }
}
