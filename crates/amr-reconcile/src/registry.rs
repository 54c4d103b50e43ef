use std::collections::BTreeMap;

use crate::ring::RingStore;
use crate::HistoricalRow;

/// One [`RingStore`] per meter identity, owned for the process lifetime.
#[derive(Clone, Debug, Default)]
pub struct MeterRegistry {
    meters: BTreeMap<u32, RingStore>,
}

impl MeterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing store for `id`, or a freshly inserted empty one.
    pub fn get_or_create(&mut self, id: u32) -> &mut RingStore {
        self.meters.entry(id).or_default()
    }

    pub fn get(&self, id: u32) -> Option<&RingStore> {
        self.meters.get(&id)
    }

    pub fn len(&self) -> usize {
        self.meters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meters.is_empty()
    }

    pub fn meter_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.meters.keys().copied()
    }

    /// Prime stores from known-good history.
    ///
    /// Sets time and usage directly; never flags a slot new and never runs
    /// the reconciliation engine. Later rows for the same slot win.
    /// Returns the number of rows applied.
    pub fn bootstrap<I>(&mut self, rows: I) -> usize
    where
        I: IntoIterator<Item = HistoricalRow>,
    {
        let mut applied = 0;
        for row in rows {
            self.get_or_create(row.meter_id)
                .preload(row.slot, row.time, row.usage);
            applied += 1;
        }
        applied
    }
}
