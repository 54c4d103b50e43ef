use chrono::{DateTime, Utc};

/// Number of interval slots tracked per meter.
pub const RING_SLOTS: usize = 256;

/// Most recent reading per interval slot for one meter.
///
/// `is_new` flags are scoped to a single reconciliation call; they are
/// cleared at the start of every [`crate::Reconciler::update`].
#[derive(Clone, Debug, PartialEq)]
pub struct RingStore {
    occupied_time: [Option<DateTime<Utc>>; RING_SLOTS],
    usage: [f64; RING_SLOTS],
    is_new: [bool; RING_SLOTS],
}

impl Default for RingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RingStore {
    /// All slots empty, all usage zero.
    pub fn new() -> Self {
        Self {
            occupied_time: [None; RING_SLOTS],
            usage: [0.0; RING_SLOTS],
            is_new: [false; RING_SLOTS],
        }
    }

    pub fn occupied_time(&self, slot: u8) -> Option<DateTime<Utc>> {
        self.occupied_time[slot as usize]
    }

    pub fn usage(&self, slot: u8) -> f64 {
        self.usage[slot as usize]
    }

    pub fn is_new(&self, slot: u8) -> bool {
        self.is_new[slot as usize]
    }

    pub fn is_empty_slot(&self, slot: u8) -> bool {
        self.occupied_time[slot as usize].is_none()
    }

    /// Number of slots currently holding a reading.
    pub fn occupied_slots(&self) -> usize {
        self.occupied_time.iter().filter(|t| t.is_some()).count()
    }

    /// Slots flagged new by the last reconciliation call, ascending.
    pub fn new_slots(&self) -> impl Iterator<Item = u8> + '_ {
        self.is_new
            .iter()
            .enumerate()
            .filter(|(_, n)| **n)
            .map(|(slot, _)| slot as u8)
    }

    pub(crate) fn clear_new_flags(&mut self) {
        self.is_new = [false; RING_SLOTS];
    }

    /// Replace a slot with a newly observed reading and flag it.
    pub(crate) fn replace(&mut self, slot: u8, time: DateTime<Utc>, usage: f64) {
        let i = slot as usize;
        self.is_new[i] = true;
        self.occupied_time[i] = Some(time);
        self.usage[i] = usage;
    }

    /// Prime a slot from known-good history. Never flags the slot new.
    pub(crate) fn preload(&mut self, slot: u8, time: DateTime<Utc>, usage: f64) {
        let i = slot as usize;
        self.occupied_time[i] = Some(time);
        self.usage[i] = usage;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_store_is_empty() {
        let s = RingStore::new();
        assert_eq!(s.occupied_slots(), 0);
        assert!((0..=255u8).all(|i| s.is_empty_slot(i) && !s.is_new(i) && s.usage(i) == 0.0));
        assert_eq!(s.new_slots().count(), 0);
    }

    #[test]
    fn replace_flags_and_preload_does_not() {
        let t = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut s = RingStore::new();
        s.replace(3, t, 1.5);
        s.preload(200, t, 2.5);

        assert!(s.is_new(3));
        assert!(!s.is_new(200));
        assert_eq!(s.occupied_time(200), Some(t));
        assert_eq!(s.usage(200), 2.5);
        assert_eq!(s.new_slots().collect::<Vec<_>>(), vec![3]);

        s.clear_new_flags();
        assert_eq!(s.new_slots().count(), 0);
        assert_eq!(s.occupied_slots(), 2);
    }
}
