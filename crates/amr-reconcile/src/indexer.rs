/// Absolute slot id of the reading at `index` within a batch whose most
/// recent interval is `interval_count`.
///
/// `(interval_count - index) mod 256`, wrapping when `index > interval_count`.
pub fn slot_id(interval_count: u8, index: usize) -> u8 {
    interval_count.wrapping_sub((index % 256) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_zero_is_interval_count() {
        assert_eq!(slot_id(10, 0), 10);
        assert_eq!(slot_id(0, 0), 0);
        assert_eq!(slot_id(255, 0), 255);
    }

    #[test]
    fn wraps_below_zero() {
        assert_eq!(slot_id(2, 5), 253);
        assert_eq!(slot_id(0, 1), 255);
    }

    #[test]
    fn full_revolution_returns_to_same_slot() {
        assert_eq!(slot_id(7, 256), 7);
        assert_eq!(slot_id(7, 512 + 3), 4);
    }
}
