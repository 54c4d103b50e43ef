use amr_integrity::*;

const IDS: &[u32] = &[0, 1, 12345, 1_550_000_000, 0xDEAD_BEEF, u32::MAX];

#[test]
fn scenario_flipping_any_endpoint_id_bit_rejects() {
    for &id in IDS {
        let crc = serial_checksum_for(id);
        assert!(validate(id, crc), "baseline pair must validate for id={id}");

        for bit in 0..32 {
            let flipped = id ^ (1u32 << bit);
            assert!(
                !validate(flipped, crc),
                "id={id} bit={bit} flip must be rejected"
            );
        }
    }
}

#[test]
fn scenario_flipping_any_checksum_bit_rejects() {
    for &id in IDS {
        let crc = serial_checksum_for(id);
        for bit in 0..16 {
            let flipped = crc ^ (1u16 << bit);
            assert!(
                !validate(id, flipped),
                "id={id} crc bit={bit} flip must be rejected"
            );
            assert!(validate_serial(id, flipped).is_err());
        }
    }
}

#[test]
fn scenario_exactly_one_checksum_validates_per_id() {
    let id = 12345;
    let valid: Vec<u16> = (0..=u16::MAX).filter(|c| validate(id, *c)).collect();
    assert_eq!(valid, vec![serial_checksum_for(id)]);
}
