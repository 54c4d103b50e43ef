use std::fmt;

use crate::crc::Crc16;

/// CRC used by IDM messages to protect the endpoint serial number.
pub const IDM_SERIAL_CRC: Crc16 = Crc16::new("CCITT", 0xFFFF, 0x1021, 0x1D0F);

/// Serial-number checksum failure. Carries the offending pair for logging.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChecksumError {
    pub endpoint_id: u32,
    pub serial_checksum: u16,
    /// Register value actually produced (expected: [`IDM_SERIAL_CRC`] residue).
    pub residue: u16,
}

impl fmt::Display for ChecksumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "serial checksum mismatch: endpoint_id={} crc=0x{:04X} residue=0x{:04X} expected=0x{:04X}",
            self.endpoint_id, self.serial_checksum, self.residue, IDM_SERIAL_CRC.residue
        )
    }
}

impl std::error::Error for ChecksumError {}

fn serial_buffer(endpoint_id: u32, serial_checksum: u16) -> [u8; 6] {
    let mut buf = [0u8; 6];
    buf[..4].copy_from_slice(&endpoint_id.to_be_bytes());
    buf[4..].copy_from_slice(&serial_checksum.to_be_bytes());
    buf
}

/// Returns `true` iff `serial_checksum` is the valid check value for `endpoint_id`.
///
/// The 6-byte big-endian buffer `endpoint_id ++ serial_checksum` must leave the
/// CCITT register (poly `0x1021`, init `0xFFFF`) at residue `0x1D0F`.
pub fn validate(endpoint_id: u32, serial_checksum: u16) -> bool {
    IDM_SERIAL_CRC.has_residue(&serial_buffer(endpoint_id, serial_checksum))
}

/// Same check as [`validate`], returning the evidence on failure.
pub fn validate_serial(endpoint_id: u32, serial_checksum: u16) -> Result<(), ChecksumError> {
    let residue = IDM_SERIAL_CRC.checksum(&serial_buffer(endpoint_id, serial_checksum));
    if residue == IDM_SERIAL_CRC.residue {
        Ok(())
    } else {
        Err(ChecksumError {
            endpoint_id,
            serial_checksum,
            residue,
        })
    }
}

/// The unique serial checksum that validates for `endpoint_id`.
///
/// Meters transmit the ones' complement of the register over the id bytes;
/// appending it drives the register to the `0x1D0F` residue.
pub fn serial_checksum_for(endpoint_id: u32) -> u16 {
    !IDM_SERIAL_CRC.checksum(&endpoint_id.to_be_bytes())
}
