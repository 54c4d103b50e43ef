//! `amr-collect checksum`: compute or verify an IDM serial checksum.

use amr_integrity::{serial_checksum_for, validate_serial};
use anyhow::{bail, Result};

/// Accepts decimal or `0x`-prefixed hex.
pub fn parse_u16(raw: &str) -> Result<u16, String> {
    let t = raw.trim();
    let parsed = match t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => t.parse::<u16>(),
    };
    parsed.map_err(|e| format!("invalid 16-bit value '{raw}': {e}"))
}

pub fn checksum(id: u32, crc: Option<u16>) -> Result<()> {
    match crc {
        None => {
            println!("endpoint_id={} serial_checksum=0x{:04X}", id, serial_checksum_for(id));
        }
        Some(crc) => {
            if let Err(e) = validate_serial(id, crc) {
                bail!("CHECKSUM_INVALID {e}");
            }
            println!("endpoint_id={} serial_checksum=0x{:04X} valid=true", id, crc);
        }
    }
    Ok(())
}
