//! amr-integrity
//!
//! Message integrity gate for decoded meter messages.
//!
//! Architectural decisions:
//! - IDM batches are accepted only when the serial-number CRC residue matches
//! - One bad byte rejects the whole batch (no partial-interval salvage)
//! - The gate runs before any reconciliation state is touched
//!
//! Pure deterministic logic. No IO.

mod checksum;
mod crc;

pub use checksum::{serial_checksum_for, validate, validate_serial, ChecksumError, IDM_SERIAL_CRC};
pub use crc::Crc16;
