use std::fmt;

use amr_integrity::ChecksumError;
use amr_schemas::DecodeError;
use amr_store::StoreError;

/// Why one input line produced no stored points.
///
/// Every variant is recoverable: the line is skipped and the loop moves on.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestError {
    /// Not a valid envelope, or the payload does not match its type.
    Decode(DecodeError),
    /// Serial checksum residue mismatch; the whole batch is dropped.
    Checksum(ChecksumError),
    /// Envelope discriminator is not a supported message family.
    UnknownType(String),
    /// The sink rejected the points; they are not retried.
    Write(StoreError),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Decode(e) => write!(f, "decode: {e}"),
            IngestError::Checksum(e) => write!(f, "checksum: {e}"),
            IngestError::UnknownType(kind) => write!(f, "unknown message type '{kind}'"),
            IngestError::Write(e) => write!(f, "write: {e}"),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::Decode(e) => Some(e),
            IngestError::Checksum(e) => Some(e),
            IngestError::UnknownType(_) => None,
            IngestError::Write(e) => Some(e),
        }
    }
}

impl From<DecodeError> for IngestError {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::UnknownType(kind) => IngestError::UnknownType(kind),
            other => IngestError::Decode(other),
        }
    }
}

impl From<ChecksumError> for IngestError {
    fn from(e: ChecksumError) -> Self {
        IngestError::Checksum(e)
    }
}

impl From<StoreError> for IngestError {
    fn from(e: StoreError) -> Self {
        IngestError::Write(e)
    }
}

/// History could not be read at startup. The registry starts cold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapError(pub StoreError);

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "history preload failed: {}", self.0)
    }
}

impl std::error::Error for BootstrapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}
