//! amr-runtime
//!
//! Wires decoding, checksum validation, reconciliation and emission into a
//! sequential ingest loop over newline-delimited input.
//!
//! Architectural decisions:
//! - One [`Pipeline`] owns every ring store; no locks, no shared state.
//! - Per-line failures are values ([`IngestError`]), logged and counted by
//!   [`run_loop`], never fatal.
//! - History preload failure degrades to a cold start ([`BootstrapError`]).
//! - The store is reached only through the `amr-store` traits, so tests run
//!   against in-memory doubles.

mod driver;
mod error;
mod pipeline;

pub use driver::{run_loop, LoopStats};
pub use error::{BootstrapError, IngestError};
pub use pipeline::{scm_point, Pipeline, PipelineConfig, FIELD_SCM_CONSUMPTION};
