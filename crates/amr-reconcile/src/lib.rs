//! amr-reconcile
//!
//! Reconciliation engine for redundant multi-interval (IDM) meter batches.
//!
//! Architectural decisions:
//! - One fixed 256-slot ring per meter, indexed by absolute interval slot id
//! - All mod-256 slot arithmetic goes through [`slot_id`]
//! - A slot is new when empty or when its reconstructed time moved by more
//!   than the threshold; otherwise the reading is a retransmission
//! - Bootstrap rows prime slots without flagging them new
//! - Scaling and thresholds come from an explicit [`ReconcileConfig`]
//!
//! Deterministic, pure logic. No IO. Callers gate batches through the
//! checksum validator before calling [`Reconciler::update`].

mod emitter;
mod engine;
mod indexer;
mod registry;
mod ring;
mod types;

pub use emitter::RecordEmitter;
pub use engine::{interval_time, transmit_offset, Reconciler, TICK_NANOS};
pub use indexer::slot_id;
pub use registry::MeterRegistry;
pub use ring::{RingStore, RING_SLOTS};
pub use types::*;
