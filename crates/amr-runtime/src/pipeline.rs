use amr_integrity::validate_serial;
use amr_reconcile::{HistoricalRow, MeterRegistry, ReconcileConfig, Reconciler, RecordEmitter};
use amr_schemas::{decode_line, endpoint_tags, FieldValue, IdmBatch, Message, Point, ScmReading};
use amr_store::HistorySource;
use chrono::Duration;
use tracing::{debug, info, warn};

use crate::error::{BootstrapError, IngestError};

/// Field carrying the cumulative reading of a single-reading message.
pub const FIELD_SCM_CONSUMPTION: &str = "consumption";

#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    pub reconcile: ReconcileConfig,
    pub idm_measurement: String,
    pub scm_measurement: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reconcile: ReconcileConfig::default(),
            idm_measurement: "power".to_string(),
            scm_measurement: "power".to_string(),
        }
    }
}

/// Single-reading pass-through: exactly one point per message.
pub fn scm_point(measurement: &str, reading: &ScmReading) -> Point {
    Point {
        measurement: measurement.to_string(),
        tags: endpoint_tags(reading.endpoint_id, reading.endpoint_type),
        fields: Default::default(),
        time: reading.received_at,
    }
    .field(
        FIELD_SCM_CONSUMPTION,
        FieldValue::Float(reading.consumption as f64),
    )
}

/// Decode, validate and reconcile input lines into store-ready points.
///
/// Owns all per-meter state. Single-threaded: one line at a time, in order.
#[derive(Debug)]
pub struct Pipeline {
    registry: MeterRegistry,
    reconciler: Reconciler,
    emitter: RecordEmitter,
    scm_measurement: String,
}

impl Pipeline {
    pub fn new(cfg: PipelineConfig) -> Self {
        Self {
            registry: MeterRegistry::new(),
            reconciler: Reconciler::new(cfg.reconcile),
            emitter: RecordEmitter::new(cfg.idm_measurement),
            scm_measurement: cfg.scm_measurement,
        }
    }

    pub fn registry(&self) -> &MeterRegistry {
        &self.registry
    }

    /// Points to persist for one input line. Blank lines yield no points.
    pub fn handle_line(&mut self, line: &str) -> Result<Vec<Point>, IngestError> {
        if line.trim().is_empty() {
            return Ok(Vec::new());
        }
        let msg = decode_line(line)?;
        self.handle_message(msg)
    }

    pub fn handle_message(&mut self, msg: Message) -> Result<Vec<Point>, IngestError> {
        match msg {
            Message::Idm(batch) => self.handle_idm(&batch),
            Message::Scm(reading) => {
                debug!(endpoint_id = reading.endpoint_id, "scm reading");
                Ok(vec![scm_point(&self.scm_measurement, &reading)])
            }
        }
    }

    fn handle_idm(&mut self, batch: &IdmBatch) -> Result<Vec<Point>, IngestError> {
        validate_serial(batch.endpoint_id, batch.serial_checksum)?;

        let store = self.registry.get_or_create(batch.endpoint_id);
        let summary = self.reconciler.update(store, batch);
        let records = self
            .emitter
            .emit(batch.endpoint_id, batch.endpoint_type, store, batch);

        debug!(
            endpoint_id = batch.endpoint_id,
            interval_count = batch.interval_count,
            new = summary.new_slots,
            duplicate = summary.duplicate_slots,
            "idm batch reconciled"
        );

        Ok(records.iter().map(|r| self.emitter.to_point(r)).collect())
    }

    /// Prime ring stores directly from known-good rows.
    pub fn bootstrap<I>(&mut self, rows: I) -> usize
    where
        I: IntoIterator<Item = HistoricalRow>,
    {
        self.registry.bootstrap(rows)
    }

    /// Warm-start from `source` over the trailing `window`.
    ///
    /// On failure the registry is left untouched (cold start) and the error is
    /// returned for the caller to report; it is never fatal.
    pub async fn preload<H>(&mut self, source: &H, window: Duration) -> Result<usize, BootstrapError>
    where
        H: HistorySource + ?Sized,
    {
        match source.fetch_recent(window).await {
            Ok(rows) => {
                let applied = self.bootstrap(rows);
                info!(
                    rows = applied,
                    meters = self.registry.len(),
                    window_secs = window.num_seconds(),
                    "history preloaded"
                );
                Ok(applied)
            }
            Err(e) => {
                warn!(error = %e, "history preload failed; starting cold");
                Err(BootstrapError(e))
            }
        }
    }
}
