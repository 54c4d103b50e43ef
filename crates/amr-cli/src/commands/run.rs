//! `amr-collect run`: preload history, then ingest stdin until EOF.

use amr_config::{resolve_collect_config, CollectConfig, ProcessEnv};
use amr_reconcile::ReconcileConfig;
use amr_runtime::{run_loop, Pipeline, PipelineConfig};
use amr_store::InfluxClient;
use anyhow::{Context, Result};
use chrono::Duration;
use tokio::io::BufReader;
use tracing::info;

use super::{load_config, warn_unused_keys};

pub fn pipeline_config(cfg: &CollectConfig) -> PipelineConfig {
    PipelineConfig {
        reconcile: ReconcileConfig {
            multiplier: cfg.multiplier,
            threshold: Duration::seconds(i64::from(cfg.threshold_secs)),
            ..ReconcileConfig::default()
        },
        idm_measurement: cfg.idm_measurement.clone(),
        scm_measurement: cfg.scm_measurement.clone(),
    }
}

pub async fn run_collect(config_paths: Vec<String>) -> Result<()> {
    let loaded = load_config(&config_paths)?;
    warn_unused_keys(&loaded)?;
    let cfg = resolve_collect_config(&loaded.config_json, &ProcessEnv)?;

    info!(
        config_hash = %loaded.config_hash,
        influx = ?cfg.influx,
        idm_measurement = %cfg.idm_measurement,
        scm_measurement = %cfg.scm_measurement,
        multiplier = cfg.multiplier,
        "collector starting"
    );

    let client = InfluxClient::new(
        cfg.influx.base_url(),
        cfg.influx.database.clone(),
        cfg.influx.username.clone(),
        cfg.influx.password.clone(),
        cfg.idm_measurement.clone(),
    );

    let mut pipeline = Pipeline::new(pipeline_config(&cfg));
    // A failed preload is logged by the pipeline; continue cold.
    let _ = pipeline
        .preload(&client, Duration::hours(i64::from(cfg.preload_window_hours)))
        .await;

    let stdin = BufReader::new(tokio::io::stdin());
    let stats = run_loop(stdin, &mut pipeline, &client)
        .await
        .context("failed reading stdin")?;

    info!(
        lines = stats.lines,
        accepted = stats.accepted,
        points_written = stats.points_written,
        decode_errors = stats.decode_errors,
        checksum_errors = stats.checksum_errors,
        unknown_types = stats.unknown_types,
        write_errors = stats.write_errors,
        meters = pipeline.registry().len(),
        "input exhausted"
    );
    Ok(())
}
