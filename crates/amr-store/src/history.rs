//! Historical query construction and response decoding.
//!
//! Columns are located by name, so extra fields or a different column order
//! in the stored measurement do not shift values. Rows without a usable
//! `interval` (for example single-reading points sharing the measurement)
//! are skipped.

use amr_reconcile::{HistoricalRow, FIELD_CONSUMPTION, FIELD_INTERVAL};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::sink::StoreError;

const COL_TIME: &str = "time";
const COL_ENDPOINT_ID: &str = "endpoint_id";
const COL_ENDPOINT_TYPE: &str = "endpoint_type";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    series: Vec<Series>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Series {
    #[serde(default)]
    name: String,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Render a window as an InfluxQL duration literal (`4h`, `90m`, `45s`).
pub fn duration_literal(window: Duration) -> String {
    let secs = window.num_seconds().max(0);
    if secs > 0 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs > 0 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}

/// `SELECT *` over `measurement` for the trailing `window`.
pub fn preload_query(measurement: &str, window: Duration) -> String {
    let ident = measurement.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        "SELECT * FROM \"{ident}\" WHERE time > now() - {}",
        duration_literal(window)
    )
}

fn as_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_time(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        other => {
            let ns = as_i64(other)?;
            DateTime::from_timestamp(
                ns.div_euclid(1_000_000_000),
                ns.rem_euclid(1_000_000_000) as u32,
            )
        }
    }
}

struct Columns {
    time: usize,
    consumption: usize,
    endpoint_id: usize,
    interval: usize,
    endpoint_type: Option<usize>,
}

impl Columns {
    fn locate(columns: &[String]) -> Option<Self> {
        let idx = |name: &str| columns.iter().position(|c| c == name);
        Some(Self {
            time: idx(COL_TIME)?,
            consumption: idx(FIELD_CONSUMPTION)?,
            endpoint_id: idx(COL_ENDPOINT_ID)?,
            interval: idx(FIELD_INTERVAL)?,
            endpoint_type: idx(COL_ENDPOINT_TYPE),
        })
    }

    fn row(&self, values: &[Value]) -> Option<HistoricalRow> {
        let at = |i: usize| values.get(i);
        let slot = at(self.interval).and_then(as_i64)?;
        let meter_id = at(self.endpoint_id).and_then(as_i64)?;
        Some(HistoricalRow {
            meter_id: u32::try_from(meter_id).ok()?,
            meter_type: self
                .endpoint_type
                .and_then(at)
                .and_then(as_i64)
                .and_then(|t| u8::try_from(t).ok()),
            slot: u8::try_from(slot).ok()?,
            usage: at(self.consumption).and_then(as_f64)?,
            time: at(self.time).and_then(as_time)?,
        })
    }
}

/// Decode a `/query` JSON body into history rows.
///
/// A top-level or statement-level error is returned as [`StoreError::Api`].
/// Series lacking a required column and rows with missing or out-of-range
/// values are skipped.
pub fn parse_history(body: &str) -> Result<Vec<HistoricalRow>, StoreError> {
    let resp: QueryResponse =
        serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))?;

    if let Some(err) = resp.error {
        return Err(StoreError::Api {
            status: None,
            message: err,
        });
    }

    let mut out = Vec::new();
    for result in resp.results {
        if let Some(err) = result.error {
            return Err(StoreError::Api {
                status: None,
                message: err,
            });
        }
        for series in result.series {
            let Some(cols) = Columns::locate(&series.columns) else {
                tracing::debug!(
                    series = %series.name,
                    columns = ?series.columns,
                    "history series lacks required columns"
                );
                continue;
            };
            let total = series.values.len();
            let before = out.len();
            out.extend(series.values.iter().filter_map(|v| cols.row(v)));
            let skipped = total - (out.len() - before);
            if skipped > 0 {
                tracing::debug!(
                    series = %series.name,
                    skipped,
                    "history rows without usable values"
                );
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn query_uses_quoted_measurement_and_hours() {
        assert_eq!(
            preload_query("power", Duration::hours(4)),
            "SELECT * FROM \"power\" WHERE time > now() - 4h"
        );
        assert_eq!(duration_literal(Duration::minutes(90)), "90m");
        assert_eq!(duration_literal(Duration::seconds(45)), "45s");
    }

    #[test]
    fn columns_are_mapped_by_name() {
        let body = r#"{"results":[{"statement_id":0,"series":[{"name":"power",
            "columns":["time","interval","endpoint_type","consumption","endpoint_id"],
            "values":[[1577836800000000000,10,"7",50,"12345"]]}]}]}"#;
        let rows = parse_history(body).unwrap();
        assert_eq!(
            rows,
            vec![HistoricalRow {
                meter_id: 12345,
                meter_type: Some(7),
                slot: 10,
                usage: 50.0,
                time: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            }]
        );
    }

    #[test]
    fn rows_without_interval_are_skipped() {
        // Single-reading points share the measurement and carry no slot.
        let body = r#"{"results":[{"series":[{"name":"power",
            "columns":["time","consumption","endpoint_id","endpoint_type","interval"],
            "values":[
                [1577836800000000000,50,"1","7",null],
                [1577836800000000000,50,"1","7",300],
                [1577836800000000000,20,"1","7",3]
            ]}]}]}"#;
        let rows = parse_history(body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].slot, 3);
    }

    #[test]
    fn empty_result_is_ok() {
        assert!(parse_history(r#"{"results":[{"statement_id":0}]}"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn statement_error_is_api_error() {
        let err = parse_history(r#"{"results":[{"error":"database not found: rtlamr"}]}"#)
            .unwrap_err();
        assert!(matches!(err, StoreError::Api { status: None, .. }));
    }

    #[test]
    fn garbage_is_decode_error() {
        assert!(matches!(parse_history("<html>"), Err(StoreError::Decode(_))));
    }
}
