//! amr-store
//!
//! Boundary to the external time-series store.
//!
//! Owns the [`PointSink`] / [`HistorySource`] traits and the InfluxDB 1.x
//! HTTP implementation of both. Callers (the CLI) build the client from
//! resolved configuration; nothing here reads the environment.

pub mod history;
pub mod line_protocol;
pub mod sink;

pub use history::{parse_history, preload_query};
pub use line_protocol::{encode_point, encode_points};
pub use sink::{HistorySource, PointSink, StoreError};

use amr_reconcile::HistoricalRow;
use amr_schemas::Point;
use chrono::Duration;

/// InfluxDB 1.x HTTP client (`/write` and `/query`).
///
/// Credentials are passed in by the caller; never log them.
#[derive(Clone)]
pub struct InfluxClient {
    http: reqwest::Client,
    base_url: String,
    database: String,
    username: String,
    password: String,
    measurement: String,
}

impl std::fmt::Debug for InfluxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfluxClient")
            .field("base_url", &self.base_url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("measurement", &self.measurement)
            .finish()
    }
}

impl InfluxClient {
    /// `measurement` is the series read back by [`HistorySource::fetch_recent`].
    pub fn new(
        base_url: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        measurement: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            database: database.into(),
            username: username.into(),
            password: password.into(),
            measurement: measurement.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn transport(e: reqwest::Error) -> StoreError {
    StoreError::Transport(e.to_string())
}

/// Error payload shape shared by `/write` and `/query`.
#[derive(serde::Deserialize)]
struct ErrorBody {
    error: String,
}

fn api_error(status: reqwest::StatusCode, body: &str) -> StoreError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string());
    StoreError::Api {
        status: Some(status.as_u16()),
        message,
    }
}

#[async_trait::async_trait]
impl PointSink for InfluxClient {
    async fn write_points(&self, points: &[Point]) -> Result<(), StoreError> {
        if points.is_empty() {
            return Ok(());
        }
        let body = encode_points(points)?;

        let resp = self
            .http
            .post(self.endpoint("write"))
            .query(&[("db", self.database.as_str()), ("precision", "s")])
            .basic_auth(&self.username, Some(&self.password))
            .body(body)
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let text = resp.text().await.unwrap_or_default();
        Err(api_error(status, &text))
    }
}

#[async_trait::async_trait]
impl HistorySource for InfluxClient {
    async fn fetch_recent(&self, window: Duration) -> Result<Vec<HistoricalRow>, StoreError> {
        let q = preload_query(&self.measurement, window);

        let resp = self
            .http
            .get(self.endpoint("query"))
            .query(&[
                ("db", self.database.as_str()),
                ("q", q.as_str()),
                ("epoch", "ns"),
            ])
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        let text = resp.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(api_error(status, &text));
        }
        parse_history(&text)
    }
}
