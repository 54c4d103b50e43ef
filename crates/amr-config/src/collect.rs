//! Collector settings resolution.
//!
//! # Contract
//! - YAML stores only the env var NAME of the InfluxDB password
//!   (`/influxdb/password_env`), never the value.
//! - Callers resolve once at startup via [`resolve_collect_config`] and pass
//!   the result into constructors; nothing else reads `std::env`.
//! - Precedence per setting: environment variable, then YAML, then default.
//! - `Debug` on [`InfluxConfig`] redacts the password.
//! - Error messages name the missing variable, never a value.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde_json::Value;

pub const ENV_HOSTNAME: &str = "COLLECT_INFLUXDB_HOSTNAME";
pub const ENV_PORT: &str = "COLLECT_INFLUXDB_PORT";
pub const ENV_USER: &str = "COLLECT_INFLUXDB_USER";
pub const ENV_PASS_DEFAULT: &str = "COLLECT_INFLUXDB_PASS";
pub const ENV_DATABASE: &str = "COLLECT_INFLUXDB_DATABASE";
pub const ENV_IDM_MEASUREMENT: &str = "COLLECT_INFLUXDB_IDM_MEASUREMENT_NAME";
pub const ENV_SCM_MEASUREMENT: &str = "COLLECT_INFLUXDB_SCM_MEASUREMENT_NAME";
pub const ENV_MULTIPLIER: &str = "COLLECT_MULTIPLIER";
pub const ENV_PRELOAD_WINDOW_HOURS: &str = "COLLECT_PRELOAD_WINDOW_HOURS";

pub const DEFAULT_PORT: u16 = 8086;
pub const DEFAULT_DATABASE: &str = "rtlamr";
pub const DEFAULT_MEASUREMENT: &str = "power";
pub const DEFAULT_MULTIPLIER: f64 = 10.0;
pub const DEFAULT_THRESHOLD_SECS: u32 = 30;
pub const DEFAULT_PRELOAD_WINDOW_HOURS: u32 = 4;

// ---------------------------------------------------------------------------
// Environment access
// ---------------------------------------------------------------------------

/// Source of environment variables.
///
/// Implementations return `None` for unset or blank variables.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        match std::env::var(name) {
            Ok(v) if !v.trim().is_empty() => Some(v),
            _ => None,
        }
    }
}

/// Fixed variable set; lets tests resolve config without touching the process env.
#[derive(Debug, Clone, Default)]
pub struct MapEnv(pub BTreeMap<String, String>);

impl MapEnv {
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl EnvSource for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.0
            .get(name)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// InfluxDB connection settings. **Password is redacted in `Debug` output.**
#[derive(Clone, PartialEq)]
pub struct InfluxConfig {
    pub hostname: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl InfluxConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.hostname, self.port)
    }
}

impl std::fmt::Debug for InfluxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfluxConfig")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("database", &self.database)
            .finish()
    }
}

/// Everything the collector needs at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectConfig {
    pub influx: InfluxConfig,
    pub idm_measurement: String,
    pub scm_measurement: String,
    /// Factor applied to raw IDM interval deltas.
    pub multiplier: f64,
    /// Inclusive drift tolerance when matching retransmitted intervals.
    pub threshold_secs: u32,
    /// How far back history is read at startup.
    pub preload_window_hours: u32,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn read_str_at(config: &Value, pointer: &str) -> Option<String> {
    let s = config.pointer(pointer)?.as_str()?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Env var first, then the YAML string at `pointer`.
fn lookup_str(config: &Value, env: &dyn EnvSource, var: &str, pointer: &str) -> Option<String> {
    env.var(var)
        .map(|v| v.trim().to_string())
        .or_else(|| read_str_at(config, pointer))
}

fn require_str(config: &Value, env: &dyn EnvSource, var: &str, pointer: &str) -> Result<String> {
    match lookup_str(config, env, var, pointer) {
        Some(v) => Ok(v),
        None => bail!(
            "CONFIG_MISSING: required setting not provided; set env var '{}' or yaml '{}'",
            var,
            pointer
        ),
    }
}

/// Raw text of a numeric setting: env var, else YAML number or string.
fn lookup_number_text(
    config: &Value,
    env: &dyn EnvSource,
    var: Option<&str>,
    pointer: &str,
) -> Option<(String, String)> {
    if let Some(var) = var {
        if let Some(v) = env.var(var) {
            return Some((v.trim().to_string(), format!("env var '{var}'")));
        }
    }
    match config.pointer(pointer)? {
        Value::Number(n) => Some((n.to_string(), format!("yaml '{pointer}'"))),
        Value::String(s) if !s.trim().is_empty() => {
            Some((s.trim().to_string(), format!("yaml '{pointer}'")))
        }
        Value::Null => None,
        other => Some((other.to_string(), format!("yaml '{pointer}'"))),
    }
}

fn parse_number<T: std::str::FromStr>(
    config: &Value,
    env: &dyn EnvSource,
    var: Option<&str>,
    pointer: &str,
    default: T,
) -> Result<T> {
    let Some((text, origin)) = lookup_number_text(config, env, var, pointer) else {
        return Ok(default);
    };
    match text.parse::<T>() {
        Ok(v) => Ok(v),
        Err(_) => bail!("CONFIG_INVALID: {origin} is not a valid number: {text:?}"),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Resolve the effective collector settings from layered config plus environment.
///
/// # Errors
/// - `CONFIG_MISSING` naming the variable when hostname, username or password
///   is absent.
/// - `CONFIG_INVALID` when a numeric setting is present but unparseable, or
///   the multiplier is not finite.
pub fn resolve_collect_config(config_json: &Value, env: &dyn EnvSource) -> Result<CollectConfig> {
    let hostname = require_str(config_json, env, ENV_HOSTNAME, "/influxdb/hostname")?;
    let username = require_str(config_json, env, ENV_USER, "/influxdb/username")?;

    let password_var = read_str_at(config_json, "/influxdb/password_env")
        .unwrap_or_else(|| ENV_PASS_DEFAULT.to_string());
    let password = match env.var(&password_var) {
        Some(v) => v,
        None => bail!(
            "CONFIG_MISSING: required env var '{}' (influxdb password) is not set or empty",
            password_var
        ),
    };

    let port = parse_number(config_json, env, Some(ENV_PORT), "/influxdb/port", DEFAULT_PORT)?;
    let database = lookup_str(config_json, env, ENV_DATABASE, "/influxdb/database")
        .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

    let idm_measurement = lookup_str(config_json, env, ENV_IDM_MEASUREMENT, "/measurements/idm")
        .unwrap_or_else(|| DEFAULT_MEASUREMENT.to_string());
    let scm_measurement = lookup_str(config_json, env, ENV_SCM_MEASUREMENT, "/measurements/scm")
        .unwrap_or_else(|| DEFAULT_MEASUREMENT.to_string());

    let multiplier: f64 = parse_number(
        config_json,
        env,
        Some(ENV_MULTIPLIER),
        "/reconcile/multiplier",
        DEFAULT_MULTIPLIER,
    )?;
    if !multiplier.is_finite() {
        bail!("CONFIG_INVALID: multiplier must be finite, got {multiplier}");
    }

    let threshold_secs = parse_number(
        config_json,
        env,
        None,
        "/reconcile/threshold_secs",
        DEFAULT_THRESHOLD_SECS,
    )?;
    let preload_window_hours = parse_number(
        config_json,
        env,
        Some(ENV_PRELOAD_WINDOW_HOURS),
        "/preload/window_hours",
        DEFAULT_PRELOAD_WINDOW_HOURS,
    )?;

    Ok(CollectConfig {
        influx: InfluxConfig {
            hostname,
            port,
            username,
            password,
            database,
        },
        idm_measurement,
        scm_measurement,
        multiplier,
        threshold_secs,
        preload_window_hours,
    })
}
