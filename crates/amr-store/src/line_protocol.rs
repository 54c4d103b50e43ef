//! InfluxDB line protocol rendering.
//!
//! `measurement[,tag=value...] field=value[,field=value...] timestamp`
//!
//! Timestamps are whole seconds; the write endpoint is called with
//! `precision=s`. Float fields are written bare, integers with an `i` suffix.

use amr_schemas::{FieldValue, Point};

use crate::sink::StoreError;

fn escape_measurement(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, ',' | ' ') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Tag keys, tag values and field keys share one rule.
fn escape_key(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, ',' | '=' | ' ') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn render_field(v: &FieldValue) -> Result<String, StoreError> {
    match *v {
        FieldValue::Integer(i) => Ok(format!("{i}i")),
        FieldValue::Float(f) if f.is_finite() => Ok(format!("{f}")),
        FieldValue::Float(f) => Err(StoreError::Encode(format!(
            "non-finite float field value {f}"
        ))),
    }
}

/// One point as a single line (no trailing newline).
pub fn encode_point(point: &Point) -> Result<String, StoreError> {
    if point.measurement.is_empty() {
        return Err(StoreError::Encode("empty measurement name".to_string()));
    }
    if point.fields.is_empty() {
        return Err(StoreError::Encode(format!(
            "point for {} has no fields",
            point.measurement
        )));
    }

    let mut line = escape_measurement(&point.measurement);
    for (k, v) in &point.tags {
        // Empty tag values are not representable; the store drops them too.
        if v.is_empty() {
            continue;
        }
        line.push(',');
        line.push_str(&escape_key(k));
        line.push('=');
        line.push_str(&escape_key(v));
    }

    line.push(' ');
    let mut first = true;
    for (k, v) in &point.fields {
        if !first {
            line.push(',');
        }
        first = false;
        line.push_str(&escape_key(k));
        line.push('=');
        line.push_str(&render_field(v)?);
    }

    line.push(' ');
    line.push_str(&point.time.timestamp().to_string());
    Ok(line)
}

/// Newline-separated body for a batch of points.
pub fn encode_points(points: &[Point]) -> Result<String, StoreError> {
    let lines = points
        .iter()
        .map(encode_point)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}
