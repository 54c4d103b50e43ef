use amr_store::PointSink;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::error::IngestError;
use crate::pipeline::Pipeline;

/// Counters for one pass over the input stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoopStats {
    /// Lines read, blank ones included.
    pub lines: u64,
    /// Messages decoded and validated (they may still have emitted nothing).
    pub accepted: u64,
    pub points_written: u64,
    pub decode_errors: u64,
    pub checksum_errors: u64,
    pub unknown_types: u64,
    pub write_errors: u64,
}

impl LoopStats {
    fn record(&mut self, err: &IngestError) {
        match err {
            IngestError::Decode(_) => self.decode_errors += 1,
            IngestError::Checksum(_) => self.checksum_errors += 1,
            IngestError::UnknownType(_) => self.unknown_types += 1,
            IngestError::Write(_) => self.write_errors += 1,
        }
    }
}

/// Pull lines from `reader` until end of input, writing emitted points to `sink`.
///
/// Strictly sequential: a line is fully reconciled and written before the
/// next one is read. Every [`IngestError`] is logged, counted and skipped;
/// a failed write drops that line's points. Only a read error on the input
/// itself ends the loop early.
pub async fn run_loop<R, S>(
    mut reader: R,
    pipeline: &mut Pipeline,
    sink: &S,
) -> std::io::Result<LoopStats>
where
    R: AsyncBufRead + Unpin,
    S: PointSink + ?Sized,
{
    let mut stats = LoopStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        stats.lines += 1;

        let outcome = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => ingest(line, pipeline, sink, &mut stats).await,
            Err(e) => Err(IngestError::Decode(amr_schemas::DecodeError::Malformed(
                e.to_string(),
            ))),
        };

        if let Err(e) = outcome {
            warn!(line = stats.lines, error = %e, "input line skipped");
            stats.record(&e);
        }
    }

    Ok(stats)
}

async fn ingest<S>(
    line: &str,
    pipeline: &mut Pipeline,
    sink: &S,
    stats: &mut LoopStats,
) -> Result<(), IngestError>
where
    S: PointSink + ?Sized,
{
    let points = pipeline.handle_line(line)?;
    stats.accepted += 1;

    if points.is_empty() {
        return Ok(());
    }
    sink.write_points(&points).await?;
    stats.points_written += points.len() as u64;
    debug!(points = points.len(), "points written");
    Ok(())
}
