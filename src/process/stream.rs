// src/process/stream.rs

//! Output stream workers.
//!
//! One worker runs per output pipe of a running leaf. It reads
//! newline-delimited output, derives the display and match forms of each
//! line, and pushes:
//! - a [`LogEntry`] into the bounded log queue (dropped when the queue is
//!   full, so a slow consumer never stalls the pipe);
//! - a `Ready` transition into the status queue whenever the match form hits
//!   the readiness pattern.

use regex::Regex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::process::sanitize;
use crate::types::{LogEntry, LogLevel, Status};

/// Where a stream worker delivers its results.
#[derive(Debug, Clone)]
pub struct StreamSinks {
    pub log_tx: mpsc::Sender<LogEntry>,
    pub status_tx: mpsc::Sender<Status>,
    pub ready_pattern: Option<Regex>,
}

/// Counters reported when a stream reaches EOF.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub lines: usize,
    pub dropped: usize,
    pub ready_matches: usize,
}

/// Spawn a background worker draining `reader` until EOF.
pub fn spawn_stream_worker<R>(
    process: String,
    reader: R,
    level: LogLevel,
    sinks: StreamSinks,
) -> JoinHandle<StreamStats>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move { stream_lines(&process, reader, level, &sinks).await })
}

/// Read `reader` line by line until EOF, feeding `sinks`.
///
/// Never awaits on the queues: a full log queue drops the new line, a full
/// status queue drops the duplicate readiness notification. A closed queue
/// (the leaf moved on to a newer run) keeps the loop reading and discarding
/// so the child can never block on a full pipe.
pub async fn stream_lines<R>(
    process: &str,
    reader: R,
    level: LogLevel,
    sinks: &StreamSinks,
) -> StreamStats
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut stats = StreamStats::default();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(process, error = %e, "error reading output stream");
                break;
            }
        }

        let raw = String::from_utf8_lossy(&buf);
        let raw = raw.trim_end_matches(['\n', '\r']);
        stats.lines += 1;

        if let Some(re) = &sinks.ready_pattern {
            if re.is_match(&sanitize::match_form(raw)) {
                stats.ready_matches += 1;
                match sinks.status_tx.try_send(Status::Ready) {
                    Ok(()) => debug!(process, "output matched readiness pattern"),
                    Err(TrySendError::Full(_)) => {
                        trace!(process, "status queue full; duplicate readiness dropped")
                    }
                    Err(TrySendError::Closed(_)) => {}
                }
            }
        }

        let entry = LogEntry {
            message: sanitize::display_form(raw).into_owned(),
            level,
        };

        match sinks.log_tx.try_send(entry) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(_)) => {
                stats.dropped += 1;
                trace!(process, "log queue full; dropping line");
            }
        }
    }

    debug!(
        process,
        ?level,
        lines = stats.lines,
        dropped = stats.dropped,
        "output stream ended"
    );

    stats
}
