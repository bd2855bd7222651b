//! Live filter-stream listener.
//!
//! Connects to `statuses/filter`, appends each raw record to an append-only
//! file, and flushes before touching the next record. Crash-tolerant but not
//! crash-consistent: a write failure mid-append loses at most one record.
//!
//! The listener has two states. It runs until the service answers HTTP 420
//! (the stop signal), the caller cancels through the shutdown channel, or the
//! connection goes away. Per-record write failures are logged and skipped;
//! they never stop the listener.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::oauth::OauthSigner;

/// HTTP status the streaming endpoint uses to demand a full stop.
const ENHANCE_YOUR_CALM: u16 = 420;

/// Why the listener left its running state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The service answered 420; the caller must not reconnect.
    RateLimited,
    /// The shutdown channel fired (or its sender went away).
    Cancelled,
    /// The connection ended or failed mid-stream.
    Disconnected(String),
}

#[derive(Debug)]
pub struct StreamSummary {
    pub records_written: u64,
    pub write_failures: u64,
    pub stop: StopReason,
}

pub struct StreamListener {
    http: reqwest::Client,
    signer: OauthSigner,
    stream_url: String,
    out_path: PathBuf,
}

impl StreamListener {
    pub fn new(config: &Config, out_path: PathBuf) -> Result<Self> {
        let http = reqwest::Client::builder()
            // Long read timeout: the stream idles between records.
            .read_timeout(Duration::from_secs(90))
            .user_agent(concat!("tweetlens/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            signer: OauthSigner::new(&config.credentials),
            stream_url: config.stream_url.trim_end_matches('/').to_string(),
            out_path,
        })
    }

    /// Block on the live stream, appending every record to the output file.
    /// Returns a summary once stopped; only connect-time failures other than
    /// rate limiting are errors.
    pub async fn run(
        &self,
        tags: &[String],
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<StreamSummary> {
        let url = format!("{}/statuses/filter.json", self.stream_url);
        let track = tags.join(",");
        let params = vec![("track".to_string(), track.clone())];
        let auth_header = self.signer.sign("POST", &url, &params)?;

        info!(%url, track = %track, "connecting to filter stream");
        let response = self
            .http
            .post(&url)
            .header("Authorization", auth_header)
            .form(&[("track", track.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let stop = connect_refusal(status.as_u16(), body)?;
            info!(?stop, "stream refused, stopping");
            return Ok(StreamSummary {
                records_written: 0,
                write_failures: 0,
                stop,
            });
        }

        let mut sink = RecordSink::open(&self.out_path)?;
        let mut body = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut records_written = 0u64;
        let mut write_failures = 0u64;

        let stop = loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    // A dropped sender means nobody can cancel us later;
                    // treat it like a cancellation rather than running wild.
                    if changed.is_err() || *shutdown.borrow() {
                        info!("shutdown requested, stopping stream");
                        break StopReason::Cancelled;
                    }
                }
                chunk = body.next() => match chunk {
                    None => {
                        info!("stream closed by the service");
                        break StopReason::Disconnected("stream ended".into());
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "stream transport error");
                        break StopReason::Disconnected(e.to_string());
                    }
                    Some(Ok(bytes)) => {
                        buffer.extend_from_slice(&bytes);
                        for record in drain_records(&mut buffer) {
                            match sink.append(&record) {
                                Ok(()) => {
                                    records_written += 1;
                                    debug!(bytes = record.len(), "record appended");
                                }
                                Err(e) => {
                                    // Skip the record, stay running.
                                    write_failures += 1;
                                    warn!(error = %e, "dropping record, append failed");
                                }
                            }
                        }
                    }
                }
            }
        };

        info!(records_written, write_failures, ?stop, "stream stopped");
        Ok(StreamSummary {
            records_written,
            write_failures,
            stop,
        })
    }
}

/// Decide what a non-success connect status means: 420 stops the listener
/// cleanly (the service's stop signal, never reconnected), anything else is
/// a plain error for the caller.
fn connect_refusal(status: u16, body: String) -> Result<StopReason> {
    if status == ENHANCE_YOUR_CALM {
        Ok(StopReason::RateLimited)
    } else {
        Err(Error::from_status(status, body))
    }
}

/// Append-only sink, one flush per record so a crash loses at most the
/// record in flight.
struct RecordSink {
    file: File,
}

impl RecordSink {
    fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::Write(format!("cannot open {}: {e}", path.display())))?;
        Ok(Self { file })
    }

    fn append(&mut self, record: &[u8]) -> std::io::Result<()> {
        self.file.write_all(record)?;
        self.file.write_all(b"\n")?;
        self.file.flush()
    }
}

/// Pull complete newline-terminated records out of the buffer, leaving any
/// trailing partial record in place. Blank lines are keep-alives and are
/// dropped.
fn drain_records(buffer: &mut Vec<u8>) -> Vec<Vec<u8>> {
    let mut records = Vec::new();
    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let mut line: Vec<u8> = buffer.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if !line.is_empty() {
            records.push(line);
        }
    }
    records
}
