//! Replay transport for recorded sessions

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::time::{Duration, Interval, interval};
use tracing::{debug, info, trace};

use crate::transport::Transport;
use crate::{MetricError, Result};

/// Emission cadence used when the caller does not pick one.
pub const DEFAULT_REPLAY_HZ: f64 = 5.0;

/// Replay transport that paces frames out of a `.jsonl` recording.
///
/// One frame per line; blank lines are skipped. End of file ends the
/// session cleanly, exactly like a peer closing a live connection.
pub struct ReplayTransport {
    lines: Lines<BufReader<File>>,
    interval: Interval,
    rate_hz: f64,
    path: PathBuf,
    frames: u64,
}

impl ReplayTransport {
    /// Open a recording, pacing frames at `rate_hz` per second.
    ///
    /// The rate is clamped to a sane playback range.
    pub async fn open<P: AsRef<Path>>(path: P, rate_hz: f64) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let rate_hz =
            if rate_hz.is_finite() { rate_hz.clamp(0.1, 120.0) } else { DEFAULT_REPLAY_HZ };

        let file = File::open(&path)
            .await
            .map_err(|err| MetricError::file_error(path.clone(), err))?;

        info!(path = %path.display(), rate_hz, "opened session recording");

        let frame_interval = interval(Duration::from_secs_f64(1.0 / rate_hz));
        Ok(Self {
            lines: BufReader::new(file).lines(),
            interval: frame_interval,
            rate_hz,
            path,
            frames: 0,
        })
    }

    /// Playback cadence in frames per second.
    pub fn rate_hz(&self) -> f64 {
        self.rate_hz
    }
}

#[async_trait::async_trait]
impl Transport for ReplayTransport {
    async fn recv(&mut self) -> Result<Option<String>> {
        loop {
            // Pace before handing out the next frame.
            self.interval.tick().await;

            let line = self
                .lines
                .next_line()
                .await
                .map_err(|err| MetricError::file_error(self.path.clone(), err))?;

            match line {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => {
                    self.frames += 1;
                    trace!(frame = self.frames, "replayed frame");
                    return Ok(Some(line));
                }
                None => {
                    debug!(frames = self.frames, "recording exhausted");
                    return Ok(None);
                }
            }
        }
    }

    async fn send(&mut self, line: &str) -> Result<()> {
        // Recordings have no peer; probes are accepted and discarded.
        trace!(line, "probe ignored by replay transport");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("replay://{}", self.path.display())
    }
}
