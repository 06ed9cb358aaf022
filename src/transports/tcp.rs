//! Live TCP transport

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::{debug, info};

use crate::transport::Transport;
use crate::{MetricError, Result};

/// How long to wait for the peer before giving up on connect.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Live transport session: newline-delimited frames over TCP.
pub struct TcpTransport {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    peer: String,
    line: String,
}

impl TcpTransport {
    /// Connect to a measurement source at `host:port`.
    pub async fn connect(addr: &str) -> Result<Self> {
        info!(addr, "connecting to metric source");

        let stream = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| MetricError::Timeout { duration: CONNECT_TIMEOUT })?
            .map_err(|err| {
                MetricError::transport_with_source(
                    format!("failed to connect to {addr}"),
                    Box::new(err),
                )
            })?;

        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| addr.to_string());
        debug!(peer, "session established");

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            peer,
            line: String::new(),
        })
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn recv(&mut self) -> Result<Option<String>> {
        loop {
            self.line.clear();
            let read = self.reader.read_line(&mut self.line).await.map_err(|err| {
                MetricError::transport_with_source("session read failed", Box::new(err))
            })?;

            if read == 0 {
                debug!(peer = self.peer, "peer closed the session");
                return Ok(None);
            }

            let frame = self.line.trim();
            if frame.is_empty() {
                continue; // keep-alive blank lines
            }
            return Ok(Some(frame.to_string()));
        }
    }

    async fn send(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("tcp://{}", self.peer)
    }
}
