//! Minimal MPD client over the line protocol.
//!
//! One short-lived TCP connection per operation, wrapped in a sub-second
//! timeout so a hung player can never stall the polling cadence.  Every
//! failure is non-fatal: the caller logs it and the next cycle retries.

use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

/// Overall budget for connect + command round-trips on one connection.
const IO_TIMEOUT: Duration = Duration::from_millis(800);

#[derive(Debug, thiserror::Error)]
pub enum MpdError {
    #[error("mpd connection failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("mpd error: {0}")]
    Protocol(String),
    #[error("mpd request timed out")]
    Timeout,
}

pub struct MpdClient {
    address: String,
}

impl MpdClient {
    pub fn new(address: String) -> Self {
        Self { address }
    }

    /// URL of the track MPD is currently on, if any.
    pub async fn current_url(&self) -> Result<Option<String>, MpdError> {
        let lines = self.exec(&["currentsong".to_string()]).await?;
        Ok(response_value(&lines, "file").map(str::to_string))
    }

    /// Replace the playlist with `url` and start playback (clear → add →
    /// play, on a single connection).
    pub async fn play_url(&self, url: &str) -> Result<(), MpdError> {
        self.exec(&[
            "clear".to_string(),
            format!("add \"{}\"", escape_arg(url)),
            "play".to_string(),
        ])
        .await?;
        Ok(())
    }

    pub async fn stop(&self) -> Result<(), MpdError> {
        self.exec(&["stop".to_string()]).await?;
        Ok(())
    }

    /// Raw status map (volume, bitrate, audio format, ...).
    pub async fn status(&self) -> Result<HashMap<String, String>, MpdError> {
        let lines = self.exec(&["status".to_string()]).await?;
        Ok(parse_kv(&lines))
    }

    pub async fn volume(&self) -> Result<Option<u8>, MpdError> {
        let status = self.status().await?;
        Ok(status.get("volume").and_then(|v| v.parse().ok()))
    }

    pub async fn set_volume(&self, volume: u8) -> Result<(), MpdError> {
        let volume = volume.min(100);
        self.exec(&[format!("setvol {}", volume)]).await?;
        Ok(())
    }

    /// Open a connection, check the greeting, run `commands` in order and
    /// collect all response lines.  An `ACK` from the server aborts the
    /// batch.
    async fn exec(&self, commands: &[String]) -> Result<Vec<String>, MpdError> {
        match tokio::time::timeout(IO_TIMEOUT, self.exec_inner(commands)).await {
            Ok(result) => result,
            Err(_) => Err(MpdError::Timeout),
        }
    }

    async fn exec_inner(&self, commands: &[String]) -> Result<Vec<String>, MpdError> {
        let stream = TcpStream::connect(&self.address).await?;
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let mut line = String::new();
        reader.read_line(&mut line).await?;
        if !line.starts_with("OK MPD") {
            return Err(MpdError::Protocol(format!(
                "unexpected greeting: {}",
                line.trim()
            )));
        }

        let mut out = Vec::new();
        for cmd in commands {
            debug!("mpd: send {}", cmd);
            write_half.write_all(cmd.as_bytes()).await?;
            write_half.write_all(b"\n").await?;
            loop {
                line.clear();
                let n = reader.read_line(&mut line).await?;
                if n == 0 {
                    return Err(MpdError::Protocol(
                        "connection closed mid-response".to_string(),
                    ));
                }
                let trimmed = line.trim_end();
                if trimmed == "OK" {
                    break;
                }
                if let Some(ack) = trimmed.strip_prefix("ACK ") {
                    return Err(MpdError::Protocol(ack.to_string()));
                }
                out.push(trimmed.to_string());
            }
        }
        Ok(out)
    }
}

/// First `key: value` line matching `key`.
fn response_value<'a>(lines: &'a [String], key: &str) -> Option<&'a str> {
    lines.iter().find_map(|l| {
        let (k, v) = l.split_once(':')?;
        (k.trim() == key).then(|| v.trim())
    })
}

fn parse_kv(lines: &[String]) -> HashMap<String, String> {
    lines
        .iter()
        .filter_map(|l| {
            let (k, v) = l.split_once(':')?;
            Some((k.trim().to_string(), v.trim().to_string()))
        })
        .collect()
}

/// MPD quoting: backslash-escape quotes and backslashes inside a quoted
/// argument.
fn escape_arg(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
