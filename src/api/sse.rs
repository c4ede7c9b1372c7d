//! Server-sent events transport.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, trace, warn};
use url::Url;

use super::client::{BackendClient, EVENTS_PATH};
use super::event::PushEvent;
use crate::core::{ApiError, Settings};

/// One dispatched event: name plus joined data lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

/// Incremental decoder for an event stream.
///
/// Frames end on a blank line. Comment lines (`:`) are skipped and
/// multiple `data:` lines are joined with `\n`.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning every frame it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            if let Some(frame) = self.process_line(line.trim_end_matches(['\n', '\r'])) {
                frames.push(frame);
            }
        }
        frames
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseFrame {
            event: event.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}

/// Long-lived subscription to the backend event stream
pub struct EventFeed {
    client: Client,
    url: Url,
    reconnect: Duration,
}

impl EventFeed {
    /// Feed for the backend `client` talks to
    pub fn new(client: &BackendClient, reconnect: Duration) -> Result<Self, ApiError> {
        let url = client.endpoint(EVENTS_PATH, None)?;
        // No request timeout: the stream stays open indefinitely
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            url,
            reconnect,
        })
    }

    /// Feed using `feed.reconnect_secs`
    pub fn from_settings(client: &BackendClient, settings: &Settings) -> Result<Self, ApiError> {
        let secs = settings.get_int("feed.reconnect_secs").unwrap_or(5).max(1) as u64;
        Self::new(client, Duration::from_secs(secs))
    }

    /// Run the feed until the receiver goes away, reconnecting on failure
    pub fn spawn(self, tx: mpsc::UnboundedSender<PushEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let mut connected = false;
                match self.stream_once(&tx, &mut connected).await {
                    Ok(()) => warn!(url = %self.url, "event stream ended"),
                    Err(e) => error!(url = %self.url, error = %e, "event stream failed"),
                }

                if connected && tx.send(PushEvent::FeedDisconnected).is_err() {
                    break;
                }
                if tx.is_closed() {
                    break;
                }
                tokio::time::sleep(self.reconnect).await;
            }
            info!("event feed stopped");
        })
    }

    async fn stream_once(
        &self,
        tx: &mpsc::UnboundedSender<PushEvent>,
        connected: &mut bool,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: status.to_string(),
            });
        }

        *connected = true;
        info!(url = %self.url, "event stream connected");
        if tx.send(PushEvent::FeedConnected).is_err() {
            return Ok(());
        }

        let mut decoder = SseDecoder::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for frame in decoder.push(&chunk) {
                match PushEvent::from_frame(&frame.event, &frame.data) {
                    Ok(Some(event)) => {
                        if tx.send(event).is_err() {
                            return Ok(());
                        }
                    }
                    Ok(None) => trace!(event = %frame.event, "ignoring event"),
                    Err(e) => warn!(event = %frame.event, error = %e, "undecodable event"),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"event: chart_re").is_empty());
        assert!(decoder.push(b"ady\ndata: {\"a\":").is_empty());

        let frames = decoder.push(b" 1}\n\nevent: heartbeat\r\ndata: {}\r\n\r\n");
        assert_eq!(
            frames,
            vec![
                SseFrame {
                    event: "chart_ready".into(),
                    data: "{\"a\": 1}".into()
                },
                SseFrame {
                    event: "heartbeat".into(),
                    data: "{}".into()
                },
            ]
        );
    }

    #[test]
    fn test_multiline_data_and_comments() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b": keepalive\ndata: line one\ndata: line two\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "message");
        assert_eq!(frames[0].data, "line one\nline two");
    }

    #[test]
    fn test_frame_without_data_is_dropped() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"event: connected\n\n").is_empty());
        // The event name does not leak into the next frame
        let frames = decoder.push(b"data: x\n\n");
        assert_eq!(frames[0].event, "message");
    }

    #[test]
    fn test_feed_url() {
        let client = BackendClient::new("http://localhost:5000", Duration::from_secs(1)).unwrap();
        let feed = EventFeed::new(&client, Duration::from_secs(5)).unwrap();
        assert_eq!(feed.url.as_str(), "http://localhost:5000/api/events");
    }
}
