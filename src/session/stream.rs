//! The streaming session state machine
//!
//! A session drives one client through `HeadersPending → Streaming → Closed`:
//!
//! ```text
//! HeadersPending ── write multipart envelope once ──► Streaming
//! Streaming ── loop: wait_next() → write one part ──┐
//!     │                                             │
//!     │ write failure / client EOF / source closed  │
//!     ▼                                             │
//!   Closed ◄───────────────────────────────────────┘
//! ```
//!
//! The blocked wait is raced against the connection's receive side, so a
//! client closing (EOF or reset) unblocks the session promptly instead of
//! leaving a stale waiter. The wait is additionally bounded by a liveness
//! interval; a tick re-checks the producer, so a half-open connection can
//! never pin a session forever.
//!
//! A session failure is isolated: it is logged once with the client's
//! address and cause, and it never affects the producer or other sessions.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::http::response::write_stream_head;
use crate::hub::channel::StreamClosed;
use crate::hub::{Frame, FrameReceiver};
use crate::stats::SessionStats;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Outer multipart response headers not yet written
    HeadersPending,
    /// Writing one part per published frame
    Streaming,
    /// Terminal; the connection is done
    Closed,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Client closed its side of the connection
    ClientDisconnected,
    /// Writing to the client failed (broken pipe, reset, timeout)
    WriteFailed,
    /// The producer shut down
    SourceClosed,
}

/// One client's streaming loop over an abstract transport
#[derive(Debug)]
pub struct StreamSession {
    session_id: u64,
    peer_addr: SocketAddr,
    state: SessionState,
    frames: FrameReceiver,
    boundary: String,
    liveness_interval: Duration,
    stats: SessionStats,
}

enum Event {
    Frame(Result<Frame, StreamClosed>),
    LivenessTick,
    Read(std::io::Result<usize>),
}

impl StreamSession {
    /// Create a session for an accepted stream request
    pub fn new(
        session_id: u64,
        peer_addr: SocketAddr,
        frames: FrameReceiver,
        boundary: String,
        liveness_interval: Duration,
    ) -> Self {
        Self {
            session_id,
            peer_addr,
            state: SessionState::HeadersPending,
            frames,
            boundary,
            liveness_interval,
            stats: SessionStats::new(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Stream frames to the client until it disconnects, a write fails, or
    /// the producer shuts down
    ///
    /// All endings are expected and non-fatal to the server; the session
    /// logs its own close and returns what it sent.
    pub async fn run<T: AsyncRead + AsyncWrite + Unpin>(mut self, transport: T) -> SessionStats {
        let started = Instant::now();
        let (mut reader, mut writer) = tokio::io::split(transport);

        if let Err(e) = write_stream_head(&mut writer, &self.boundary).await {
            self.close(started, CloseReason::WriteFailed, Some(&e));
            return self.stats;
        }
        self.state = SessionState::Streaming;
        tracing::debug!(
            session_id = self.session_id,
            peer = %self.peer_addr,
            "Streaming client added"
        );

        // Bytes the client sends after its request are drained and ignored
        let mut drain = [0u8; 512];

        let reason = loop {
            let event = tokio::select! {
                next = timeout(self.liveness_interval, self.frames.wait_next()) => {
                    match next {
                        Ok(result) => Event::Frame(result),
                        Err(_) => Event::LivenessTick,
                    }
                }
                read = reader.read(&mut drain) => Event::Read(read),
            };

            match event {
                Event::Frame(Ok(frame)) => {
                    if let Err(e) = write_part(&mut writer, &self.boundary, &frame).await {
                        self.close(started, CloseReason::WriteFailed, Some(&e));
                        return self.stats;
                    }
                    self.stats.frames_sent += 1;
                    self.stats.bytes_sent += frame.len() as u64;
                }
                Event::Frame(Err(StreamClosed)) => break CloseReason::SourceClosed,
                Event::LivenessTick => {
                    if self.frames.is_closed() {
                        break CloseReason::SourceClosed;
                    }
                }
                Event::Read(Ok(0)) => break CloseReason::ClientDisconnected,
                Event::Read(Ok(_)) => {}
                Event::Read(Err(_)) => break CloseReason::ClientDisconnected,
            }
        };

        self.close(started, reason, None);
        self.stats
    }

    fn close(&mut self, started: Instant, reason: CloseReason, error: Option<&std::io::Error>) {
        self.state = SessionState::Closed;
        self.stats.duration = started.elapsed();

        match error {
            // The write-failure path mirrors the classic "removed streaming
            // client" log line: once, with address and cause
            Some(e) => tracing::warn!(
                session_id = self.session_id,
                peer = %self.peer_addr,
                error = %e,
                "Removed streaming client"
            ),
            None => tracing::debug!(
                session_id = self.session_id,
                peer = %self.peer_addr,
                reason = ?reason,
                frames = self.stats.frames_sent,
                "Streaming client closed"
            ),
        }
    }
}

/// Write one multipart chunk: boundary, part headers, payload, separator
async fn write_part<W: AsyncWrite + Unpin>(
    writer: &mut W,
    boundary: &str,
    frame: &Frame,
) -> std::io::Result<()> {
    let head = format!(
        "--{}\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
        boundary,
        frame.len()
    );
    writer.write_all(head.as_bytes()).await?;
    writer.write_all(&frame.data).await?;
    writer.write_all(b"\r\n").await?;
    writer.flush().await
}
