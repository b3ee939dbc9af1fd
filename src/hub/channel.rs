//! Consumer-side wait-for-next-frame contract
//!
//! Every session owns one [`FrameReceiver`] and blocks in
//! [`wait_next`](FrameReceiver::wait_next) between frames. A publish wakes
//! all waiting receivers (broadcast, not a work queue); each independently
//! snapshots the latest frame. A publish that lands while nobody is waiting
//! is lost for that receiver: the next call discards it and blocks for the
//! following publish. Only a receiver that has never returned a frame takes
//! the current latest immediately.

use tokio::sync::watch;

use super::frame::Frame;

/// The producer side of the hub has shut down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamClosed;

impl std::fmt::Display for StreamClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "frame source closed")
    }
}

impl std::error::Error for StreamClosed {}

/// Cloneable subscription handle to a frame buffer
///
/// This is the object handed to the HTTP layer: the server stores one and
/// creates a fresh [`FrameReceiver`] per accepted streaming client. Passing
/// it explicitly (rather than a process-wide global) keeps ownership and
/// lifetime visible.
#[derive(Debug, Clone)]
pub struct FrameSource {
    rx: watch::Receiver<Option<Frame>>,
}

impl FrameSource {
    pub(crate) fn new(rx: watch::Receiver<Option<Frame>>) -> Self {
        Self { rx }
    }

    /// Create a receiver for one session
    pub fn subscribe(&self) -> FrameReceiver {
        FrameReceiver {
            rx: self.rx.clone(),
            last_seen: 0,
        }
    }

    /// The most recently published frame, if any
    pub fn latest(&self) -> Option<Frame> {
        self.rx.borrow().clone()
    }

    /// Whether the producer is gone
    pub fn is_closed(&self) -> bool {
        self.rx.has_changed().is_err()
    }
}

/// Per-session receiver with wait-for-next semantics
#[derive(Debug)]
pub struct FrameReceiver {
    rx: watch::Receiver<Option<Frame>>,
    /// Sequence number of the last frame returned to the caller
    last_seen: u64,
}

impl FrameReceiver {
    /// Block until the next frame published after this call is available
    ///
    /// A receiver that has not returned any frame yet takes the current
    /// latest frame immediately, if one exists. After that, a publish missed
    /// between calls is discarded, never replayed: the caller always waits
    /// for the next publish.
    ///
    /// Returns `Err(StreamClosed)` once the producer is dropped.
    pub async fn wait_next(&mut self) -> Result<Frame, StreamClosed> {
        // Snapshot under the watch read lock; the guard must not be held
        // across the awaits below.
        let current = { self.rx.borrow_and_update().as_ref().cloned() };

        if self.last_seen == 0 {
            if let Some(frame) = current {
                self.last_seen = frame.seq;
                return Ok(frame);
            }
        }

        loop {
            self.rx.changed().await.map_err(|_| StreamClosed)?;
            let newer = {
                let current = self.rx.borrow_and_update();
                current
                    .as_ref()
                    .filter(|frame| frame.seq > self.last_seen)
                    .cloned()
            };
            if let Some(frame) = newer {
                self.last_seen = frame.seq;
                return Ok(frame);
            }
        }
    }

    /// Sequence number of the last frame returned (0 before the first)
    pub fn last_seen(&self) -> u64 {
        self.last_seen
    }

    /// Whether the producer is gone
    pub fn is_closed(&self) -> bool {
        self.rx.has_changed().is_err()
    }
}
