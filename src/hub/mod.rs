//! Latest-frame broadcast hub
//!
//! The hub connects the single producer (camera/encoder callback) to any
//! number of streaming sessions. It uses `tokio::sync::watch` as a single
//! shared latest-frame slot with broadcast change notification.
//!
//! # Architecture
//!
//! ```text
//!      [Producer]
//!      append(chunk)
//!          │
//!          ▼
//!     FrameBuffer ── pending: BytesMut (accumulation)
//!          │
//!          │ SOI boundary seen → publish complete frame
//!          ▼
//!     watch::Sender<Option<Frame>>  (the "latest" slot)
//!          │
//!    ┌─────┼──────────────────┐
//!    ▼     ▼                  ▼
//! [Session]  [Session]  ...  [Session]
//! wait_next()  wait_next()   wait_next()
//!    │            │              │
//!    └──► one multipart chunk per wake ──► TCP
//! ```
//!
//! # Zero-Copy Design
//!
//! Frame payloads are `bytes::Bytes`, so all sessions share one reference
//! counted allocation per frame. Publishing replaces the slot value; sessions
//! clone the handle, never the payload.
//!
//! # No backlog
//!
//! The slot holds exactly one frame. A publish with no waiting consumer is
//! simply lost: the consumer's next wait discards it and blocks for the
//! publish after that, never replaying the missed one. This is correct for
//! live viewing, where a client only ever needs a *future* frame, not
//! history; only a consumer's very first wait takes whatever is already
//! published.

pub mod buffer;
pub mod channel;
pub mod frame;

pub use buffer::FrameBuffer;
pub use channel::{FrameReceiver, FrameSource, StreamClosed};
pub use frame::{Frame, JPEG_SOI};
