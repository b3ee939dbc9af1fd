//! mjpeg-rs: MJPEG live streaming server library
//!
//! This library serves a single live MJPEG video feed to any number of
//! concurrent HTTP clients using the `multipart/x-mixed-replace` convention:
//! - One producer appends JPEG-encoded byte chunks; frame boundaries are
//!   detected from the JPEG SOI marker
//! - Every connected client always receives the most recent complete frame,
//!   never a growing backlog
//! - Slow or disconnected clients are isolated: they never stall the producer
//!   or other clients
//!
//! # Example: Streaming server
//!
//! ```no_run
//! use mjpeg_rs::{FrameBuffer, ServerConfig, StreamServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut buffer = FrameBuffer::new();
//!     let server = StreamServer::new(ServerConfig::default(), buffer.source());
//!
//!     // Producer task: the camera/encoder callback calls append().
//!     tokio::spawn(async move {
//!         loop {
//!             let chunk = [0xFF, 0xD8, 0x01, 0x02]; // encoder output
//!             buffer.append(&chunk);
//!             tokio::time::sleep(std::time::Duration::from_millis(40)).await;
//!         }
//!     });
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;
pub mod hub;
pub mod server;
pub mod session;
pub mod stats;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use hub::{Frame, FrameBuffer, FrameReceiver, FrameSource};
pub use server::config::ServerConfig;
pub use server::listener::StreamServer;
pub use session::StreamSession;
