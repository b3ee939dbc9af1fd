//! Per-client streaming sessions

pub mod stream;

pub use stream::{CloseReason, SessionState, StreamSession};
