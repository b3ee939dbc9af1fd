//! HTTP accept and routing layer
//!
//! The listener accepts connections and spawns one handler task per client.
//! The handler parses a single request and either serves a page, runs the
//! login stub, or hands the connection over to a streaming session.

pub mod config;
pub mod connection;
pub mod listener;
pub mod pages;

pub use config::ServerConfig;
pub use listener::StreamServer;
