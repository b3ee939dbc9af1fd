//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

use crate::http::MULTIPART_BOUNDARY;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Maximum concurrent connections (0 = unlimited)
    pub max_connections: usize,

    /// Request path serving the MJPEG stream
    pub stream_path: String,

    /// Multipart boundary token for stream parts
    pub boundary: String,

    /// Upper bound on a blocked frame wait; on expiry the session re-checks
    /// that its client and the producer are still there, so half-open
    /// connections cannot hold a stale waiter forever
    pub liveness_interval: Duration,

    /// Cap on request head and body size
    pub max_request_bytes: usize,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".parse().unwrap(),
            max_connections: 0, // Unlimited
            stream_path: "/stream.mjpg".to_string(),
            boundary: MULTIPART_BOUNDARY.to_string(),
            liveness_interval: Duration::from_secs(10),
            max_request_bytes: 16 * 1024,
            tcp_nodelay: true, // Important for low latency
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the stream path
    pub fn stream_path(mut self, path: impl Into<String>) -> Self {
        self.stream_path = path.into();
        self
    }

    /// Set the liveness interval
    pub fn liveness_interval(mut self, interval: Duration) -> Self {
        self.liveness_interval = interval;
        self
    }

    /// Set the request size cap
    pub fn max_request_bytes(mut self, max: usize) -> Self {
        self.max_request_bytes = max;
        self
    }
}
