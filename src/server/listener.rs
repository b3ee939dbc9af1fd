//! Streaming server listener
//!
//! Handles the TCP accept loop and spawns one connection handler per client.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::error::Result;
use crate::hub::FrameSource;
use crate::server::config::ServerConfig;
use crate::server::connection::Connection;

/// MJPEG streaming server
///
/// Owns a [`FrameSource`] handle to the producer's frame buffer and hands a
/// fresh receiver to every accepted streaming client.
pub struct StreamServer {
    config: ServerConfig,
    source: FrameSource,
    next_session_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl StreamServer {
    /// Create a new server with the given configuration and frame source
    pub fn new(config: ServerConfig, source: FrameSource) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            config,
            source,
            next_session_id: AtomicU64::new(1),
            connection_semaphore,
        }
    }

    /// Get the frame source this server serves
    pub fn source(&self) -> &FrameSource {
        &self.source
    }

    /// Run the server
    ///
    /// This method blocks until the server is shut down.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "MJPEG server listening");

        self.accept_loop(&listener).await
    }

    /// Run the server with graceful shutdown
    ///
    /// When `shutdown` resolves, the server stops accepting connections.
    /// In-flight sessions end on their own: dropping the producer's
    /// `FrameBuffer` closes the hub, which every blocked session observes
    /// within one liveness interval at most.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "MJPEG server listening");

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        }
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        // Check connection limit
        let permit = if let Some(ref sem) = self.connection_semaphore {
            match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    return;
                }
            }
        } else {
            None
        };

        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            session_id = session_id,
            peer = %peer_addr,
            "New connection"
        );

        if let Err(e) = self.configure_socket(&socket) {
            tracing::error!(error = %e, "Failed to configure socket");
            return;
        }

        let config = self.config.clone();
        let source = self.source.clone();

        tokio::spawn(async move {
            // Held for the connection's lifetime
            let _permit = permit;

            let connection = Connection::new(session_id, socket, peer_addr, config, source);
            if let Err(e) = connection.run().await {
                tracing::debug!(
                    session_id = session_id,
                    error = %e,
                    "Connection error"
                );
            }

            tracing::debug!(session_id = session_id, "Connection closed");
        });
    }

    fn configure_socket(&self, socket: &TcpStream) -> std::io::Result<()> {
        if self.config.tcp_nodelay {
            socket.set_nodelay(true)?;
        }
        Ok(())
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::AsyncReadExt;
    use tokio::io::AsyncWriteExt;

    use super::*;
    use crate::hub::FrameBuffer;

    async fn start_server(config: ServerConfig) -> (Arc<StreamServer>, SocketAddr, FrameBuffer) {
        let buffer = FrameBuffer::new();
        // Port 0: let the OS pick, then rebind the config to the real address
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let server = Arc::new(StreamServer::new(config.bind(addr), buffer.source()));
        let task_server = Arc::clone(&server);
        tokio::spawn(async move { task_server.run().await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        (server, addr, buffer)
    }

    #[tokio::test]
    async fn test_serves_stream_to_tcp_client() {
        let (_server, addr, mut buffer) = start_server(ServerConfig::default()).await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"GET /stream.mjpg HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        buffer.append(&[0xFF, 0xD8, 0xAB]);
        buffer.append(&[0xFF, 0xD8, 0xCD]);

        let mut out = vec![0u8; 2048];
        let n = client.read(&mut out).await.unwrap();
        let reply = String::from_utf8_lossy(&out[..n]).to_string();

        assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(reply.contains("multipart/x-mixed-replace; boundary=FRAME"));
    }

    #[tokio::test]
    async fn test_unknown_path_404_over_tcp() {
        let (_server, addr, _buffer) = start_server(ServerConfig::default()).await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"GET /missing HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .unwrap();

        let mut out = Vec::new();
        client.read_to_end(&mut out).await.unwrap();
        assert!(String::from_utf8_lossy(&out).starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[tokio::test]
    async fn test_connection_limit_rejects_excess() {
        let (_server, addr, _buffer) =
            start_server(ServerConfig::default().max_connections(1)).await;

        let first = TcpStream::connect(addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        // The second connection is accepted at the TCP level but dropped
        // without a response. Dropping the socket with the request bytes
        // unread makes the kernel send RST, so the client sees either a
        // clean EOF or a connection reset.
        let mut second = TcpStream::connect(addr).await.unwrap();
        second
            .write_all(b"GET /index.html HTTP/1.1\r\n\r\n")
            .await
            .unwrap();
        let mut out = Vec::new();
        match second.read_to_end(&mut out).await {
            Ok(n) => assert_eq!(n, 0),
            Err(e) => assert_eq!(e.kind(), std::io::ErrorKind::ConnectionReset),
        }

        drop(first);
    }
}
