//! Per-connection request handling and routing
//!
//! Exactly one request is served per connection: pages and the login stub
//! are single-shot exchanges, while a request for the stream path turns the
//! connection into a long-lived [`StreamSession`].

use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::{Error, Result};
use crate::http::request::{read_request, Method, Request};
use crate::http::response::{write_redirect, write_response, Status};
use crate::http::form;
use crate::hub::FrameSource;
use crate::server::config::ServerConfig;
use crate::server::pages;
use crate::session::StreamSession;

/// One accepted client connection
pub struct Connection<T> {
    session_id: u64,
    transport: T,
    peer_addr: SocketAddr,
    config: ServerConfig,
    source: FrameSource,
}

impl<T: AsyncRead + AsyncWrite + Unpin> Connection<T> {
    /// Create a handler for an accepted connection
    pub fn new(
        session_id: u64,
        transport: T,
        peer_addr: SocketAddr,
        config: ServerConfig,
        source: FrameSource,
    ) -> Self {
        Self {
            session_id,
            transport,
            peer_addr,
            config,
            source,
        }
    }

    /// Serve the connection until its single exchange (or stream) ends
    pub async fn run(mut self) -> Result<()> {
        let request =
            match read_request(&mut self.transport, self.config.max_request_bytes).await {
                Ok(request) => request,
                Err(Error::Http(e)) => {
                    tracing::debug!(
                        session_id = self.session_id,
                        peer = %self.peer_addr,
                        error = %e,
                        "Rejecting unparseable request"
                    );
                    write_response(&mut self.transport, Status::BadRequest, "text/plain", b"")
                        .await?;
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

        tracing::debug!(
            session_id = self.session_id,
            peer = %self.peer_addr,
            method = ?request.method,
            path = %request.path,
            "Request"
        );

        match (&request.method, request.path.as_str()) {
            (Method::Get, path) if path == self.config.stream_path => self.stream().await?,
            (Method::Get, "/") => write_redirect(&mut self.transport, "/index.html").await?,
            (Method::Get, "/index.html") => self.page(pages::INDEX_PAGE).await?,
            (Method::Get, "/stream.html") => self.page(pages::STREAM_PAGE).await?,
            (Method::Post, "/login") => self.login(&request).await?,
            _ => {
                write_response(
                    &mut self.transport,
                    Status::NotFound,
                    "text/html",
                    b"<html><body>404 Not Found</body></html>",
                )
                .await?
            }
        }
        Ok(())
    }

    /// Hand the connection over to a streaming session
    async fn stream(self) -> Result<()> {
        let receiver = self.source.subscribe();
        let session = StreamSession::new(
            self.session_id,
            self.peer_addr,
            receiver,
            self.config.boundary.clone(),
            self.config.liveness_interval,
        );

        let stats = session.run(self.transport).await;
        tracing::info!(
            session_id = self.session_id,
            peer = %self.peer_addr,
            frames = stats.frames_sent,
            bytes = stats.bytes_sent,
            "Stream session finished"
        );
        Ok(())
    }

    async fn page(&mut self, body: &str) -> Result<()> {
        write_response(&mut self.transport, Status::Ok, "text/html", body.as_bytes()).await?;
        Ok(())
    }

    /// Cosmetic login stub carried over from the original server: accepts
    /// only an empty username and password, issues no session or token
    async fn login(&mut self, request: &Request) -> Result<()> {
        let content_type = request.header("content-type").unwrap_or("");

        let fields = match form::boundary_from_content_type(content_type) {
            Some(boundary) => form::parse_multipart_form(&request.body, boundary),
            None => form::parse_urlencoded(&request.body),
        };

        let username = fields.get("username").map(String::as_str).unwrap_or("-");
        let password = fields.get("password").map(String::as_str).unwrap_or("-");

        let body = if username.is_empty() && password.is_empty() {
            pages::STREAM_PAGE
        } else {
            pages::LOGIN_RETRY_PAGE
        };

        write_response(&mut self.transport, Status::Ok, "text/html", body.as_bytes()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

    use super::*;
    use crate::hub::FrameBuffer;

    fn peer() -> SocketAddr {
        "127.0.0.1:45678".parse().unwrap()
    }

    async fn exchange(raw: &[u8]) -> String {
        let buffer = FrameBuffer::new();
        let (mut client, server_side) = duplex(64 * 1024);
        let connection = Connection::new(
            1,
            server_side,
            peer(),
            ServerConfig::default(),
            buffer.source(),
        );

        let task = tokio::spawn(connection.run());
        client.write_all(raw).await.unwrap();
        client.shutdown().await.unwrap();

        let mut out = Vec::new();
        client.read_to_end(&mut out).await.unwrap();
        task.await.unwrap().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_root_redirects_to_index() {
        let reply = exchange(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").await;
        assert!(reply.starts_with("HTTP/1.1 301 Moved Permanently\r\n"));
        assert!(reply.contains("Location: /index.html\r\n"));
    }

    #[tokio::test]
    async fn test_index_serves_login_form() {
        let reply = exchange(b"GET /index.html HTTP/1.1\r\n\r\n").await;
        assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(reply.contains("Please login"));
    }

    #[tokio::test]
    async fn test_stream_html_serves_viewer() {
        let reply = exchange(b"GET /stream.html HTTP/1.1\r\n\r\n").await;
        assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(reply.contains("stream.mjpg"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let reply = exchange(b"GET /nope HTTP/1.1\r\n\r\n").await;
        assert!(reply.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[tokio::test]
    async fn test_malformed_request_is_400() {
        let reply = exchange(b"NOT-HTTP\r\n\r\n").await;
        assert!(reply.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn test_login_empty_credentials_accepted() {
        let reply =
            exchange(b"POST /login HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 19\r\n\r\nusername=&password=")
                .await;
        assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(reply.contains("stream.mjpg"));
    }

    #[tokio::test]
    async fn test_login_nonempty_credentials_rejected() {
        let reply =
            exchange(b"POST /login HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 20\r\n\r\nusername=a&password=")
                .await;
        assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(reply.contains("try again"));
    }

    #[tokio::test]
    async fn test_stream_path_starts_session() {
        let mut buffer = FrameBuffer::new();
        let (mut client, server_side) = duplex(64 * 1024);
        let connection = Connection::new(
            1,
            server_side,
            peer(),
            ServerConfig::default().liveness_interval(Duration::from_millis(50)),
            buffer.source(),
        );
        let task = tokio::spawn(connection.run());

        client
            .write_all(b"GET /stream.mjpg HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .unwrap();

        buffer.append(&[0xFF, 0xD8, 0x01]);
        buffer.append(&[0xFF, 0xD8, 0x02]);

        let mut out = vec![0u8; 1024];
        let n = client.read(&mut out).await.unwrap();
        let reply = String::from_utf8_lossy(&out[..n]).to_string();
        assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(reply.contains("multipart/x-mixed-replace; boundary=FRAME"));

        // Client going away ends the session without error
        drop(client);
        task.await.unwrap().unwrap();
    }
}
