//! HTTP response writing
//!
//! Plain single-shot responses plus the MJPEG stream envelope. Everything is
//! written explicitly; there is no buffering layer beyond the socket's.

use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Boundary token separating multipart stream parts
pub const MULTIPART_BOUNDARY: &str = "FRAME";

/// Response status codes the server emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    MovedPermanently,
    BadRequest,
    NotFound,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::MovedPermanently => 301,
            Status::BadRequest => 400,
            Status::NotFound => 404,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::MovedPermanently => "Moved Permanently",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
        }
    }
}

/// Write a complete single-shot response with a body
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    status: Status,
    content_type: &str,
    body: &[u8],
) -> std::io::Result<()> {
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status.code(),
        status.reason(),
        content_type,
        body.len()
    );
    writer.write_all(head.as_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await
}

/// Write a redirect with no body
pub async fn write_redirect<W: AsyncWrite + Unpin>(writer: &mut W, location: &str) -> std::io::Result<()> {
    let head = format!(
        "HTTP/1.1 {} {}\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        Status::MovedPermanently.code(),
        Status::MovedPermanently.reason(),
        location
    );
    writer.write_all(head.as_bytes()).await?;
    writer.flush().await
}

/// Write the outer headers of the MJPEG stream response
///
/// After this, the connection carries an unbounded sequence of multipart
/// parts, one per frame, until the client goes away.
pub async fn write_stream_head<W: AsyncWrite + Unpin>(writer: &mut W, boundary: &str) -> std::io::Result<()> {
    let head = format!(
        "HTTP/1.1 200 OK\r\n\
         Age: 0\r\n\
         Cache-Control: no-cache, private\r\n\
         Pragma: no-cache\r\n\
         Content-Type: multipart/x-mixed-replace; boundary={}\r\n\r\n",
        boundary
    );
    writer.write_all(head.as_bytes()).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_response() {
        let mut out = Vec::new();
        write_response(&mut out, Status::NotFound, "text/plain", b"gone")
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.contains("Content-Length: 4\r\n"));
        assert!(text.ends_with("\r\n\r\ngone"));
    }

    #[tokio::test]
    async fn test_write_redirect() {
        let mut out = Vec::new();
        write_redirect(&mut out, "/index.html").await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 301 Moved Permanently\r\n"));
        assert!(text.contains("Location: /index.html\r\n"));
    }

    #[tokio::test]
    async fn test_write_stream_head() {
        let mut out = Vec::new();
        write_stream_head(&mut out, MULTIPART_BOUNDARY).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Age: 0\r\n"));
        assert!(text.contains("Cache-Control: no-cache, private\r\n"));
        assert!(text.contains("Pragma: no-cache\r\n"));
        assert!(text.contains("Content-Type: multipart/x-mixed-replace; boundary=FRAME\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }
}
