//! HTTP request parsing
//!
//! Reads one request from an async reader: request line, headers, and an
//! optional `Content-Length`-delimited body. The head is size-capped so a
//! misbehaving client cannot grow the buffer without bound.

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::HttpError;
use crate::error::Result;

/// Request method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

impl Method {
    fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::Get,
            "POST" => Method::Post,
            other => Method::Other(other.to_string()),
        }
    }
}

/// A parsed HTTP request
#[derive(Debug)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// Request target path (as sent, query string included)
    pub path: String,
    /// Headers in received order, names lowercased
    pub headers: Vec<(String, String)>,
    /// Request body (empty unless `Content-Length` was given)
    pub body: Bytes,
}

impl Request {
    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Body size declared by the client, if any
    fn content_length(headers: &[(String, String)]) -> Result<usize> {
        match headers.iter().find(|(n, _)| n == "content-length") {
            Some((_, v)) => v
                .trim()
                .parse()
                .map_err(|_| HttpError::InvalidContentLength.into()),
            None => Ok(0),
        }
    }
}

/// Read and parse one request from `reader`
///
/// `max_head` caps the request line + headers; the body is additionally
/// capped at the same size.
pub async fn read_request<R: AsyncRead + Unpin>(reader: &mut R, max_head: usize) -> Result<Request> {
    let mut buf = BytesMut::with_capacity(1024);

    // Read until the blank line ending the head
    let head_end = loop {
        if let Some(pos) = find_head_end(&buf) {
            break pos;
        }
        if buf.len() >= max_head {
            return Err(HttpError::RequestTooLarge.into());
        }
        let n = reader.read_buf(&mut buf).await?;
        if n == 0 {
            return Err(HttpError::UnexpectedEof.into());
        }
    };

    let head = buf.split_to(head_end + 4);
    let head_text =
        std::str::from_utf8(&head[..head_end]).map_err(|_| HttpError::MalformedRequestLine)?;

    let mut lines = head_text.split("\r\n");
    let request_line = lines.next().ok_or(HttpError::MalformedRequestLine)?;

    let mut parts = request_line.split_whitespace();
    let method = parts.next().ok_or(HttpError::MalformedRequestLine)?;
    let path = parts.next().ok_or(HttpError::MalformedRequestLine)?;
    let _version = parts.next().ok_or(HttpError::MalformedRequestLine)?;

    let mut headers = Vec::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let (name, value) = line.split_once(':').ok_or(HttpError::MalformedHeader)?;
        headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
    }

    // Read the declared body, reusing whatever followed the head in `buf`
    let content_length = Request::content_length(&headers)?;
    if content_length > max_head {
        return Err(HttpError::RequestTooLarge.into());
    }
    while buf.len() < content_length {
        let n = reader.read_buf(&mut buf).await?;
        if n == 0 {
            return Err(HttpError::UnexpectedEof.into());
        }
    }
    let body = buf.split_to(content_length).freeze();

    Ok(Request {
        method: Method::parse(method),
        path: path.to_string(),
        headers,
        body,
    })
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
