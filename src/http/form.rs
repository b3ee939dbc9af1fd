//! Form decoding for the login endpoint
//!
//! Handles the two encodings browsers submit: `multipart/form-data` (what the
//! served login form uses) and `application/x-www-form-urlencoded`. Only text
//! fields are supported; file parts are ignored.

use std::collections::HashMap;

/// Extract the `boundary` parameter from a `Content-Type` header value
pub fn boundary_from_content_type(content_type: &str) -> Option<&str> {
    content_type.split(';').find_map(|param| {
        let param = param.trim();
        let value = param.strip_prefix("boundary=")?;
        Some(value.trim_matches('"'))
    })
}

/// Parse `multipart/form-data` text fields into a name → value map
pub fn parse_multipart_form(body: &[u8], boundary: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    let delimiter = format!("--{}", boundary);

    let Ok(text) = std::str::from_utf8(body) else {
        return fields;
    };

    for part in text.split(delimiter.as_str()) {
        let part = part.trim_start_matches("\r\n");
        if part.is_empty() || part.starts_with("--") {
            continue;
        }

        // Part = headers, blank line, value
        let Some((headers, value)) = part.split_once("\r\n\r\n") else {
            continue;
        };

        let Some(name) = headers
            .split("\r\n")
            .find(|line| line.to_ascii_lowercase().starts_with("content-disposition:"))
            .and_then(field_name)
        else {
            continue;
        };

        fields.insert(name.to_string(), value.trim_end_matches("\r\n").to_string());
    }

    fields
}

/// Parse `application/x-www-form-urlencoded` into a name → value map
pub fn parse_urlencoded(body: &[u8]) -> HashMap<String, String> {
    let Ok(text) = std::str::from_utf8(body) else {
        return HashMap::new();
    };

    text.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => (percent_decode(name), percent_decode(value)),
            None => (percent_decode(pair), String::new()),
        })
        .collect()
}

/// Pull the `name="..."` parameter out of a Content-Disposition line
fn field_name(disposition: &str) -> Option<&str> {
    disposition.split(';').find_map(|param| {
        let param = param.trim();
        let value = param.strip_prefix("name=")?;
        Some(value.trim_matches('"'))
    })
}

fn percent_decode(s: &str) -> String {
    let mut out = Vec::with_capacity(s.len());
    let mut bytes = s.bytes();

    while let Some(b) = bytes.next() {
        match b {
            b'+' => out.push(b' '),
            b'%' => {
                let hi = bytes.next();
                let lo = bytes.next();
                match (hi.and_then(hex_val), lo.and_then(hex_val)) {
                    (Some(hi), Some(lo)) => out.push(hi << 4 | lo),
                    _ => out.push(b'%'),
                }
            }
            other => out.push(other),
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
