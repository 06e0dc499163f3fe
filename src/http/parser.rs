use std::time::Instant;

use bytes::Bytes;
use thiserror::Error;

use crate::http::headers::Headers;
use crate::http::request::{split_target, Method, Request};

/// Upper bound for the request line plus headers.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;
/// Upper bound for a `Content-Length` delimited body.
pub const MAX_BODY_SIZE: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed request line")]
    InvalidRequest,
    #[error("request method is not a valid token")]
    InvalidMethod,
    #[error("malformed header line")]
    InvalidHeader,
    #[error("invalid Content-Length")]
    InvalidContentLength,
    #[error("request head exceeds {MAX_HEAD_SIZE} bytes")]
    HeadersTooLarge,
    #[error("request body exceeds {MAX_BODY_SIZE} bytes")]
    BodyTooLarge,
    #[error("incomplete request")]
    Incomplete,
}

/// Parses one request from the front of `buf`.
///
/// Returns the request and the number of bytes it occupied, or
/// [`ParseError::Incomplete`] when more bytes are needed. Only
/// `Content-Length` delimited bodies are understood.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    // Stray line breaks between requests are ignored
    let skipped = buf.iter().take_while(|&&b| b == b'\r' || b == b'\n').count();
    let buf = &buf[skipped..];

    // Look for header/body separator
    let headers_end = match find_headers_end(buf) {
        Some(end) if end > MAX_HEAD_SIZE => return Err(ParseError::HeadersTooLarge),
        Some(end) => end,
        None if buf.len() > MAX_HEAD_SIZE => return Err(ParseError::HeadersTooLarge),
        None => return Err(ParseError::Incomplete),
    };
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + 4..];

    let headers_str = std::str::from_utf8(header_bytes)
        .map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split_whitespace();

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let target = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;

    let method = Method::from_str(method_str).ok_or(ParseError::InvalidMethod)?;
    let (path, query_params) = split_target(target);

    // Headers
    let mut headers = Headers::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line
            .split_once(": ")
            .ok_or(ParseError::InvalidHeader)?;

        headers.add(key, value);
    }

    // Body
    let content_length = headers
        .get("Content-Length")
        .map(|v| v.trim().parse::<i64>().map_err(|_| ParseError::InvalidContentLength))
        .transpose()?
        .unwrap_or(-1);

    let body_len = usize::try_from(content_length).unwrap_or(0);
    if body_len > MAX_BODY_SIZE {
        return Err(ParseError::BodyTooLarge);
    }

    if body_bytes.len() < body_len {
        return Err(ParseError::Incomplete);
    }

    let body = (body_len > 0).then(|| Bytes::copy_from_slice(&body_bytes[..body_len]));

    let request = Request {
        method,
        path,
        query_params,
        version: version.to_string(),
        headers,
        body,
        received_at: Instant::now(),
    };

    let total_consumed = skipped + headers_end + 4 + body_len;
    Ok((request, total_consumed))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|w| w == b"\r\n\r\n")
}
