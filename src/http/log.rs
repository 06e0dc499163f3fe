//! Trace-level wire logging for parsed requests and outgoing responses.
//!
//! Nothing here runs unless `TRACE` is enabled for this crate. Bodies are
//! previewed only when their content type is textual; anything else is
//! reported by length.

use std::time::Instant;

use tracing::{trace, Level};

use crate::http::headers::Headers;
use crate::http::mime;
use crate::http::request::{Method, Request};
use crate::http::response::{Body, Response};

const PREVIEW_LIMIT: usize = 1024;

/// Method, path and arrival time of the request a response answers.
#[derive(Debug, Clone)]
pub struct RequestSummary {
    pub method: Method,
    pub path: String,
    pub received_at: Instant,
}

impl From<&Request> for RequestSummary {
    fn from(request: &Request) -> Self {
        Self {
            method: request.method.clone(),
            path: request.path.clone(),
            received_at: request.received_at,
        }
    }
}

pub fn request(request: &Request) {
    if !tracing::enabled!(Level::TRACE) {
        return;
    }

    let body = request.body.as_deref().unwrap_or(&[]);
    trace!(
        method = %request.method,
        path = %request.path,
        headers = ?request.headers,
        body = %preview(&request.headers, body),
        "HTTP request"
    );
}

pub fn response(response: &Response, origin: &RequestSummary) {
    if !tracing::enabled!(Level::TRACE) {
        return;
    }

    let body = match &response.body {
        Body::Bytes(bytes) => preview(&response.headers, bytes),
        Body::File(path) => format!("<file {}>", path.display()),
    };
    trace!(
        status = response.status.as_u16(),
        method = %origin.method,
        path = %origin.path,
        elapsed_ms = origin.received_at.elapsed().as_secs_f64() * 1000.0,
        body = %body,
        "HTTP response"
    );
}

fn preview(headers: &Headers, body: &[u8]) -> String {
    if body.is_empty() {
        return String::new();
    }

    let textual = headers.get("Content-Type").map(mime::is_textual).unwrap_or(false);
    if !textual {
        return format!("<{} bytes>", body.len());
    }

    let shown = &body[..body.len().min(PREVIEW_LIMIT)];
    let mut text = String::from_utf8_lossy(shown).into_owned();
    if body.len() > PREVIEW_LIMIT {
        text.push_str("...");
    }
    text
}
