//! Error types shared by the routing layer and handlers.

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

use crate::http::headers::Headers;
use crate::http::response::{InvalidStatusCode, Response, StatusCode};

/// Errors raised while building route descriptors.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid route pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("invalid path template `{template}`: {reason}")]
    InvalidTemplate { template: String, reason: &'static str },

    #[error("path template `{template}` declares `{{{name}}}` more than once")]
    DuplicateVariable { template: String, name: String },
}

/// A handler-signalled HTTP response.
///
/// Returning this from a handler (directly or through `anyhow::Error`)
/// bypasses normal reply handling: its status, headers and body are sent as
/// they are.
///
/// ```
/// # use taco_http::error::HttpResponseError;
/// # use taco_http::http::response::StatusCode;
/// let err = HttpResponseError::new(StatusCode::Forbidden)
///     .with_header("X-Reason", "not a guild admin")
///     .with_body("forbidden");
/// let response = err.into_response();
/// assert_eq!(response.status, StatusCode::Forbidden);
/// ```
#[derive(Debug, Clone, Error)]
#[error("{} {}", .status.as_u16(), .status.reason_phrase())]
pub struct HttpResponseError {
    pub status: StatusCode,
    pub headers: Headers,
    pub body: Bytes,
}

impl HttpResponseError {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    /// Validates a numeric status code before building the error.
    pub fn from_code(code: u16) -> Result<Self, InvalidStatusCode> {
        Ok(Self::new(StatusCode::from_u16(code)?))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BadRequest).with_message(message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Forbidden).with_message(message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NotFound).with_message(message)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body of the form `{"error": message}`.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        #[derive(Serialize)]
        struct ErrorBody {
            error: String,
        }

        let body = ErrorBody { error: message.into() };
        match serde_json::to_vec(&body) {
            Ok(json) => self.with_header("Content-Type", "application/json").with_body(json),
            Err(_) => self,
        }
    }

    pub fn into_response(self) -> Response {
        Response::builder(self.status)
            .headers(&self.headers)
            .body(self.body)
            .build()
    }
}
