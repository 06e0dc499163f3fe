use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

use crate::http::headers::Headers;
use crate::http::mime;

/// Error raised when a numeric status code is not a registered HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown HTTP status code: {0}")]
pub struct InvalidStatusCode(pub u16);

macro_rules! status_codes {
    ($( $(#[$doc:meta])* $variant:ident = $code:literal, $reason:literal; )+) => {
        /// HTTP status codes supported by the server.
        ///
        /// Only registered codes are representable, so a response can never
        /// carry a status line the client would fail to understand. Use
        /// [`StatusCode::from_u16`] to validate a numeric code.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum StatusCode {
            $( $(#[$doc])* $variant, )+
        }

        impl StatusCode {
            /// Returns the numeric HTTP status code.
            ///
            /// # Example
            ///
            /// ```
            /// # use taco_http::http::response::StatusCode;
            /// assert_eq!(StatusCode::Ok.as_u16(), 200);
            /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
            /// ```
            pub fn as_u16(&self) -> u16 {
                match self {
                    $( StatusCode::$variant => $code, )+
                }
            }

            /// Returns the standard HTTP reason phrase for this status code.
            ///
            /// # Example
            ///
            /// ```
            /// # use taco_http::http::response::StatusCode;
            /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
            /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
            /// ```
            pub fn reason_phrase(&self) -> &'static str {
                match self {
                    $( StatusCode::$variant => $reason, )+
                }
            }

            /// Looks up a numeric status code.
            ///
            /// ```
            /// # use taco_http::http::response::StatusCode;
            /// assert_eq!(StatusCode::from_u16(401), Ok(StatusCode::Unauthorized));
            /// assert!(StatusCode::from_u16(299).is_err());
            /// ```
            pub fn from_u16(code: u16) -> Result<Self, InvalidStatusCode> {
                match code {
                    $( $code => Ok(StatusCode::$variant), )+
                    other => Err(InvalidStatusCode(other)),
                }
            }
        }
    };
}

status_codes! {
    /// 100 Continue
    Continue = 100, "Continue";
    /// 101 Switching Protocols
    SwitchingProtocols = 101, "Switching Protocols";
    /// 200 OK
    Ok = 200, "OK";
    /// 201 Created
    Created = 201, "Created";
    /// 202 Accepted
    Accepted = 202, "Accepted";
    /// 204 No Content
    NoContent = 204, "No Content";
    /// 206 Partial Content
    PartialContent = 206, "Partial Content";
    /// 301 Moved Permanently
    MovedPermanently = 301, "Moved Permanently";
    /// 302 Found
    Found = 302, "Found";
    /// 303 See Other
    SeeOther = 303, "See Other";
    /// 304 Not Modified
    NotModified = 304, "Not Modified";
    /// 307 Temporary Redirect
    TemporaryRedirect = 307, "Temporary Redirect";
    /// 308 Permanent Redirect
    PermanentRedirect = 308, "Permanent Redirect";
    /// 400 Bad Request
    BadRequest = 400, "Bad Request";
    /// 401 Unauthorized
    Unauthorized = 401, "Unauthorized";
    /// 403 Forbidden
    Forbidden = 403, "Forbidden";
    /// 404 Not Found
    NotFound = 404, "Not Found";
    /// 405 Method Not Allowed
    MethodNotAllowed = 405, "Method Not Allowed";
    /// 406 Not Acceptable
    NotAcceptable = 406, "Not Acceptable";
    /// 408 Request Timeout
    RequestTimeout = 408, "Request Timeout";
    /// 409 Conflict
    Conflict = 409, "Conflict";
    /// 410 Gone
    Gone = 410, "Gone";
    /// 411 Length Required
    LengthRequired = 411, "Length Required";
    /// 413 Content Too Large
    PayloadTooLarge = 413, "Content Too Large";
    /// 415 Unsupported Media Type
    UnsupportedMediaType = 415, "Unsupported Media Type";
    /// 422 Unprocessable Content
    UnprocessableEntity = 422, "Unprocessable Content";
    /// 429 Too Many Requests
    TooManyRequests = 429, "Too Many Requests";
    /// 431 Request Header Fields Too Large
    RequestHeaderFieldsTooLarge = 431, "Request Header Fields Too Large";
    /// 500 Internal Server Error
    InternalServerError = 500, "Internal Server Error";
    /// 501 Not Implemented
    NotImplemented = 501, "Not Implemented";
    /// 502 Bad Gateway
    BadGateway = 502, "Bad Gateway";
    /// 503 Service Unavailable
    ServiceUnavailable = 503, "Service Unavailable";
    /// 504 Gateway Timeout
    GatewayTimeout = 504, "Gateway Timeout";
}

impl TryFrom<u16> for StatusCode {
    type Error = InvalidStatusCode;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        StatusCode::from_u16(code)
    }
}

/// Response payload: in-memory bytes or a file streamed from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Bytes(Bytes),
    File(PathBuf),
}

impl Body {
    pub fn empty() -> Self {
        Body::Bytes(Bytes::new())
    }

    /// In-memory bytes; empty for file bodies.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Bytes(b) => b,
            Body::File(_) => &[],
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Body::File(_))
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
///
/// `Content-Length` is not tracked here: the writer computes it from the
/// body when the response is serialized.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// HTTP headers
    pub headers: Headers,
    /// Response body
    pub body: Body,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use taco_http::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "application/json")
///     .body(b"{}".to_vec())
///     .build();
/// assert_eq!(response.body.as_bytes(), b"{}");
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Headers,
    body: Body,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Body::empty(),
        }
    }

    /// Appends a header value. Repeated calls with the same name keep every value.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(key, value);
        self
    }

    /// Merges a whole header set into the builder.
    pub fn headers(mut self, headers: &Headers) -> Self {
        self.headers.merge(headers);
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Body::Bytes(body.into());
        self
    }

    /// Streams the file at `path` as the body.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.body = Body::File(path.into());
        self
    }

    /// Builds the final Response.
    pub fn build(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    pub fn builder(status: StatusCode) -> ResponseBuilder {
        ResponseBuilder::new(status)
    }

    /// Creates a response from a numeric status code, rejecting unknown codes.
    pub fn with_status_code(code: u16) -> Result<Self, InvalidStatusCode> {
        Ok(ResponseBuilder::new(StatusCode::from_u16(code)?).build())
    }

    /// Creates a simple 200 OK response with the given body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        ResponseBuilder::new(StatusCode::Ok).body(body).build()
    }

    /// Creates a 200 OK `text/plain` response.
    pub fn text(body: impl Into<String>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body.into())
            .build()
    }

    /// Serializes `value` as the body of an `application/json` response.
    pub fn json<T: Serialize + ?Sized>(
        status: StatusCode,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(ResponseBuilder::new(status)
            .header("Content-Type", "application/json")
            .body(body)
            .build())
    }

    /// Creates a 204 No Content response.
    pub fn no_content() -> Self {
        ResponseBuilder::new(StatusCode::NoContent).build()
    }

    /// Creates a 200 response that streams `path` from disk.
    ///
    /// The `Content-Type` is guessed from the file extension.
    pub fn file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", mime::from_path(path))
            .file(path)
            .build()
    }

    /// Creates a 400 Bad Request response.
    pub fn bad_request() -> Self {
        ResponseBuilder::new(StatusCode::BadRequest)
            .body(&b"400 Bad Request"[..])
            .build()
    }

    /// Creates a 401 Unauthorized response.
    pub fn unauthorized() -> Self {
        ResponseBuilder::new(StatusCode::Unauthorized)
            .body(&b"401 Unauthorized"[..])
            .build()
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        ResponseBuilder::new(StatusCode::NotFound)
            .body(&b"404 Not Found"[..])
            .build()
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_error() -> Self {
        ResponseBuilder::new(StatusCode::InternalServerError)
            .body(&b"500 Internal Server Error"[..])
            .build()
    }
}
