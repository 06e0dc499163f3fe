use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use bytes::Bytes;

use crate::http::headers::Headers;

/// HTTP request methods.
///
/// Represents the HTTP method/verb of a request. Route descriptors carry one
/// or more of these. Any other syntactically valid token is kept as
/// [`Method::Other`] so it can still be routed (and usually miss with a 404).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// TRACE - Message loop-back test
    TRACE,
    /// Extension method such as `PURGE` or `PROPFIND`
    Other(String),
}

/// Decoded query string.
///
/// Keys map to every value they were given, in order of appearance. Blank
/// values (`?a=&b=1`) are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: HashMap<String, Vec<String>>,
}

/// Represents a parsed HTTP request from a client.
///
/// The `path` never carries the query string; it is decoded into
/// `query_params` instead. `received_at` marks when the request line was
/// parsed and is used to report execution time on the way out.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request path with the query string stripped (e.g., "/api/v1/health")
    pub path: String,
    /// Decoded query string parameters
    pub query_params: QueryParams,
    /// HTTP version (typically "HTTP/1.1")
    pub version: String,
    /// Request headers
    pub headers: Headers,
    /// Request body, absent when no positive Content-Length was sent
    pub body: Option<Bytes>,
    /// Monotonic timestamp of when the request was parsed
    pub received_at: Instant,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Option<String>,
    headers: Headers,
    body: Option<Bytes>,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// # Arguments
    ///
    /// * `s` - Method token as sent on the request line (case-sensitive)
    ///
    /// # Returns
    ///
    /// `Some(Method)` for any valid token, with unregistered tokens kept as
    /// [`Method::Other`]. `None` if `s` is empty or contains characters a
    /// token may not carry.
    ///
    /// # Example
    ///
    /// ```
    /// # use taco_http::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("PURGE"), Some(Method::Other("PURGE".to_string())));
    /// assert_eq!(Method::from_str("GE(T"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        let method = match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "HEAD" => Method::HEAD,
            "OPTIONS" => Method::OPTIONS,
            "PATCH" => Method::PATCH,
            "TRACE" => Method::TRACE,
            _ if is_token(s) => Method::Other(s.to_string()),
            _ => return None,
        };
        Some(method)
    }

    /// The method token as it appears on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::TRACE => "TRACE",
            Method::Other(token) => token,
        }
    }
}

/// RFC 9110 `token`: one or more `tchar`.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl QueryParams {
    /// Decodes an `application/x-www-form-urlencoded` query string.
    ///
    /// ```
    /// # use taco_http::http::request::QueryParams;
    /// let q = QueryParams::parse("tag=a&tag=b&empty=&name=taco%20bot");
    /// assert_eq!(q.get_all("tag"), ["a", "b"]);
    /// assert_eq!(q.get("name"), Some("taco bot"));
    /// assert!(!q.contains("empty"));
    /// ```
    pub fn parse(query: &str) -> Self {
        let mut params: HashMap<String, Vec<String>> = HashMap::new();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            params
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }

        Self { params }
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(|v| v.first())
            .map(|v| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.params.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            version: None,
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the request target; a query string after `?` is decoded into
    /// the query parameters.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(key, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        let target = self.path.ok_or("path missing")?;
        let (path, query_params) = split_target(&target);

        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path,
            query_params,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            body: self.body,
            received_at: Instant::now(),
        })
    }
}

/// Splits a request target into a cleaned path and its decoded query.
///
/// A leading run of slashes is collapsed to one so `//host/x` can never be
/// read as a scheme-relative URI.
pub(crate) fn split_target(target: &str) -> (String, QueryParams) {
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, QueryParams::parse(query)),
        None => (target, QueryParams::default()),
    };

    let path = if path.starts_with("//") {
        format!("/{}", path.trim_start_matches('/'))
    } else {
        path.to_string()
    };

    (path, query)
}

impl Request {
    /// Retrieves a header value by name (case-insensitive).
    ///
    /// # Arguments
    ///
    /// * `key` - Header name to look up
    ///
    /// # Returns
    ///
    /// `Some(&str)` with the first header value if present, `None` otherwise.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Retrieves the Content-Length header value.
    ///
    /// Returns `None` if the header is missing or not a valid number.
    pub fn content_length(&self) -> Option<usize> {
        self.header("Content-Length").and_then(|v| v.trim().parse().ok())
    }

    /// The `Content-Type` header, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// Determines whether the connection should remain open after the response.
    ///
    /// Checks the Connection header. For HTTP/1.1, the default is `true` (keep-alive).
    /// If Connection: close is specified, returns `false`.
    pub fn keep_alive(&self) -> bool {
        self.header("Connection")
            .map(|v| !v.eq_ignore_ascii_case("close"))
            .unwrap_or(true) // HTTP/1.1 default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_target_collapses_leading_slashes() {
        let (path, query) = split_target("///evil.com/a?x=1");
        assert_eq!(path, "/evil.com/a");
        assert_eq!(query.get("x"), Some("1"));
    }

    #[test]
    fn split_target_keeps_inner_slashes() {
        let (path, _) = split_target("/a//b");
        assert_eq!(path, "/a//b");
    }

    #[test]
    fn token_rejects_separators() {
        assert!(is_token("M-SEARCH"));
        assert!(!is_token(""));
        assert!(!is_token("GE T"));
        assert!(!is_token("{GET}"));
    }
}
