use std::collections::HashMap;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::HttpResponseError;
use crate::http::headers::Headers;
use crate::http::request::{QueryParams, Request};
use crate::routing::route::AuthCallback;

/// Values captured by `{name}` placeholders, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriVariables(Vec<(String, String)>);

impl UriVariables {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rfind(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_map(&self) -> HashMap<String, String> {
        self.0.iter().cloned().collect()
    }
}

impl FromIterator<(String, String)> for UriVariables {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        UriVariables(iter.into_iter().collect())
    }
}

/// Everything a handler can ask about the request it is serving.
///
/// Handlers take what they need from here instead of declaring it in their
/// signature.
pub struct HandlerContext {
    request: Request,
    uri_variables: UriVariables,
    path_groups: Vec<Option<String>>,
    auth_callback: Option<AuthCallback>,
}

impl HandlerContext {
    pub fn new(
        request: Request,
        uri_variables: UriVariables,
        path_groups: Vec<Option<String>>,
        auth_callback: Option<AuthCallback>,
    ) -> Self {
        Self {
            request,
            uri_variables,
            path_groups,
            auth_callback,
        }
    }

    /// Context for a request with no captures, mostly useful in tests.
    pub fn from_request(request: Request) -> Self {
        Self::new(request, UriVariables::default(), Vec::new(), None)
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn into_request(self) -> Request {
        self.request
    }

    /// Undecoded body bytes, if the request carried any.
    pub fn raw_body(&self) -> Option<&Bytes> {
        self.request.body.as_ref()
    }

    /// Decodes the body as JSON into `T`.
    ///
    /// A missing or malformed body is reported as a 400 response.
    pub fn body<T: DeserializeOwned>(&self) -> Result<T, HttpResponseError> {
        let raw = self.raw_body().map(|b| b.as_ref()).unwrap_or(&[]);
        serde_json::from_slice(raw)
            .map_err(|e| HttpResponseError::bad_request(format!("invalid JSON body: {}", e)))
    }

    /// Decodes the body as untyped JSON; `None` when there is no body.
    pub fn json_body(&self) -> Result<Option<serde_json::Value>, HttpResponseError> {
        match self.raw_body() {
            Some(_) => self.body().map(Some),
            None => Ok(None),
        }
    }

    pub fn query_params(&self) -> &QueryParams {
        &self.request.query_params
    }

    pub fn headers(&self) -> &Headers {
        &self.request.headers
    }

    pub fn uri_variables(&self) -> &UriVariables {
        &self.uri_variables
    }

    /// Positional capture groups of a pattern route.
    pub fn path_groups(&self) -> &[Option<String>] {
        &self.path_groups
    }

    pub fn auth_callback(&self) -> Option<&AuthCallback> {
        self.auth_callback.as_ref()
    }
}
