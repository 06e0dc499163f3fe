//! Route descriptors: an immutable binding of a path rule, a method set and
//! an optional auth callback.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::RouteError;
use crate::http::request::{Method, Request};
use crate::routing::context::UriVariables;

/// Predicate run before a handler; returning `false` rejects the request with 401.
pub type AuthCallback = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

/// One or more HTTP methods a route answers to, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSet(Vec<Method>);

impl MethodSet {
    pub fn contains(&self, method: &Method) -> bool {
        self.0.contains(method)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Method> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Method> for MethodSet {
    fn from(method: Method) -> Self {
        MethodSet(vec![method])
    }
}

impl<const N: usize> From<[Method; N]> for MethodSet {
    fn from(methods: [Method; N]) -> Self {
        MethodSet(methods.to_vec())
    }
}

impl From<&[Method]> for MethodSet {
    fn from(methods: &[Method]) -> Self {
        MethodSet(methods.to_vec())
    }
}

impl From<Vec<Method>> for MethodSet {
    fn from(methods: Vec<Method>) -> Self {
        MethodSet(methods)
    }
}

/// How a route matches a request path.
#[derive(Debug, Clone)]
pub enum RoutePath {
    /// Exact string comparison
    Literal(String),
    /// Full-string regular expression match
    Pattern {
        /// Expression as written by the route author
        source: String,
        /// `source` wrapped as `^(?:source)$`
        regex: Regex,
    },
}

impl RoutePath {
    pub(crate) fn pattern(source: impl Into<String>) -> Result<Self, RouteError> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{})$", source)).map_err(|e| {
            RouteError::InvalidPattern {
                pattern: source.clone(),
                source: Box::new(e),
            }
        })?;
        Ok(RoutePath::Pattern { source, regex })
    }

    pub fn as_str(&self) -> &str {
        match self {
            RoutePath::Literal(path) => path,
            RoutePath::Pattern { source, .. } => source,
        }
    }
}

/// Captures extracted from a matched pattern route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMatch {
    /// Template variables, in declaration order
    pub uri_variables: UriVariables,
    /// Every capture group after the whole match, by position
    pub groups: Vec<Option<String>>,
}

/// A route descriptor.
///
/// Built through [`uri_mapping`](crate::routing::uri_mapping),
/// [`uri_pattern_mapping`](crate::routing::uri_pattern_mapping) or
/// [`uri_variable_mapping`](crate::routing::uri_variable_mapping) and never
/// changed once registered.
#[derive(Clone)]
pub struct UriRoute {
    path: RoutePath,
    methods: MethodSet,
    variable_names: Vec<String>,
    auth_callback: Option<AuthCallback>,
}

impl UriRoute {
    pub(crate) fn new(path: RoutePath, methods: MethodSet, variable_names: Vec<String>) -> Self {
        Self {
            path,
            methods,
            variable_names,
            auth_callback: None,
        }
    }

    /// Runs `callback` against each request before the handler.
    pub fn with_auth_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        self.auth_callback = Some(Arc::new(callback));
        self
    }

    pub fn path(&self) -> &RoutePath {
        &self.path
    }

    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    pub fn variable_names(&self) -> &[String] {
        &self.variable_names
    }

    pub fn auth_callback(&self) -> Option<&AuthCallback> {
        self.auth_callback.as_ref()
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.path, RoutePath::Literal(_))
    }

    /// Matches `method` and `path` against this route.
    ///
    /// Pattern routes must match the whole path. The returned variables are
    /// built by pairing the declared variable names with their captures.
    pub fn matches(&self, method: &Method, path: &str) -> Option<PathMatch> {
        if !self.methods.contains(method) {
            return None;
        }

        match &self.path {
            RoutePath::Literal(literal) => (literal == path).then(PathMatch::default),
            RoutePath::Pattern { regex, .. } => {
                let caps = regex.captures(path)?;

                let uri_variables = self
                    .variable_names
                    .iter()
                    .map(|name| {
                        let value = caps.name(name).map(|m| m.as_str()).unwrap_or_default();
                        (name.clone(), value.to_string())
                    })
                    .collect();

                let groups = caps
                    .iter()
                    .skip(1)
                    .map(|g| g.map(|m| m.as_str().to_string()))
                    .collect();

                Some(PathMatch { uri_variables, groups })
            }
        }
    }
}

impl fmt::Debug for UriRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UriRoute")
            .field("path", &self.path.as_str())
            .field("methods", &self.methods)
            .field("variable_names", &self.variable_names)
            .field("auth_callback", &self.auth_callback.is_some())
            .finish()
    }
}
