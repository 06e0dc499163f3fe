//! Route declarations placed beside handler methods.
//!
//! Three flavours produce the same [`UriRoute`] shape:
//!
//! - [`uri_mapping`]: exact path
//! - [`uri_pattern_mapping`]: raw regular expression, captures handled by the handler
//! - [`uri_variable_mapping`]: `{name}` template, captures exposed by name
//!
//! ```
//! # use taco_http::http::request::Method;
//! # use taco_http::routing::{uri_mapping, uri_variable_mapping};
//! let health = uri_mapping("/healthz", Method::GET);
//! let roles = uri_variable_mapping("/api/v1/guild/{guild_id}/roles", [Method::GET, Method::POST])?;
//! assert!(health.is_literal());
//! assert_eq!(roles.variable_names(), ["guild_id"]);
//! # Ok::<(), taco_http::error::RouteError>(())
//! ```

use crate::error::RouteError;
use crate::routing::route::{MethodSet, RoutePath, UriRoute};

/// Placeholders match any run of non-slash characters.
const VARIABLE_PATTERN: &str = "[^/]*";

/// Declares an exact-path route.
pub fn uri_mapping(path: impl Into<String>, methods: impl Into<MethodSet>) -> UriRoute {
    UriRoute::new(RoutePath::Literal(path.into()), methods.into(), Vec::new())
}

/// Declares an exact-path route guarded by `auth_callback`.
pub fn uri_mapping_with_auth<F>(
    path: impl Into<String>,
    methods: impl Into<MethodSet>,
    auth_callback: F,
) -> UriRoute
where
    F: Fn(&crate::http::request::Request) -> bool + Send + Sync + 'static,
{
    uri_mapping(path, methods).with_auth_callback(auth_callback)
}

/// Declares a route matched by a raw regular expression.
///
/// The whole path must match. No variable names are recorded; the handler
/// reads captures from [`HandlerContext::path_groups`](crate::routing::HandlerContext::path_groups).
pub fn uri_pattern_mapping(
    pattern: impl Into<String>,
    methods: impl Into<MethodSet>,
) -> Result<UriRoute, RouteError> {
    Ok(UriRoute::new(RoutePath::pattern(pattern)?, methods.into(), Vec::new()))
}

/// Declares a route from a `{name}` path template.
pub fn uri_variable_mapping(
    template: impl Into<String>,
    methods: impl Into<MethodSet>,
) -> Result<UriRoute, RouteError> {
    let template = template.into();
    let (pattern, names) = compile_template(&template)?;
    Ok(UriRoute::new(RoutePath::pattern(pattern)?, methods.into(), names))
}

/// Expands `{name}` placeholders into named groups.
///
/// Literal text is escaped. Returns the anchored expression and the
/// placeholder names in the order they appear.
pub(crate) fn compile_template(template: &str) -> Result<(String, Vec<String>), RouteError> {
    let invalid = |reason| RouteError::InvalidTemplate {
        template: template.to_string(),
        reason,
    };

    let mut pattern = String::with_capacity(template.len() + 16);
    let mut names: Vec<String> = Vec::new();
    let mut rest = template;

    pattern.push('^');
    while let Some(open) = rest.find(['{', '}']) {
        if rest[open..].starts_with('}') {
            return Err(invalid("unmatched `}`"));
        }

        pattern.push_str(&regex::escape(&rest[..open]));

        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| invalid("unclosed `{`"))?;
        let name = &after[..close];

        if name.is_empty() {
            return Err(invalid("empty placeholder"));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            || name.starts_with(|c: char| c.is_ascii_digit())
        {
            return Err(invalid("placeholder names must be identifiers"));
        }
        if names.iter().any(|n| n == name) {
            return Err(RouteError::DuplicateVariable {
                template: template.to_string(),
                name: name.to_string(),
            });
        }

        pattern.push_str(&format!("(?P<{}>{})", name, VARIABLE_PATTERN));
        names.push(name.to_string());
        rest = &after[close + 1..];
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push('$');

    Ok((pattern, names))
}
