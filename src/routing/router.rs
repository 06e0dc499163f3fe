use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::RouteError;
use crate::http::request::Method;
use crate::routing::context::{HandlerContext, UriVariables};
use crate::routing::handler::{handler_fn, Handler, Reply, RouteHandler, RouteSet};
use crate::routing::route::{RoutePath, UriRoute};

/// A registered route and the handler serving it.
#[derive(Clone)]
pub struct RouteEntry {
    pub route: UriRoute,
    pub handler: Handler,
}

/// A resolved request: the route, its handler and the captures from the path.
pub struct RouteMatch<'a> {
    pub route: &'a UriRoute,
    pub handler: &'a Handler,
    pub uri_variables: UriVariables,
    pub path_groups: Vec<Option<String>>,
}

/// Routing table.
///
/// Literal routes live in a map keyed by `"{METHOD}:{path}"`; pattern routes
/// are kept in registration order and scanned linearly. Literal routes are
/// always checked first, and among pattern routes the first one registered
/// wins. The table is built at startup and shared read-only afterwards.
#[derive(Default)]
pub struct Router {
    exact: HashMap<String, RouteEntry>,
    patterns: Vec<RouteEntry>,
}

fn route_key(method: &Method, path: &str) -> String {
    format!("{}:{}", method, path)
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every route declared by `handler`, in declaration order.
    ///
    /// Returns the number of route descriptors registered.
    pub fn add_handler<H: RouteHandler>(&mut self, handler: Arc<H>) -> Result<usize, RouteError> {
        let mut routes = RouteSet::new();
        handler.routes(&mut routes)?;

        let count = routes.len();
        for (route, handler) in routes {
            self.register(route, handler);
        }

        debug!(
            handler = std::any::type_name::<H>(),
            routes = count,
            "Registered handler"
        );
        Ok(count)
    }

    /// Registers one route.
    ///
    /// A literal route registered again for the same method and path
    /// replaces the earlier registration.
    pub fn register(&mut self, route: UriRoute, handler: Handler) {
        match route.path() {
            RoutePath::Literal(path) => {
                for method in route.methods().iter() {
                    let key = route_key(method, path);
                    debug!(route = %key, "Registered exact route");

                    let entry = RouteEntry {
                        route: route.clone(),
                        handler: Arc::clone(&handler),
                    };
                    if self.exact.insert(key.clone(), entry).is_some() {
                        warn!(route = %key, "Exact route registered twice, last registration wins");
                    }
                }
            }
            RoutePath::Pattern { source, .. } => {
                debug!(
                    pattern = %source,
                    methods = ?route.methods(),
                    priority = self.patterns.len(),
                    "Registered pattern route"
                );
                self.patterns.push(RouteEntry { route, handler });
            }
        }
    }

    /// Registers `route` with a free async closure.
    pub fn register_fn<F, Fut, R>(&mut self, route: UriRoute, f: F)
    where
        F: Fn(HandlerContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
        R: Reply + 'static,
    {
        self.register(route, handler_fn(f));
    }

    /// Resolves `method` and `path` to a route.
    pub fn find_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        if let Some(entry) = self.exact.get(&route_key(method, path)) {
            return Some(RouteMatch {
                route: &entry.route,
                handler: &entry.handler,
                uri_variables: UriVariables::default(),
                path_groups: Vec::new(),
            });
        }

        self.patterns.iter().find_map(|entry| {
            entry.route.matches(method, path).map(|m| RouteMatch {
                route: &entry.route,
                handler: &entry.handler,
                uri_variables: m.uri_variables,
                path_groups: m.groups,
            })
        })
    }

    /// Number of `"{METHOD}:{path}"` keys in the exact-match map.
    pub fn exact_len(&self) -> usize {
        self.exact.len()
    }

    pub fn pattern_len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.patterns.is_empty()
    }
}
