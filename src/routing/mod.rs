//! Declarative routing.
//!
//! Handler objects implement [`RouteHandler`] and declare their routes with
//! the mapping functions in [`mapping`]. [`Router::add_handler`] collects
//! those declarations into a routing table:
//!
//! ```text
//!   find_route(method, path)
//!        │
//!        ├─ exact map["{METHOD}:{path}"] ── hit ──▶ literal route
//!        │
//!        └─ pattern list, in registration order
//!               first full match with the method ──▶ pattern route
//!               none ──▶ no route (404)
//! ```

pub mod context;
pub mod handler;
pub mod mapping;
pub mod route;
pub mod router;

pub use context::{HandlerContext, UriVariables};
pub use handler::{handler_fn, method_handler, BoxFuture, Handler, Json, Reply, RouteHandler, RouteSet};
pub use mapping::{uri_mapping, uri_mapping_with_auth, uri_pattern_mapping, uri_variable_mapping};
pub use route::{AuthCallback, MethodSet, PathMatch, RoutePath, UriRoute};
pub use router::{RouteEntry, RouteMatch, Router};
