//! Handler types and the registration surface used by handler objects.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;

use crate::error::RouteError;
use crate::http::response::{Response, StatusCode};
use crate::routing::context::HandlerContext;
use crate::routing::route::UriRoute;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// A type-erased route handler.
pub type Handler = Arc<dyn Fn(HandlerContext) -> BoxFuture<anyhow::Result<Response>> + Send + Sync>;

/// Converts a handler's return value into a response.
///
/// - [`Response`] is sent as is
/// - `()`, `None` and JSON `null` become 204 No Content
/// - [`Json`] and [`serde_json::Value`] become 200 `application/json`
pub trait Reply {
    fn into_response(self) -> anyhow::Result<Response>;
}

/// Serializes the wrapped value as a JSON response body.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl Reply for Response {
    fn into_response(self) -> anyhow::Result<Response> {
        Ok(self)
    }
}

impl Reply for () {
    fn into_response(self) -> anyhow::Result<Response> {
        Ok(Response::no_content())
    }
}

impl<R: Reply> Reply for Option<R> {
    fn into_response(self) -> anyhow::Result<Response> {
        match self {
            Some(reply) => reply.into_response(),
            None => Ok(Response::no_content()),
        }
    }
}

impl<T: Serialize> Reply for Json<T> {
    fn into_response(self) -> anyhow::Result<Response> {
        let body = serde_json::to_vec(&self.0)?;
        if body == b"null" {
            return Ok(Response::no_content());
        }
        Ok(Response::builder(StatusCode::Ok)
            .header("Content-Type", "application/json")
            .body(body)
            .build())
    }
}

impl Reply for serde_json::Value {
    fn into_response(self) -> anyhow::Result<Response> {
        Json(self).into_response()
    }
}

/// Wraps an async closure as a [`Handler`].
pub fn handler_fn<F, Fut, R>(f: F) -> Handler
where
    F: Fn(HandlerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    R: Reply + 'static,
{
    Arc::new(move |ctx: HandlerContext| -> BoxFuture<anyhow::Result<Response>> {
        let fut = f(ctx);
        Box::pin(async move { fut.await?.into_response() })
    })
}

/// Binds a method of a shared handler object as a [`Handler`].
pub fn method_handler<H, F, Fut, R>(target: &Arc<H>, method: F) -> Handler
where
    H: Send + Sync + 'static,
    F: Fn(Arc<H>, HandlerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    R: Reply + 'static,
{
    let target = Arc::clone(target);
    handler_fn(move |ctx| method(Arc::clone(&target), ctx))
}

/// An object whose methods serve routes.
///
/// `routes` declares every route the object serves, in priority order.
///
/// ```
/// # use std::sync::Arc;
/// # use taco_http::error::RouteError;
/// # use taco_http::http::request::Method;
/// # use taco_http::routing::{uri_variable_mapping, HandlerContext, Json, RouteHandler, RouteSet};
/// struct GuildApi;
///
/// impl GuildApi {
///     async fn roles(self: Arc<Self>, ctx: HandlerContext) -> anyhow::Result<Json<serde_json::Value>> {
///         let guild_id = ctx.uri_variables().get("guild_id").unwrap_or_default();
///         Ok(Json(serde_json::json!({ "guild": guild_id, "roles": [] })))
///     }
/// }
///
/// impl RouteHandler for GuildApi {
///     fn routes(self: Arc<Self>, routes: &mut RouteSet) -> Result<(), RouteError> {
///         routes.map(
///             uri_variable_mapping("/api/v1/guild/{guild_id}/roles", Method::GET)?,
///             &self,
///             Self::roles,
///         );
///         Ok(())
///     }
/// }
/// ```
pub trait RouteHandler: Send + Sync + 'static {
    fn routes(self: Arc<Self>, routes: &mut RouteSet) -> Result<(), RouteError>;
}

/// Route declarations collected from a [`RouteHandler`].
#[derive(Default)]
pub struct RouteSet {
    bindings: Vec<(UriRoute, Handler)>,
}

impl RouteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `route` to a method of `target`.
    pub fn map<H, F, Fut, R>(&mut self, route: UriRoute, target: &Arc<H>, method: F) -> &mut Self
    where
        H: Send + Sync + 'static,
        F: Fn(Arc<H>, HandlerContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
        R: Reply + 'static,
    {
        self.bind(route, method_handler(target, method))
    }

    /// Binds several routes to the same method of `target`.
    pub fn map_all<I, H, F, Fut, R>(&mut self, routes: I, target: &Arc<H>, method: F) -> &mut Self
    where
        I: IntoIterator<Item = UriRoute>,
        H: Send + Sync + 'static,
        F: Fn(Arc<H>, HandlerContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
        R: Reply + 'static,
    {
        let handler = method_handler(target, method);
        for route in routes {
            self.bind(route, Arc::clone(&handler));
        }
        self
    }

    /// Binds `route` to a free async closure.
    pub fn map_fn<F, Fut, R>(&mut self, route: UriRoute, f: F) -> &mut Self
    where
        F: Fn(HandlerContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
        R: Reply + 'static,
    {
        self.bind(route, handler_fn(f))
    }

    pub fn bind(&mut self, route: UriRoute, handler: Handler) -> &mut Self {
        self.bindings.push((route, handler));
        self
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl IntoIterator for RouteSet {
    type Item = (UriRoute, Handler);
    type IntoIter = std::vec::IntoIter<(UriRoute, Handler)>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.into_iter()
    }
}
