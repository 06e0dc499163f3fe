//! Request dispatch: route resolution, auth check, handler invocation and
//! reply normalisation.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::{debug, error, warn};

use crate::error::HttpResponseError;
use crate::http::headers::Headers;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::routing::{HandlerContext, RouteMatch, Router};

/// Turns requests into responses using a frozen routing table.
pub struct Dispatcher {
    router: Arc<Router>,
    default_headers: Headers,
}

enum Outcome {
    Handled(Response),
    Unauthorized,
}

impl Dispatcher {
    pub fn new(router: Arc<Router>, default_headers: Headers) -> Self {
        Self {
            router,
            default_headers,
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn default_headers(&self) -> &Headers {
        &self.default_headers
    }

    /// Produces the response for `request`.
    ///
    /// Never fails: unmatched routes become 404, rejected auth 401, and
    /// handler errors or panics 500. Default headers are merged into every
    /// response.
    pub async fn dispatch(&self, request: Request) -> Response {
        let mut response = match self.router.find_route(&request.method, &request.path) {
            Some(found) => self.invoke(found, request).await,
            None => {
                debug!(method = %request.method, path = %request.path, "No route matched");
                Response::not_found()
            }
        };

        response.headers.merge(&self.default_headers);
        response
    }

    async fn invoke(&self, found: RouteMatch<'_>, request: Request) -> Response {
        let RouteMatch {
            route,
            handler,
            uri_variables,
            path_groups,
        } = found;

        let auth_callback = route.auth_callback().cloned();
        let handler = Arc::clone(handler);
        let method = request.method.clone();
        let path = request.path.clone();

        let call = async move {
            if let Some(callback) = &auth_callback {
                if !callback(&request) {
                    return Ok(Outcome::Unauthorized);
                }
            }

            let ctx = HandlerContext::new(request, uri_variables, path_groups, auth_callback);
            handler(ctx).await.map(Outcome::Handled)
        };

        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(Outcome::Handled(response))) => response,
            Ok(Ok(Outcome::Unauthorized)) => {
                debug!(method = %method, path = %path, "Auth callback rejected request");
                Response::unauthorized()
            }
            Ok(Err(err)) => match err.downcast::<HttpResponseError>() {
                Ok(http_err) => {
                    warn!(
                        method = %method,
                        path = %path,
                        status = http_err.status.as_u16(),
                        "Handler returned HTTP error"
                    );
                    http_err.into_response()
                }
                Err(err) => {
                    error!(method = %method, path = %path, error = ?err, "Handler failed");
                    Response::internal_error()
                }
            },
            Err(panic) => {
                error!(
                    method = %method,
                    path = %path,
                    panic = %panic_message(panic.as_ref()),
                    "Handler panicked"
                );
                Response::internal_error()
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
