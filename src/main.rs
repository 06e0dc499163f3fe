use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use taco_http::config::Config;
use taco_http::error::{HttpResponseError, RouteError};
use taco_http::http::request::Method;
use taco_http::routing::{
    uri_mapping, uri_variable_mapping, HandlerContext, Json, RouteHandler, RouteSet, Router,
};
use taco_http::server;

/// Liveness and build information.
struct StatusApi {
    started: Instant,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    uptime_secs: u64,
}

#[derive(Serialize)]
struct Version {
    name: &'static str,
    version: &'static str,
}

impl StatusApi {
    async fn health(self: Arc<Self>, _ctx: HandlerContext) -> anyhow::Result<Json<Health>> {
        Ok(Json(Health {
            status: "ok",
            uptime_secs: self.started.elapsed().as_secs(),
        }))
    }

    async fn version(self: Arc<Self>, _ctx: HandlerContext) -> anyhow::Result<Json<Version>> {
        Ok(Json(Version {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }))
    }

    async fn echo(self: Arc<Self>, ctx: HandlerContext) -> anyhow::Result<Json<serde_json::Value>> {
        let word = ctx
            .uri_variables()
            .get("word")
            .filter(|w| !w.is_empty())
            .ok_or_else(|| HttpResponseError::bad_request("nothing to echo"))?;

        Ok(Json(serde_json::json!({ "echo": word })))
    }
}

impl RouteHandler for StatusApi {
    fn routes(self: Arc<Self>, routes: &mut RouteSet) -> Result<(), RouteError> {
        routes
            .map_all(
                [
                    uri_mapping("/healthz", Method::GET),
                    uri_mapping("/api/v1/health", Method::GET),
                ],
                &self,
                Self::health,
            )
            .map(uri_mapping("/api/v1/version", Method::GET), &self, Self::version)
            .map(
                uri_variable_mapping("/api/v1/echo/{word}", Method::GET)?,
                &self,
                Self::echo,
            );
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::load()?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cfg.log_level())
        .init();

    let mut router = Router::new();
    router.add_handler(Arc::new(StatusApi {
        started: Instant::now(),
    }))?;

    server::listener::run(&cfg, router).await
}
