use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::http::connection::Connection;
use crate::http::headers::Headers;
use crate::routing::Router;
use crate::server::dispatcher::Dispatcher;

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Stops a running [`HttpServer`] from another task.
#[derive(Clone)]
pub struct ServerHandle {
    shutdown: Arc<Notify>,
}

impl ServerHandle {
    /// Stops accepting connections. Connections already being served run
    /// to completion.
    pub fn close(&self) {
        self.shutdown.notify_one();
    }
}

/// The HTTP server: a routing table, default response headers and a listener.
///
/// Default headers may only be added before [`serve_forever`](Self::serve_forever);
/// the routing table is frozen when the server is created.
pub struct HttpServer {
    router: Arc<Router>,
    default_headers: Headers,
    read_timeout: Duration,
    listener: Option<TcpListener>,
    shutdown: Arc<Notify>,
}

impl HttpServer {
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
            default_headers: Headers::new(),
            read_timeout: DEFAULT_READ_TIMEOUT,
            listener: None,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Creates a server using the timeout and default headers from `cfg`.
    pub fn from_config(router: Router, cfg: &Config) -> Self {
        let mut server = Self::new(router).with_read_timeout(cfg.server.read_timeout());
        server.add_default_response_headers(&cfg.server.default_headers());
        server
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Seeds headers merged into every outgoing response.
    pub fn add_default_response_headers(&mut self, headers: &Headers) {
        self.default_headers.merge(headers);
    }

    pub fn default_response_headers(&self) -> &Headers {
        &self.default_headers
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Binds the listening socket and returns its address.
    pub async fn start(&mut self, host: &str, port: u16) -> anyhow::Result<SocketAddr> {
        let listener = TcpListener::bind((host, port))
            .await
            .with_context(|| format!("failed to bind {}:{}", host, port))?;
        let addr = listener.local_addr()?;

        info!("Listening on {}", addr);
        self.listener = Some(listener);
        Ok(addr)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    /// Stops the accept loop; see [`ServerHandle::close`].
    pub fn close(&self) {
        self.handle().close();
    }

    /// Accepts connections until closed, serving each on its own task.
    pub async fn serve_forever(&mut self) -> anyhow::Result<()> {
        let listener = self
            .listener
            .take()
            .context("serve_forever called before start")?;
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&self.router),
            self.default_headers.clone(),
        ));

        loop {
            let (socket, peer) = tokio::select! {
                _ = self.shutdown.notified() => {
                    info!("Server closed");
                    break;
                }

                accepted = listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "Failed to accept connection");
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        continue;
                    }
                },
            };
            debug!("Accepted connection from {}", peer);

            let dispatcher = Arc::clone(&dispatcher);
            let read_timeout = self.read_timeout;
            tokio::spawn(async move {
                let mut conn = Connection::new(socket, dispatcher, read_timeout);
                match conn.run().await {
                    Ok(()) => debug!("Connection from {} closed", peer),
                    Err(e) if e.is_expected() => {
                        debug!(error = %e, "Connection from {} ended", peer)
                    }
                    Err(e) => warn!(error = %e, "Connection error from {}", peer),
                }
            });
        }

        Ok(())
    }
}

/// Runs a server built from `cfg` until Ctrl-C.
pub async fn run(cfg: &Config, router: Router) -> anyhow::Result<()> {
    let (host, port) = cfg.server.host_port()?;

    let mut server = HttpServer::from_config(router, cfg);
    server.start(&host, port).await?;

    let handle = server.handle();
    tokio::select! {
        res = server.serve_forever() => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
            handle.close();
        }
    }

    Ok(())
}
