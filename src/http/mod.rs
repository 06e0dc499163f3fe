//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 wire side of the server: parsing
//! `Content-Length` framed requests, serializing responses, and driving one
//! keep-alive connection through repeated request/response cycles.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: The main connection handler implementing the request-response state machine
//! - **`headers`**: Multi-valued, case-insensitive header map
//! - **`parser`**: Parses incoming HTTP requests from byte buffers
//! - **`request`**: HTTP request representation and query string decoding
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`mime`**: MIME type detection based on file extensions
//! - **`log`**: Trace-level request/response logging
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for incoming request data
//!        └──────┬──────┘
//!               │ Request received
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Route, check auth, run handler
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closed
//! ```
//!
//! EOF, a read timeout or a malformed request also lead to `Closed`.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use taco_http::http::connection::Connection;
//! use taco_http::http::headers::Headers;
//! use taco_http::routing::Router;
//! use taco_http::server::dispatcher::Dispatcher;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let dispatcher = Arc::new(Dispatcher::new(Arc::new(Router::new()), Headers::new()));
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let dispatcher = dispatcher.clone();
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, dispatcher, Duration::from_secs(30));
//!             if let Err(e) = conn.run().await {
//!                 tracing::warn!(error = %e, "Connection error");
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod headers;
pub mod log;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
