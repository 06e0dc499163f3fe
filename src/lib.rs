//! taco-http - HTTP server and declarative routing for the taco bot API
//!
//! Core library: a hand-rolled HTTP/1.1 codec, a routing table of literal,
//! pattern and `{variable}` routes, and the per-connection dispatch loop.

pub mod config;
pub mod error;
pub mod http;
pub mod routing;
pub mod server;
