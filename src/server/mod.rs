//! Server lifecycle and request dispatch.

pub mod dispatcher;
pub mod listener;

pub use dispatcher::Dispatcher;
pub use listener::{HttpServer, ServerHandle};
