// src/server/mod.rs
pub mod builder;
pub mod handler;
mod shutdown;

pub use builder::{serve_listener, ServerBuilder};
pub use handler::RequestHandler;
pub use shutdown::shutdown_signal;
