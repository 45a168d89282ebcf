//! # Web Library
//!
//! HTTP middleware, record handlers and server setup around the hook pipeline.

pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{build_router, start_server, AppState, ServerConfig};
