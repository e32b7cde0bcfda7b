//! HTTP server module.
//!
//! Plain HTTP only: TLS terminates in front of the service, and the process
//! stops when the orchestrator kills it.

mod server;

pub use server::{bind, serve, ServerError};
