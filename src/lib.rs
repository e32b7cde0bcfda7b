//! probe-backend: a minimal HTTP backend for orchestration testing.
//!
//! Serves liveness and readiness probes, runs one test query against MySQL,
//! checks AMQP reachability once at startup, and holds a configurable block
//! of memory to exercise resource limits.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod load;
pub mod middleware;
pub mod queue;
pub mod routes;
pub mod startup;
pub mod state;

pub use config::AppConfig;
pub use error::AppError;
