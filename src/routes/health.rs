//! Health check endpoints for container orchestration.
//!
//! Both probes answer unconditionally. Neither touches the database or the
//! queue, so an orchestrator keeps routing traffic here even while those
//! dependencies are down.

/// Liveness probe handler.
///
/// Returns 200 "OK" whenever the process can answer HTTP.
pub async fn health() -> &'static str {
    "OK"
}

/// Readiness probe handler.
///
/// Returns 200 "READY" without checking any dependency.
pub async fn ready() -> &'static str {
    "READY"
}
