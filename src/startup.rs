//! Startup sequence.
//!
//! Runs once, in order, with no retries: register routes, create the lazy
//! database pool, allocate the synthetic load, launch the queue probe, then
//! bind and serve. Only an unusable listen address is fatal.

use crate::config::AppConfig;
use crate::db::Database;
use crate::http::{self, ServerError};
use crate::load::SyntheticLoad;
use crate::queue;
use crate::routes;
use crate::state::AppState;

/// Start the service and serve until the process exits.
pub async fn run(config: AppConfig) -> Result<(), ServerError> {
    let router = routes::routes();

    let db = Database::connect_lazy(&config.database);
    tracing::info!(
        database = %config.database.redacted(),
        max_connections = config.database.max_connections,
        acquire_timeout_secs = config.database.acquire_timeout_seconds,
        "Created database pool (connects on first query)"
    );

    let load = SyntheticLoad::allocate(config.load.elements);
    if load.is_empty() {
        tracing::info!("Synthetic load disabled");
    } else {
        tracing::info!(
            elements = load.len(),
            bytes = load.footprint_bytes(),
            "Allocated synthetic load"
        );
    }

    // Not awaited: the probe must never hold up serving
    let _probe = queue::spawn_probe(config.queue.clone());

    let listener = http::bind(&config.http).await?;
    let state = AppState::new(config, db, load);
    let app = routes::into_app(router, state.clone());

    let port = listener
        .local_addr()
        .map(|addr| addr.port())
        .unwrap_or(state.config.http.port);
    tracing::info!("Backend listening on port {}", port);

    http::serve(listener, app).await
}
