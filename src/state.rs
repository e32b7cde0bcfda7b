//! Shared application state for request handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::NowQuery;
use crate::load::SyntheticLoad;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Owns the configuration, the `/db-test` query source (the database pool in
/// production) and the synthetic load. Holding the load here keeps it alive
/// for as long as the server runs.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<dyn NowQuery>,
    pub load: Arc<SyntheticLoad>,
}

impl AppState {
    /// Creates a new application state from the given configuration, query source and load.
    pub fn new<D>(config: AppConfig, db: D, load: SyntheticLoad) -> Self
    where
        D: NowQuery + 'static,
    {
        Self {
            config: Arc::new(config),
            db: Arc::new(db),
            load: Arc::new(load),
        }
    }
}
