//! Database round-trip endpoint.

use axum::{extract::State, Json};
use tracing::instrument;

use crate::db::NowRow;
use crate::error::AppError;
use crate::state::AppState;

/// Runs `SELECT NOW() AS now` and returns the rows as JSON, for example
/// `[{"now":"2024-05-17T09:30:00Z"}]` (UTC, RFC 3339).
///
/// Any driver error becomes a 500 with body `DB Error: <message>`.
#[instrument(name = "routes::db_test", skip(state))]
pub async fn db_test(State(state): State<AppState>) -> Result<Json<Vec<NowRow>>, AppError> {
    let rows = state.db.now().await?;
    Ok(Json(rows))
}
