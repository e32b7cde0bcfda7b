use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("DB Error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database query failed");
            }
        }

        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
