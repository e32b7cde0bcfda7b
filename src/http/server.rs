//! HTTP server startup logic.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::HttpServerConfig;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid http.host or http.port: {0}")]
    Address(String),

    #[error("Failed to bind server: {0}")]
    Bind(#[source] std::io::Error),

    #[error("Server error: {0}")]
    Server(#[source] std::io::Error),
}

/// Bind the listener described by `config`.
pub async fn bind(config: &HttpServerConfig) -> Result<TcpListener, ServerError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Address(format!("{}:{} ({})", config.host, config.port, e)))?;

    TcpListener::bind(addr).await.map_err(ServerError::Bind)
}

/// Serve `app` on `listener` until the process exits.
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), ServerError> {
    axum::serve(listener, app).await.map_err(ServerError::Server)
}
