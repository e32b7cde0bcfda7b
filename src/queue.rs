//! One-shot AMQP reachability probe.
//!
//! At startup the service opens a single connection to the broker and closes
//! it straight away. The outcome is logged and returned, but never affects
//! HTTP serving: a missing broker is a diagnostic, not a fatal error.

use std::fmt;
use std::time::Duration;

use lapin::{Connection, ConnectionProperties};
use tokio::task::JoinHandle;

use crate::config::QueueConfig;

/// AMQP reply code for a normal close
const REPLY_SUCCESS: u16 = 200;

/// Result of the startup queue probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueProbe {
    /// The broker accepted the connection, which was then closed
    Connected,
    /// The connection could not be established
    Failed { reason: String },
}

impl QueueProbe {
    pub fn is_connected(&self) -> bool {
        matches!(self, QueueProbe::Connected)
    }
}

impl fmt::Display for QueueProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueProbe::Connected => write!(f, "connected"),
            QueueProbe::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Attempt one connection to the broker.
///
/// No retries. The attempt is abandoned after `probe_timeout_seconds`.
pub async fn probe(config: &QueueConfig) -> QueueProbe {
    let uri = config.uri();
    let timeout = Duration::from_secs(config.probe_timeout_seconds);

    let connect = Connection::connect(&uri, ConnectionProperties::default());

    let connection = match tokio::time::timeout(timeout, connect).await {
        Ok(Ok(connection)) => connection,
        Ok(Err(e)) => {
            return QueueProbe::Failed {
                reason: e.to_string(),
            }
        }
        Err(_) => {
            return QueueProbe::Failed {
                reason: format!("timed out after {}s", timeout.as_secs()),
            }
        }
    };

    // The broker is reachable at this point; a close error is only worth a warning
    if let Err(e) = connection.close(REPLY_SUCCESS, "OK").await {
        tracing::warn!(error = %e, "Failed to close queue connection cleanly");
    }

    QueueProbe::Connected
}

/// Run the probe as a startup task and log its outcome.
pub fn spawn_probe(config: QueueConfig) -> JoinHandle<QueueProbe> {
    tokio::spawn(async move {
        let outcome = probe(&config).await;
        match &outcome {
            QueueProbe::Connected => {
                tracing::info!(host = %config.host, port = config.port, "Connected to queue successfully");
            }
            QueueProbe::Failed { reason } => {
                tracing::error!(
                    host = %config.host,
                    port = config.port,
                    error = %reason,
                    "Failed to connect to queue"
                );
            }
        }
        outcome
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_port_config() -> QueueConfig {
        QueueConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            probe_timeout_seconds: 5,
        }
    }

    #[tokio::test]
    async fn test_probe_reports_failure_for_closed_port() {
        let outcome = probe(&closed_port_config()).await;
        match outcome {
            QueueProbe::Failed { reason } => assert!(!reason.is_empty()),
            QueueProbe::Connected => panic!("nothing listens on port 1"),
        }
    }

    #[tokio::test]
    async fn test_spawned_probe_completes_without_panicking() {
        let outcome = spawn_probe(closed_port_config()).await.unwrap();
        assert!(!outcome.is_connected());
    }

    #[test]
    fn test_display() {
        assert_eq!(QueueProbe::Connected.to_string(), "connected");
        let failed = QueueProbe::Failed {
            reason: "connection refused".to_string(),
        };
        assert_eq!(failed.to_string(), "failed: connection refused");
    }
}
