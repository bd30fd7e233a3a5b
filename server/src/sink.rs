//! Shared plumbing for the best-effort outputs (tickets and chat notifications).

use derive_more::derive::Display;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("rejected: {0}")]
    Rejected(String),
}

/// What happened to one best-effort write. Failures are already logged by the
/// time an outcome is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SinkOutcome {
    #[display("delivered")]
    Delivered,
    #[display("skipped (not configured)")]
    Skipped,
    #[display("failed")]
    Failed,
}

impl SinkOutcome {
    pub fn from_result(target: &str, result: Result<(), SinkError>) -> Self {
        match result {
            Ok(()) => SinkOutcome::Delivered,
            Err(e) => {
                tracing::error!("Failed to write to {}: {}", target, e);
                SinkOutcome::Failed
            }
        }
    }
}

/// Read a non-success HTTP response into a `SinkError::Api`.
pub async fn api_error(response: reqwest::Response) -> SinkError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|e| format!("unreadable body: {}", e));
    SinkError::Api { status, message }
}
