pub mod client;
pub mod issue_record;
pub mod token;

use async_trait::async_trait;

pub use client::GmailClient;
pub use issue_record::IssueRecord;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("mail source is not configured (no authorized token)")]
    NotConfigured,
    #[error("mail source authentication failed: {0}")]
    Auth(String),
    #[error("mail source request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("mail source API error {status}: {message}")]
    Api { status: u16, message: String },
}

/// Where issues come from. Returns at most `limit` records in store order.
#[async_trait]
pub trait MailSource: Send + Sync {
    async fn fetch(&self, limit: u32) -> Result<Vec<IssueRecord>, SourceError>;
}
