pub mod format;
pub mod slack;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::{
    sink::{SinkError, SinkOutcome},
    util::{truncate_field, truncate_json_strings},
};

pub use format::format_issue_message;
pub use slack::SlackChannel;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMessage {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Value>>,
}

/// An external chat channel.
#[async_trait]
pub trait ChatChannel: Send + Sync {
    async fn post(&self, message: OutgoingMessage) -> Result<(), SinkError>;
}

/// Best-effort chat poster. Never fails outward.
#[derive(Clone)]
pub struct NotificationSink {
    channel: Option<Arc<dyn ChatChannel>>,
    max_field_len: usize,
}

impl NotificationSink {
    pub fn new(channel: Option<Arc<dyn ChatChannel>>, max_field_len: usize) -> Self {
        Self {
            channel,
            max_field_len,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.channel.is_some()
    }

    pub async fn notify(&self, text: &str, blocks: Option<Vec<Value>>) -> SinkOutcome {
        let Some(channel) = &self.channel else {
            tracing::info!("Skipping chat notification: channel not configured");
            return SinkOutcome::Skipped;
        };

        let blocks = blocks.map(|mut blocks| {
            blocks
                .iter_mut()
                .for_each(|block| truncate_json_strings(block, self.max_field_len));
            blocks
        });
        let message = OutgoingMessage {
            text: truncate_field(text, self.max_field_len).to_string(),
            blocks,
        };

        SinkOutcome::from_result("chat channel", channel.post(message).await)
    }
}
