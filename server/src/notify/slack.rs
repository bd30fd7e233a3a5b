use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::{
    server_config::NotificationConfig,
    sink::{api_error, SinkError},
    HttpClient,
};

use super::{ChatChannel, OutgoingMessage};

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Posts to a Slack channel through `chat.postMessage`.
pub struct SlackChannel {
    http_client: HttpClient,
    token: String,
    channel_id: String,
    api_base: String,
}

impl SlackChannel {
    pub fn new(
        http_client: HttpClient,
        token: impl Into<String>,
        channel_id: impl Into<String>,
        config: &NotificationConfig,
    ) -> Self {
        Self {
            http_client,
            token: token.into(),
            channel_id: channel_id.into(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ChatChannel for SlackChannel {
    async fn post(&self, message: OutgoingMessage) -> Result<(), SinkError> {
        let mut body = json!({
            "channel": self.channel_id,
            "text": message.text,
        });
        if let Some(blocks) = message.blocks {
            body["blocks"] = json!(blocks);
        }

        let response = self
            .http_client
            .post(format!("{}/chat.postMessage", self.api_base))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        // Slack reports most failures with a 200 and `ok: false`
        let resp = response.json::<SlackResponse>().await?;
        check_slack_response(resp)
    }
}

fn check_slack_response(resp: SlackResponse) -> Result<(), SinkError> {
    if resp.ok {
        Ok(())
    } else {
        Err(SinkError::Rejected(
            resp.error.unwrap_or_else(|| "unknown_error".to_string()),
        ))
    }
}
