use async_trait::async_trait;
use serde_json::json;

use crate::{
    server_config::TicketConfig,
    sink::{api_error, SinkError},
    HttpClient,
};

use super::{TicketPage, TicketStore};

/// Notion database writer. Each ticket becomes a page in the database.
pub struct NotionStore {
    http_client: HttpClient,
    token: String,
    database_id: String,
    api_base: String,
    notion_version: String,
}

impl NotionStore {
    pub fn new(
        http_client: HttpClient,
        token: impl Into<String>,
        database_id: impl Into<String>,
        config: &TicketConfig,
    ) -> Self {
        Self {
            http_client,
            token: token.into(),
            database_id: database_id.into(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            notion_version: config.notion_version.clone(),
        }
    }
}

#[async_trait]
impl TicketStore for NotionStore {
    async fn create_page(&self, page: TicketPage) -> Result<(), SinkError> {
        let body = json!({
            "parent": {"database_id": self.database_id},
            "properties": page.properties,
            "children": page.children,
        });

        let response = self
            .http_client
            .post(format!("{}/pages", self.api_base))
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.notion_version)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }
}
