use async_trait::async_trait;
use google_gmail1::api::{ListMessagesResponse, Message};
use reqwest::{Response, StatusCode};

use crate::{server_config::GmailConfig, HttpClient};

use super::{issue_record::IssueRecord, token::TokenCache, MailSource, SourceError};

/// Gmail caps `maxResults` on messages.list at 500
pub const MAX_MESSAGES_PER_PAGE: u32 = 500;

const METADATA_HEADERS: [&str; 3] = ["Subject", "From", "Date"];

macro_rules! gmail_url {
    ($base:expr, $($params:expr),*) => {
        {
            let list_params: Vec<&str> = vec![$($params),*];
            format!("{}/{}", $base, list_params.join("/"))
        }
    };
}

/// Gmail API error response structure
#[derive(Debug, Clone, serde::Deserialize)]
pub struct GmailApiError {
    pub error: GmailApiErrorDetail,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct GmailApiErrorDetail {
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug)]
pub struct GmailClient {
    http_client: HttpClient,
    api_base: String,
    tokens: TokenCache,
}

impl GmailClient {
    pub async fn new(http_client: HttpClient, config: &GmailConfig) -> Result<Self, SourceError> {
        let tokens = TokenCache::load(&config.token_file).await?;
        Ok(Self {
            http_client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub async fn get_message_list(
        &self,
        access_token: &str,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<ListMessagesResponse, SourceError> {
        let mut query = vec![("maxResults".to_string(), max_results.to_string())];
        if let Some(token) = page_token {
            query.push(("pageToken".to_string(), token.to_string()));
        }

        let resp = self
            .http_client
            .get(gmail_url!(self.api_base, "messages"))
            .query(&query)
            .bearer_auth(access_token)
            .send()
            .await?;

        Ok(check_status(resp).await?.json::<ListMessagesResponse>().await?)
    }

    /// Fetch headers and snippet only. `None` when the message vanished
    /// between listing and fetching.
    pub async fn get_message_metadata(
        &self,
        access_token: &str,
        message_id: &str,
    ) -> Result<Option<Message>, SourceError> {
        let mut query = vec![("format", "metadata")];
        query.extend(METADATA_HEADERS.iter().map(|h| ("metadataHeaders", *h)));

        let resp = self
            .http_client
            .get(gmail_url!(self.api_base, "messages", message_id))
            .query(&query)
            .bearer_auth(access_token)
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            tracing::warn!("Message {} disappeared before it could be fetched", message_id);
            return Ok(None);
        }

        Ok(Some(check_status(resp).await?.json::<Message>().await?))
    }

    async fn list_message_ids(&self, access_token: &str, limit: u32) -> Result<Vec<String>, SourceError> {
        let mut ids: Vec<String> = Vec::new();
        let mut page_token: Option<String> = None;

        while let Some(page_size) = next_page_size(limit, ids.len()) {
            let page = self
                .get_message_list(access_token, page_size, page_token.as_deref())
                .await?;

            ids.extend(
                page.messages
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|m| m.id)
                    .take(page_size as usize),
            );

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(ids)
    }
}

#[async_trait]
impl MailSource for GmailClient {
    async fn fetch(&self, limit: u32) -> Result<Vec<IssueRecord>, SourceError> {
        let access_token = self.tokens.access_token(&self.http_client).await?;
        let ids = self.list_message_ids(&access_token, limit).await?;
        tracing::debug!("Listed {} message ids (limit {})", ids.len(), limit);

        let mut issues = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(message) = self.get_message_metadata(&access_token, &id).await? {
                let mut issue = IssueRecord::from_gmail_message(&message);
                if issue.id.is_empty() {
                    issue.id = id;
                }
                issues.push(issue);
            }
        }

        Ok(issues)
    }
}

/// Size of the next list page, or `None` once `limit` ids are collected.
fn next_page_size(limit: u32, collected: usize) -> Option<u32> {
    let remaining = (limit as usize).saturating_sub(collected);
    if remaining == 0 {
        return None;
    }
    Some(remaining.min(MAX_MESSAGES_PER_PAGE as usize) as u32)
}

async fn check_status(resp: Response) -> Result<Response, SourceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GmailApiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(SourceError::Auth(message));
    }
    Err(SourceError::Api {
        status: status.as_u16(),
        message,
    })
}
