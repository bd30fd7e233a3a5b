//! Cached OAuth credentials for the mailbox, stored in Google's
//! "authorized user" JSON layout so an existing token file can be reused.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{util::check_expired, HttpClient};

use super::SourceError;

const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const EXPIRY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
const EXPIRY_WRITE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedUserToken {
    /// Current access token
    #[serde(default)]
    pub token: Option<String>,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub expiry: Option<String>,
    /// Fields we don't use but must write back untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

impl AuthorizedUserToken {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let expiry = self.expiry.as_deref()?;
        DateTime::parse_from_rfc3339(expiry)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(expiry, EXPIRY_FORMAT)
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }

    /// A token with no access token or no known expiry is treated as expired.
    pub fn needs_refresh(&self) -> bool {
        match (&self.token, self.expires_at()) {
            (Some(_), Some(expires_at)) => check_expired(expires_at),
            _ => true,
        }
    }

    fn apply_refresh(&mut self, resp: RefreshTokenResponse) {
        let expires_at = Utc::now() + chrono::Duration::seconds(resp.expires_in);
        self.token = Some(resp.access_token);
        self.expiry = Some(expires_at.format(EXPIRY_WRITE_FORMAT).to_string());
        if let Some(refresh_token) = resp.refresh_token {
            self.refresh_token = refresh_token;
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefreshTokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// File-backed token with refresh-on-demand.
#[derive(Debug)]
pub struct TokenCache {
    path: PathBuf,
    token: Mutex<AuthorizedUserToken>,
}

impl TokenCache {
    /// Returns `NotConfigured` when the token file is missing or unreadable.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            tracing::warn!("Could not read token file {}: {}", path.display(), e);
            SourceError::NotConfigured
        })?;
        let token = serde_json::from_str::<AuthorizedUserToken>(&raw).map_err(|e| {
            tracing::warn!("Token file {} is invalid: {}", path.display(), e);
            SourceError::NotConfigured
        })?;

        Ok(Self {
            path,
            token: Mutex::new(token),
        })
    }

    pub async fn access_token(&self, http_client: &HttpClient) -> Result<String, SourceError> {
        let mut token = self.token.lock().await;
        if token.needs_refresh() {
            tracing::info!("Gmail access token expired, refreshing");
            let resp = exchange_refresh_token(http_client, &token).await?;
            token.apply_refresh(resp);
            self.persist(&token).await;
        }

        token
            .token
            .clone()
            .ok_or_else(|| SourceError::Auth("no access token after refresh".to_string()))
    }

    async fn persist(&self, token: &AuthorizedUserToken) {
        let result = match serde_json::to_string(token) {
            Ok(json) => tokio::fs::write(&self.path, json).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        if let Err(e) = result {
            // The refreshed token still works for this process
            tracing::warn!("Could not save refreshed token to {}: {}", self.path.display(), e);
        }
    }
}

async fn exchange_refresh_token(
    http_client: &HttpClient,
    token: &AuthorizedUserToken,
) -> Result<RefreshTokenResponse, SourceError> {
    let resp = http_client
        .post(&token.token_uri)
        .form(&[
            ("client_id", token.client_id.as_str()),
            ("client_secret", token.client_secret.as_str()),
            ("refresh_token", token.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ])
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;

    if resp.get("error").is_some() {
        let desc = resp
            .get("error_description")
            .and_then(|d| d.as_str())
            .or_else(|| resp.get("error").and_then(|e| e.as_str()))
            .unwrap_or("unknown error");
        tracing::error!("Error refreshing Gmail token: {}", desc);
        return Err(SourceError::Auth(desc.to_string()));
    }

    serde_json::from_value::<RefreshTokenResponse>(resp.clone()).map_err(|_| {
        tracing::error!("Unexpected oauth2 refresh response: {:?}", resp);
        SourceError::Auth("unexpected refresh response".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN_JSON: &str = r#"{
        "token": "ya29.a0",
        "refresh_token": "1//0g",
        "token_uri": "https://oauth2.googleapis.com/token",
        "client_id": "id.apps.googleusercontent.com",
        "client_secret": "shh",
        "scopes": ["https://www.googleapis.com/auth/gmail.readonly"],
        "universe_domain": "googleapis.com",
        "expiry": "2020-01-01T10:00:00.123456Z"
    }"#;

    #[test]
    fn test_parses_python_expiry_format() {
        let token: AuthorizedUserToken = serde_json::from_str(TOKEN_JSON).unwrap();
        let expires_at = token.expires_at().unwrap();
        assert_eq!(expires_at.format("%Y-%m-%d %H:%M").to_string(), "2020-01-01 10:00");
        assert!(token.needs_refresh());
        assert_eq!(token.extra["universe_domain"], "googleapis.com");
    }

    #[test]
    fn test_fresh_token_is_not_refreshed() {
        let mut token: AuthorizedUserToken = serde_json::from_str(TOKEN_JSON).unwrap();
        token.apply_refresh(RefreshTokenResponse {
            access_token: "ya29.new".to_string(),
            expires_in: 3600,
            refresh_token: None,
        });
        assert_eq!(token.token.as_deref(), Some("ya29.new"));
        assert_eq!(token.refresh_token, "1//0g");
        assert!(!token.needs_refresh());

        // expiry written back in the same layout it was read in
        let written = serde_json::to_value(&token).unwrap();
        assert!(written["expiry"].as_str().unwrap().ends_with('Z'));
        assert_eq!(written["universe_domain"], "googleapis.com");
    }

    #[test]
    fn test_missing_access_token_needs_refresh() {
        let token: AuthorizedUserToken = serde_json::from_str(
            r#"{"refresh_token": "r", "client_id": "c", "client_secret": "s"}"#,
        )
        .unwrap();
        assert!(token.needs_refresh());
        assert_eq!(token.token_uri, GOOGLE_TOKEN_URI);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_configured() {
        let result = TokenCache::load("/nonexistent/gmail_token.json").await;
        assert!(matches!(result, Err(SourceError::NotConfigured)));
    }
}
