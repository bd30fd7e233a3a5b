use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use config::{Config, ConfigError};
use serde::Deserialize;
use std::{env, path::Path};

const CHAT_COMPLETIONS_ENDPOINT: &str = "https://api.cerebras.ai/v1/chat/completions";
const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
const NOTION_API_BASE: &str = "https://api.notion.com/v1";
const SLACK_API_BASE: &str = "https://slack.com/api";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Issues fetched per batch run
    pub max_results: u32,
    /// Issues re-classified for the dashboard
    pub stats_lookback: u32,
    /// Window searched when classifying a single issue by id
    pub classify_lookback: u32,
    pub recent_issues: usize,
    pub top_issues: usize,
    pub timezone: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_results: 10,
            stats_lookback: 20,
            classify_lookback: 50,
            recent_issues: 5,
            top_issues: 5,
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub endpoint: String,
    pub id: String,
    pub temperature: f64,
    pub json_mode: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: CHAT_COMPLETIONS_ENDPOINT.to_string(),
            id: "llama-4-scout-17b-16e-instruct".to_string(),
            temperature: 0.2,
            json_mode: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GmailConfig {
    pub token_file: String,
    pub api_base: String,
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            token_file: "gmail_token.json".to_string(),
            api_base: GMAIL_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TicketConfig {
    pub api_base: String,
    pub notion_version: String,
    pub max_field_len: usize,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            api_base: NOTION_API_BASE.to_string(),
            notion_version: "2022-06-28".to_string(),
            max_field_len: 2000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub api_base: String,
    pub max_field_len: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            api_base: SLACK_API_BASE.to_string(),
            max_field_len: 2000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Six-field cron expression (with seconds)
    pub cron: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub settings: Settings,
    pub model: ModelConfig,
    pub gmail: GmailConfig,
    pub tickets: TicketConfig,
    pub notifications: NotificationConfig,
    pub schedule: ScheduleConfig,
    pub server: HttpConfig,
}

impl ServerConfig {
    /// Load `config.toml` from the config dir, then apply `SUPERVISOR__*` overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = format!("{}/config.toml", config_dir());
        Self::from_file(&path)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("SUPERVISOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn timezone(&self) -> Tz {
        self.settings.timezone.parse::<Tz>().unwrap_or_else(|e| {
            tracing::warn!(
                "Invalid timezone {:?} ({}), falling back to UTC",
                self.settings.timezone,
                e
            );
            Tz::UTC
        })
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone()).date_naive()
    }
}

impl std::fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Server Config:\n{:?}\n\nModel: {:?}\n\nGmail: {:?}\n\nTickets: {:?}\n\nNotifications: {:?}\n\nSchedule: {:?}\n\nHTTP: {:?}",
            self.settings,
            self.model,
            self.gmail,
            self.tickets,
            self.notifications,
            self.schedule,
            self.server,
        )
    }
}

/// Secrets for the external collaborators. A collaborator with incomplete
/// credentials is treated as absent for the run.
#[derive(Clone, Default)]
pub struct Credentials {
    pub cerebras_api_key: Option<String>,
    pub notion_token: Option<String>,
    pub notion_database_id: Option<String>,
    pub slack_bot_token: Option<String>,
    pub slack_channel_id: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            cerebras_api_key: non_empty_var("CEREBRAS_API_KEY"),
            notion_token: non_empty_var("NOTION_TOKEN"),
            notion_database_id: non_empty_var("NOTION_DATABASE_ID"),
            slack_bot_token: non_empty_var("SLACK_BOT_TOKEN"),
            slack_channel_id: non_empty_var("SLACK_CHANNEL_ID"),
        }
    }

    pub fn notion(&self) -> Option<(&str, &str)> {
        Some((
            self.notion_token.as_deref()?,
            self.notion_database_id.as_deref()?,
        ))
    }

    pub fn slack(&self) -> Option<(&str, &str)> {
        Some((
            self.slack_bot_token.as_deref()?,
            self.slack_channel_id.as_deref()?,
        ))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("cerebras_api_key", &self.cerebras_api_key.is_some())
            .field("notion", &self.notion().is_some())
            .field("slack", &self.slack().is_some())
            .finish()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn config_dir() -> String {
    env::var("APP_DIR").unwrap_or_else(|_| {
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let root = manifest_dir.parent().unwrap_or(manifest_dir);
        format!("{}/config", root.display())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let cfg = ServerConfig::from_file("/nonexistent/config.toml").unwrap();
        assert_eq!(cfg.settings.max_results, 10);
        assert_eq!(cfg.settings.stats_lookback, 20);
        assert_eq!(cfg.tickets.max_field_len, 2000);
        assert_eq!(cfg.notifications.max_field_len, 2000);
        assert!(cfg.schedule.cron.is_none());
    }

    #[test]
    fn test_repo_config_parses() {
        let path = format!("{}/config.toml", config_dir());
        let cfg = ServerConfig::from_file(&path).unwrap();
        assert!(!cfg.model.id.is_empty());
        assert!(cfg.settings.max_results > 0);
    }

    #[test]
    fn test_bad_timezone_falls_back_to_utc() {
        let mut cfg = ServerConfig::default();
        cfg.settings.timezone = "Mars/Olympus_Mons".to_string();
        assert_eq!(cfg.timezone(), Tz::UTC);

        cfg.settings.timezone = "America/Chicago".to_string();
        assert_eq!(cfg.timezone(), Tz::America__Chicago);
    }

    #[test]
    fn test_partial_credentials_are_absent() {
        let creds = Credentials {
            notion_token: Some("secret".to_string()),
            slack_bot_token: Some("xoxb".to_string()),
            slack_channel_id: Some("C123".to_string()),
            ..Default::default()
        };
        assert!(creds.notion().is_none());
        assert_eq!(creds.slack(), Some(("xoxb", "C123")));
        assert!(!format!("{:?}", creds).contains("secret"));
    }
}
