use std::sync::Arc;

use crate::{
    email::{GmailClient, MailSource},
    model::response::ConfigurationStatus,
    notify::{ChatChannel, NotificationSink, SlackChannel},
    prompt::{ChatCompletionsModel, LanguageModel},
    server_config::{Credentials, ServerConfig},
    ticket::{NotionStore, TicketSink, TicketStore},
    HttpClient,
};

/// Everything a run needs, built once at startup and cloned into the batch
/// driver, the HTTP router and the scheduler. An absent collaborator is `None`.
#[derive(Clone)]
pub struct AppContext {
    config: Arc<ServerConfig>,
    mail_source: Option<Arc<dyn MailSource>>,
    model: Option<Arc<dyn LanguageModel>>,
    ticket_store: Option<Arc<dyn TicketStore>>,
    chat_channel: Option<Arc<dyn ChatChannel>>,
}

impl AppContext {
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::new()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn mail_source(&self) -> Option<&dyn MailSource> {
        self.mail_source.as_deref()
    }

    pub fn model(&self) -> Option<&dyn LanguageModel> {
        self.model.as_deref()
    }

    pub fn ticket_sink(&self) -> TicketSink {
        TicketSink::new(
            self.ticket_store.clone(),
            self.config.tickets.max_field_len,
            self.config.timezone(),
        )
    }

    pub fn notification_sink(&self) -> NotificationSink {
        NotificationSink::new(
            self.chat_channel.clone(),
            self.config.notifications.max_field_len,
        )
    }

    /// Which collaborators are configured. Makes no network calls.
    pub fn configuration_status(&self) -> ConfigurationStatus {
        ConfigurationStatus::new(
            self.mail_source.is_some(),
            self.ticket_store.is_some(),
            self.chat_channel.is_some(),
            self.model.is_some(),
        )
    }
}

pub struct AppContextBuilder {
    config: Option<ServerConfig>,
    http_client: Option<HttpClient>,
    credentials: Option<Credentials>,
    mail_source: Option<Arc<dyn MailSource>>,
    model: Option<Arc<dyn LanguageModel>>,
    ticket_store: Option<Arc<dyn TicketStore>>,
    chat_channel: Option<Arc<dyn ChatChannel>>,
}

impl AppContextBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            http_client: None,
            credentials: None,
            mail_source: None,
            model: None,
            ticket_store: None,
            chat_channel: None,
        }
    }

    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_http_client(mut self, http_client: HttpClient) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Build the real collaborators from these credentials (and the Gmail
    /// token file) for any slot not already filled.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_mail_source(mut self, mail_source: Arc<dyn MailSource>) -> Self {
        self.mail_source = Some(mail_source);
        self
    }

    pub fn with_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_ticket_store(mut self, ticket_store: Arc<dyn TicketStore>) -> Self {
        self.ticket_store = Some(ticket_store);
        self
    }

    pub fn with_chat_channel(mut self, chat_channel: Arc<dyn ChatChannel>) -> Self {
        self.chat_channel = Some(chat_channel);
        self
    }

    pub async fn build(self) -> AppContext {
        let config = self.config.unwrap_or_default();
        let http_client = self.http_client.unwrap_or_default();

        let mut mail_source = self.mail_source;
        let mut model = self.model;
        let mut ticket_store = self.ticket_store;
        let mut chat_channel = self.chat_channel;

        if let Some(creds) = self.credentials {
            if mail_source.is_none() {
                mail_source = match GmailClient::new(http_client.clone(), &config.gmail).await {
                    Ok(client) => {
                        tracing::info!("Gmail connected");
                        Some(Arc::new(client))
                    }
                    Err(e) => {
                        tracing::warn!("Gmail not configured: {}", e);
                        None
                    }
                };
            }

            if model.is_none() {
                model = match &creds.cerebras_api_key {
                    Some(key) => Some(Arc::new(ChatCompletionsModel::new(
                        http_client.clone(),
                        key.clone(),
                        config.model.clone(),
                    ))),
                    None => {
                        tracing::warn!("CEREBRAS_API_KEY not set, classification will use the fallback");
                        None
                    }
                };
            }

            if ticket_store.is_none() {
                ticket_store = match creds.notion() {
                    Some((token, database_id)) => Some(Arc::new(NotionStore::new(
                        http_client.clone(),
                        token,
                        database_id,
                        &config.tickets,
                    ))),
                    None => {
                        tracing::warn!("Notion credentials not set, tickets will be skipped");
                        None
                    }
                };
            }

            if chat_channel.is_none() {
                chat_channel = match creds.slack() {
                    Some((token, channel_id)) => Some(Arc::new(SlackChannel::new(
                        http_client.clone(),
                        token,
                        channel_id,
                        &config.notifications,
                    ))),
                    None => {
                        tracing::warn!("Slack credentials not set, notifications will be skipped");
                        None
                    }
                };
            }
        }

        AppContext {
            config: Arc::new(config),
            mail_source,
            model,
            ticket_store,
            chat_channel,
        }
    }
}

impl Default for AppContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
