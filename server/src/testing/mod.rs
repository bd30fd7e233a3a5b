//! Mock collaborators shared by the test suites.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    email::{IssueRecord, MailSource, SourceError},
    notify::{ChatChannel, OutgoingMessage},
    prompt::{LanguageModel, LlmError, LlmResult, ResponseFormat},
    sink::SinkError,
    ticket::{TicketPage, TicketStore},
};

pub fn issue(id: &str, subject: &str, snippet: &str) -> IssueRecord {
    IssueRecord {
        id: id.to_string(),
        subject: subject.to_string(),
        sender: "tenant@example.com".to_string(),
        date: "Mon, 2 Mar 2026 10:00:00 +0000".to_string(),
        snippet: snippet.to_string(),
    }
}

/// A model that answers every prompt the same way and remembers the prompts.
pub struct ScriptedModel {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
    formats: Mutex<Vec<ResponseFormat>>,
}

impl ScriptedModel {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            prompts: Mutex::new(Vec::new()),
            formats: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
            formats: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn formats(&self) -> Vec<ResponseFormat> {
        self.formats.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str, format: ResponseFormat) -> LlmResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.formats.lock().unwrap().push(format);
        self.reply
            .clone()
            .ok_or_else(|| LlmError::Api("scripted failure".to_string()))
    }
}

pub struct MockMailSource {
    issues: Option<Vec<IssueRecord>>,
    limits: Mutex<Vec<u32>>,
}

impl MockMailSource {
    pub fn with_issues(issues: Vec<IssueRecord>) -> Self {
        Self {
            issues: Some(issues),
            limits: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            issues: None,
            limits: Mutex::new(Vec::new()),
        }
    }

    pub fn limits(&self) -> Vec<u32> {
        self.limits.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailSource for MockMailSource {
    async fn fetch(&self, limit: u32) -> Result<Vec<IssueRecord>, SourceError> {
        self.limits.lock().unwrap().push(limit);
        match &self.issues {
            Some(issues) => Ok(issues.iter().take(limit as usize).cloned().collect()),
            None => Err(SourceError::Auth("token revoked".to_string())),
        }
    }
}

pub struct RecordingTicketStore {
    fail: bool,
    pages: Mutex<Vec<TicketPage>>,
}

impl RecordingTicketStore {
    pub fn ok() -> Self {
        Self {
            fail: false,
            pages: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            pages: Mutex::new(Vec::new()),
        }
    }

    pub fn pages(&self) -> Vec<TicketPage> {
        self.pages.lock().unwrap().clone()
    }
}

#[async_trait]
impl TicketStore for RecordingTicketStore {
    async fn create_page(&self, page: TicketPage) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Api {
                status: 502,
                message: "bad gateway".to_string(),
            });
        }
        self.pages.lock().unwrap().push(page);
        Ok(())
    }
}

pub struct RecordingChannel {
    fail: bool,
    messages: Mutex<Vec<OutgoingMessage>>,
}

impl RecordingChannel {
    pub fn ok() -> Self {
        Self {
            fail: false,
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<OutgoingMessage> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatChannel for RecordingChannel {
    async fn post(&self, message: OutgoingMessage) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Rejected("channel_not_found".to_string()));
        }
        self.messages.lock().unwrap().push(message);
        Ok(())
    }
}
