pub mod notion;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    email::IssueRecord,
    model::AnalysisResult,
    sink::{SinkError, SinkOutcome},
    util::{bullet_list, truncate_json_strings},
};

pub use notion::NotionStore;

pub const OPEN_STATUS: &str = "Open";

/// A ticket ready for submission: database properties plus body blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketPage {
    pub properties: Value,
    pub children: Vec<Value>,
}

impl TicketPage {
    pub fn build(issue: &IssueRecord, analysis: &AnalysisResult, created_at: &str) -> Self {
        let properties = json!({
            "Subject": {"title": [{"text": {"content": issue.subject}}]},
            "Category": {"select": {"name": analysis.category.as_str()}},
            "Priority": {"select": {"name": analysis.priority.as_str()}},
            "Sender": {"rich_text": [{"text": {"content": issue.sender}}]},
            "Date": {"date": {"start": created_at}},
            "Status": {"select": {"name": OPEN_STATUS}},
        });

        let sections = [
            ("📋 Summary", analysis.summary.clone()),
            ("🔍 Root Cause Analysis", analysis.root_cause.clone()),
            ("✅ Action Items", bullet_list(&analysis.action_items)),
            ("📧 Original Email", issue.snippet.clone()),
        ];
        let children = sections
            .into_iter()
            .flat_map(|(heading, body)| [heading_block(heading), paragraph_block(&body)])
            .collect();

        Self {
            properties,
            children,
        }
    }

    /// Cut every text value down to the store's field limit.
    pub fn truncate(&mut self, max_len: usize) {
        truncate_json_strings(&mut self.properties, max_len);
        self.children
            .iter_mut()
            .for_each(|block| truncate_json_strings(block, max_len));
    }
}

fn heading_block(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "heading_2",
        "heading_2": {"rich_text": [{"type": "text", "text": {"content": text}}]}
    })
}

fn paragraph_block(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": {"rich_text": [{"type": "text", "text": {"content": text}}]}
    })
}

/// An external ticket database.
#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn create_page(&self, page: TicketPage) -> Result<(), SinkError>;
}

/// Best-effort ticket writer. Never fails outward.
pub struct TicketSink {
    store: Option<Arc<dyn TicketStore>>,
    max_field_len: usize,
    timezone: Tz,
}

impl TicketSink {
    pub fn new(store: Option<Arc<dyn TicketStore>>, max_field_len: usize, timezone: Tz) -> Self {
        Self {
            store,
            max_field_len,
            timezone,
        }
    }

    pub async fn record(&self, issue: &IssueRecord, analysis: &AnalysisResult) -> SinkOutcome {
        let Some(store) = &self.store else {
            tracing::info!("Skipping ticket for {:?}: ticket store not configured", issue.subject);
            return SinkOutcome::Skipped;
        };

        let created_at = Utc::now().with_timezone(&self.timezone).to_rfc3339();
        let mut page = TicketPage::build(issue, analysis, &created_at);
        page.truncate(self.max_field_len);

        let outcome = SinkOutcome::from_result("ticket store", store.create_page(page).await);
        if outcome == SinkOutcome::Delivered {
            tracing::info!("Added ticket: {} [{}]", issue.subject, analysis.category);
        }
        outcome
    }
}
