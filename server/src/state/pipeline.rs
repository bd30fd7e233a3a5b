use chrono::Utc;
use serde::Serialize;

use crate::{
    email::{IssueRecord, SourceError},
    model::ProcessedItem,
    notify::format_issue_message,
    observability::{PipelineObserver, PipelinePhase, Progress},
    prompt::Classifier,
    sink::SinkOutcome,
    summary::Aggregator,
};

use super::AppContext;

pub const SUCCESS_STATUS: &str = "success";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub limit: u32,
    pub send_notifications: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub status: &'static str,
    pub message: String,
    pub processed: usize,
    pub issues: Vec<ProcessedItem>,
}

impl ProcessOutcome {
    fn from_items(items: Vec<ProcessedItem>) -> Self {
        let message = if items.is_empty() {
            "No emails found".to_string()
        } else {
            format!("Processed {} emails", items.len())
        };
        Self {
            status: SUCCESS_STATUS,
            message,
            processed: items.len(),
            issues: items,
        }
    }
}

/// Sequences one run: fetch, then per issue classify and sink, then the
/// daily summary. Only a failed fetch fails the run.
pub struct Pipeline<'a> {
    ctx: &'a AppContext,
    observer: &'a dyn PipelineObserver,
}

impl<'a> Pipeline<'a> {
    pub fn new(ctx: &'a AppContext, observer: &'a dyn PipelineObserver) -> Self {
        Self { ctx, observer }
    }

    pub async fn run(&self, options: RunOptions) -> Result<ProcessOutcome, SourceError> {
        self.observer.phase_changed(&PipelinePhase::Idle);

        let issues = self.fetch(options.limit).await?;
        self.observer.fetched(issues.len());

        let classifier = Classifier::new(self.ctx.model());
        let tickets = self.ctx.ticket_sink();
        let notifications = self.ctx.notification_sink();
        let timezone = self.ctx.config().timezone();

        let mut progress = Progress::new(issues.len());
        let mut items = Vec::with_capacity(issues.len());

        for issue in issues {
            progress.advance();
            self.observer.issue_started(&progress, &issue);

            self.observer.phase_changed(&PipelinePhase::Classifying);
            let analysis = classifier.classify(&issue).await;
            self.observer.issue_classified(&issue, &analysis);

            self.observer.phase_changed(&PipelinePhase::Sinking);
            let notify = async {
                if !options.send_notifications {
                    return SinkOutcome::Skipped;
                }
                let now = Utc::now().with_timezone(&timezone);
                let (text, blocks) = format_issue_message(&issue, &analysis, now);
                notifications.notify(&text, Some(blocks)).await
            };
            let (ticket_outcome, notify_outcome) =
                futures::join!(tickets.record(&issue, &analysis), notify);
            self.observer.issue_sunk(ticket_outcome, notify_outcome);

            items.push(ProcessedItem::new(issue, analysis));
        }

        if options.send_notifications && notifications.is_configured() && !items.is_empty() {
            self.observer.phase_changed(&PipelinePhase::Aggregating);
            let settings = &self.ctx.config().settings;
            let report = Aggregator::new(self.ctx.model(), settings.top_issues)
                .summarize(&items, self.ctx.config().today())
                .await;

            self.observer.phase_changed(&PipelinePhase::Notifying);
            let outcome = notifications.notify(&report, None).await;
            self.observer.summary_sent(outcome);
        }

        self.observer.phase_changed(&PipelinePhase::Done);
        Ok(ProcessOutcome::from_items(items))
    }

    /// Fetch and classify without touching any sink.
    pub async fn fetch_and_classify(&self, limit: u32) -> Result<Vec<ProcessedItem>, SourceError> {
        let issues = self.fetch(limit).await?;
        let classifier = Classifier::new(self.ctx.model());

        let mut items = Vec::with_capacity(issues.len());
        for issue in issues {
            let analysis = classifier.classify(&issue).await;
            items.push(ProcessedItem::new(issue, analysis));
        }
        Ok(items)
    }

    pub async fn fetch(&self, limit: u32) -> Result<Vec<IssueRecord>, SourceError> {
        self.observer.phase_changed(&PipelinePhase::Fetching);

        let result = match self.ctx.mail_source() {
            Some(source) => source.fetch(limit).await,
            None => Err(SourceError::NotConfigured),
        };

        result.inspect_err(|e| {
            self.observer.phase_changed(&PipelinePhase::Failed {
                error: e.to_string(),
            })
        })
    }
}
