use std::fmt;

use crate::{email::IssueRecord, model::AnalysisResult, sink::SinkOutcome};

use super::Progress;

/// Where a pipeline run currently is. `Failed` is only reachable from
/// `Fetching`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelinePhase {
    Idle,
    Fetching,
    Classifying,
    Sinking,
    Aggregating,
    Notifying,
    Done,
    Failed { error: String },
}

impl PipelinePhase {
    fn short_name(&self) -> &str {
        match self {
            PipelinePhase::Idle => "Idle",
            PipelinePhase::Fetching => "Fetching",
            PipelinePhase::Classifying => "Classifying",
            PipelinePhase::Sinking => "Sinking",
            PipelinePhase::Aggregating => "Aggregating",
            PipelinePhase::Notifying => "Notifying",
            PipelinePhase::Done => "Done",
            PipelinePhase::Failed { .. } => "Failed",
        }
    }

    /// Check if this is a terminal phase (Done or Failed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelinePhase::Done | PipelinePhase::Failed { .. })
    }
}

impl fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelinePhase::Failed { error } => write!(f, "{}: {}", self.short_name(), error),
            _ => write!(f, "{}", self.short_name()),
        }
    }
}

/// Receives progress from a pipeline run. Only `phase_changed` is required.
pub trait PipelineObserver: Send + Sync {
    fn phase_changed(&self, phase: &PipelinePhase);

    fn fetched(&self, _count: usize) {}

    fn issue_started(&self, _progress: &Progress, _issue: &IssueRecord) {}

    fn issue_classified(&self, _issue: &IssueRecord, _analysis: &AnalysisResult) {}

    fn issue_sunk(&self, _ticket: SinkOutcome, _notification: SinkOutcome) {}

    fn summary_sent(&self, _outcome: SinkOutcome) {}
}

/// Observer for the HTTP and scheduled runs: everything goes to `tracing`.
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn phase_changed(&self, phase: &PipelinePhase) {
        match phase {
            PipelinePhase::Failed { error } => tracing::error!("Pipeline failed: {}", error),
            phase if phase.is_terminal() => tracing::info!("Pipeline {}", phase),
            phase => tracing::debug!("Pipeline phase: {}", phase),
        }
    }

    fn fetched(&self, count: usize) {
        tracing::info!("Fetched {} issue(s)", count);
    }

    fn issue_started(&self, progress: &Progress, issue: &IssueRecord) {
        tracing::info!(
            "Processing issue {} ({:.0}%): {}",
            progress.format_progress(),
            progress.percentage(),
            issue.id
        );
    }

    fn issue_classified(&self, issue: &IssueRecord, analysis: &AnalysisResult) {
        tracing::info!(
            "Classified {} as {} / {}",
            issue.id,
            analysis.category,
            analysis.priority
        );
    }

    fn summary_sent(&self, outcome: SinkOutcome) {
        tracing::info!("Daily summary {}", outcome);
    }
}
