use serde::{Deserialize, Serialize};

use crate::email::IssueRecord;

use super::AnalysisResult;

/// One issue paired with its classification. Lives for a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedItem {
    #[serde(flatten)]
    pub issue: IssueRecord,
    pub analysis: AnalysisResult,
}

impl ProcessedItem {
    pub fn new(issue: IssueRecord, analysis: AnalysisResult) -> Self {
        Self { issue, analysis }
    }
}
