use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::email::IssueRecord;

use super::{glyphs::category_glyphs, AnalysisResult, ProcessedItem};

/// An issue as returned by the API, with or without a classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailIssue {
    #[serde(flatten)]
    pub issue: IssueRecord,
    pub analysis: Option<AnalysisResult>,
}

impl From<IssueRecord> for EmailIssue {
    fn from(issue: IssueRecord) -> Self {
        Self {
            issue,
            analysis: None,
        }
    }
}

impl From<ProcessedItem> for EmailIssue {
    fn from(item: ProcessedItem) -> Self {
        Self {
            issue: item.issue,
            analysis: Some(item.analysis),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessEmailsRequest {
    pub max_results: Option<i64>,
    pub send_notifications: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaxResultsQuery {
    pub max_results: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationStatus {
    pub gmail: bool,
    pub notion: bool,
    pub slack: bool,
    pub cerebras: bool,
    pub message: String,
}

impl ConfigurationStatus {
    pub fn new(gmail: bool, notion: bool, slack: bool, cerebras: bool) -> Self {
        let message = if gmail && notion && slack && cerebras {
            "All services configured"
        } else {
            "Some services not configured"
        };
        Self {
            gmail,
            notion,
            slack,
            cerebras,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
    pub emojis: BTreeMap<String, String>,
}

impl CategoriesResponse {
    pub fn from_glyph_table() -> Self {
        let (categories, emojis) = category_glyphs()
            .map(|(category, glyph)| {
                (
                    category.to_string(),
                    (category.to_string(), glyph.to_string()),
                )
            })
            .unzip();
        Self { categories, emojis }
    }
}
