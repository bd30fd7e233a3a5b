use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::{json, Value};

use crate::{email::IssueRecord, model::AnalysisResult, util::bullet_list};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

fn mrkdwn(text: String) -> Value {
    json!({"type": "mrkdwn", "text": text})
}

/// Fallback text and Block Kit blocks for one classified issue.
pub fn format_issue_message(
    issue: &IssueRecord,
    analysis: &AnalysisResult,
    now: DateTime<Tz>,
) -> (String, Vec<Value>) {
    let category_glyph = analysis.category.glyph();
    let priority_glyph = analysis.priority.glyph();

    let blocks = vec![
        json!({
            "type": "header",
            "text": {"type": "plain_text", "text": format!("{} New Maintenance Request", category_glyph)}
        }),
        json!({
            "type": "section",
            "fields": [
                mrkdwn(format!("*Category:*\n{} {}", category_glyph, analysis.category)),
                mrkdwn(format!("*Priority:*\n{} {}", priority_glyph, analysis.priority)),
            ]
        }),
        json!({
            "type": "section",
            "fields": [
                mrkdwn(format!("*From:*\n{}", issue.sender)),
                mrkdwn(format!("*Date:*\n{}", now.format(DATE_FORMAT))),
            ]
        }),
        json!({"type": "section", "text": mrkdwn(format!("*Subject:*\n{}", issue.subject))}),
        json!({"type": "divider"}),
        json!({"type": "section", "text": mrkdwn(format!("*📋 Summary:*\n{}", analysis.summary))}),
        json!({"type": "section", "text": mrkdwn(format!("*🔍 Root Cause:*\n{}", analysis.root_cause))}),
        json!({
            "type": "section",
            "text": mrkdwn(format!("*✅ Action Items:*\n{}", bullet_list(&analysis.action_items)))
        }),
    ];

    let fallback_text = format!(
        "{} {} - {} Priority: {}",
        category_glyph, analysis.category, analysis.priority, issue.subject
    );

    (fallback_text, blocks)
}
