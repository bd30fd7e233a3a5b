use indoc::formatdoc;

use crate::{model::ProcessedItem, summary::BatchStats};

/// One line per issue, numbered from 1 in batch order.
pub fn issue_listing(items: &[ProcessedItem]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            format!(
                "{}. [{}] {} - {} (from {})",
                idx + 1,
                item.analysis.category,
                item.analysis.priority,
                item.issue.subject,
                item.issue.sender
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn daily_summary_prompt(stats: &BatchStats, items: &[ProcessedItem]) -> String {
    let by_category = serde_json::to_string(&stats.categories).unwrap_or_default();
    let by_priority = serde_json::to_string(&stats.priorities).unwrap_or_default();

    formatdoc! {"
        Create a professional daily maintenance summary report.

        STATISTICS:
        Total Issues: {total}
        By Category: {by_category}
        By Priority: {by_priority}

        ISSUES DETAILS:
        {listing}

        Please provide:
        1. Executive summary of the day's maintenance requests
        2. Key trends or patterns by category
        3. High priority items requiring immediate attention
        4. Recommended resource allocation
        5. Any systemic issues identified

        Format professionally and concisely for management review.",
        total = stats.total,
        listing = issue_listing(items),
    }
}
