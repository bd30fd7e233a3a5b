//! Batch aggregation: category and priority counts, the daily report, and
//! the dashboard statistics.

mod stats;
mod template;

use chrono::NaiveDate;
use indexmap::IndexMap;
use minijinja::render;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::{
    model::{Category, Priority, ProcessedItem},
    prompt::{daily_summary::daily_summary_prompt, LanguageModel, ResponseFormat},
    util::truncate_field,
};

pub use stats::{CategoryStats, DashboardStats};
use template::DAILY_REPORT_TEMPLATE;

pub const NO_ISSUES_MESSAGE: &str = "📅 *Daily Maintenance Report*\n\nNo issues processed today.";
const REPORT_SUBJECT_LEN: usize = 60;
const NARRATIVE_RULE_LEN: usize = 50;

/// Counts derived from one batch. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchStats {
    pub total: usize,
    /// First-seen order
    pub categories: IndexMap<Category, usize>,
    /// Always holds High, Medium and Low
    pub priorities: IndexMap<Priority, usize>,
}

impl BatchStats {
    pub fn from_items(items: &[ProcessedItem]) -> Self {
        let mut categories = IndexMap::new();
        let mut priorities: IndexMap<Priority, usize> =
            Priority::iter().map(|priority| (priority, 0)).collect();

        for item in items {
            *categories.entry(item.analysis.category).or_insert(0) += 1;
            *priorities.entry(item.analysis.priority).or_insert(0) += 1;
        }

        Self {
            total: items.len(),
            categories,
            priorities,
        }
    }

    /// Categories by descending count. Ties keep first-seen order.
    pub fn categories_by_count(&self) -> Vec<(Category, usize)> {
        let mut sorted: Vec<_> = self.categories.iter().map(|(c, n)| (*c, *n)).collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
    }

    pub fn priority_count(&self, priority: Priority) -> usize {
        self.priorities.get(&priority).copied().unwrap_or(0)
    }
}

/// Share of `count` in `total` as a percentage rounded to one decimal.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

#[derive(Serialize)]
struct CountRow {
    glyph: &'static str,
    name: &'static str,
    count: usize,
}

#[derive(Serialize)]
struct TopIssueRow<'a> {
    category: &'static str,
    priority: &'static str,
    subject: &'a str,
}

pub struct Aggregator<'a> {
    model: Option<&'a dyn LanguageModel>,
    top_issues: usize,
}

impl<'a> Aggregator<'a> {
    pub fn new(model: Option<&'a dyn LanguageModel>, top_issues: usize) -> Self {
        Self { model, top_issues }
    }

    /// The daily report for a batch. Uses the model narrative when it is
    /// available, the templated report otherwise.
    pub async fn summarize(&self, items: &[ProcessedItem], date: NaiveDate) -> String {
        if items.is_empty() {
            return NO_ISSUES_MESSAGE.to_string();
        }

        let stats = BatchStats::from_items(items);

        if let Some(model) = self.model {
            match model
                .complete(&daily_summary_prompt(&stats, items), ResponseFormat::Text)
                .await {
                Ok(narrative) => {
                    return format!(
                        "{}\n{}\n\n{}",
                        narrative_header(&stats, date),
                        "=".repeat(NARRATIVE_RULE_LEN),
                        narrative.trim()
                    );
                }
                Err(e) => tracing::warn!("AI daily summary failed: {}", e),
            }
        }

        self.fallback_report(&stats, items, date)
    }

    pub fn fallback_report(&self, stats: &BatchStats, items: &[ProcessedItem], date: NaiveDate) -> String {
        let categories = category_rows(stats);
        let priorities: Vec<CountRow> = stats
            .priorities
            .iter()
            .map(|(priority, count)| CountRow {
                glyph: priority.glyph(),
                name: priority.as_str(),
                count: *count,
            })
            .collect();
        let top_issues: Vec<TopIssueRow> = items
            .iter()
            .take(self.top_issues)
            .map(|item| TopIssueRow {
                category: item.analysis.category.as_str(),
                priority: item.analysis.priority.as_str(),
                subject: truncate_field(&item.issue.subject, REPORT_SUBJECT_LEN),
            })
            .collect();

        render!(
            DAILY_REPORT_TEMPLATE,
            date => date.format("%Y-%m-%d").to_string(),
            total => stats.total,
            categories,
            priorities,
            top_issues
        )
    }
}

fn category_rows(stats: &BatchStats) -> Vec<CountRow> {
    stats
        .categories_by_count()
        .into_iter()
        .map(|(category, count)| CountRow {
            glyph: category.glyph(),
            name: category.as_str(),
            count,
        })
        .collect()
}

fn narrative_header(stats: &BatchStats, date: NaiveDate) -> String {
    let mut header = format!(
        "📅 *Daily Maintenance Report* - {}\n\n📊 *Quick Stats:*\n• Total Issues: {}\n• High Priority: {} | Medium: {} | Low: {}\n\n📂 *By Category:*\n",
        date.format("%Y-%m-%d"),
        stats.total,
        stats.priority_count(Priority::High),
        stats.priority_count(Priority::Medium),
        stats.priority_count(Priority::Low),
    );
    for row in category_rows(stats) {
        header.push_str(&format!("• {} {}: {}\n", row.glyph, row.name, row.count));
    }
    header
}
