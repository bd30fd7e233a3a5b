use std::time::Instant;

use crate::{
    email::IssueRecord,
    model::{AnalysisResult, ProcessedItem},
    sink::SinkOutcome,
    summary::{percentage, BatchStats},
    util::truncate_field,
};

use super::{format_elapsed_secs, PipelineObserver, PipelinePhase, Progress};

const SUBJECT_PREVIEW_LEN: usize = 60;
const TABLE_TITLE: &str = "Issues by Category";
const TABLE_HEADERS: [&str; 3] = ["Category", "Count", "Share"];

/// Human-readable progress lines for the zero-argument batch run.
pub struct ConsoleObserver {
    started: Instant,
}

impl ConsoleObserver {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineObserver for ConsoleObserver {
    fn phase_changed(&self, phase: &PipelinePhase) {
        match phase {
            PipelinePhase::Aggregating => println!("\n📊 Generating daily maintenance summary..."),
            PipelinePhase::Done => println!(
                "\n⏱️  Finished in {}",
                format_elapsed_secs(self.started.elapsed().as_secs())
            ),
            PipelinePhase::Failed { error } => println!("❌ Run failed: {}", error),
            _ => {}
        }
    }

    fn fetched(&self, count: usize) {
        if count == 0 {
            println!("📭 No emails found.");
        } else {
            println!("📬 Found {} maintenance request(s)\n", count);
        }
    }

    fn issue_started(&self, progress: &Progress, issue: &IssueRecord) {
        println!(
            "\n[{}] Analyzing: {}...",
            progress.format_progress(),
            truncate_field(&issue.subject, SUBJECT_PREVIEW_LEN)
        );
        println!("   From: {}", issue.sender);
        println!("   🤖 Classifying maintenance issue...");
    }

    fn issue_classified(&self, _issue: &IssueRecord, analysis: &AnalysisResult) {
        println!(
            "   ✓ Category: {} | Priority: {}",
            analysis.category, analysis.priority
        );
    }

    fn issue_sunk(&self, ticket: SinkOutcome, notification: SinkOutcome) {
        println!("   Ticket: {} | Notification: {}", ticket, notification);
    }

    fn summary_sent(&self, outcome: SinkOutcome) {
        println!("   ✓ Daily summary generated, {}", outcome);
    }
}

/// Closing table of the batch run: one row per category, most frequent first.
pub fn category_table(items: &[ProcessedItem]) -> String {
    let stats = BatchStats::from_items(items);
    if stats.total == 0 {
        return String::new();
    }

    let rows: Vec<[String; 3]> = stats
        .categories_by_count()
        .into_iter()
        .map(|(category, count)| {
            [
                category.to_string(),
                count.to_string(),
                format!("{:.1}%", percentage(count, stats.total)),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    // columns plus the two " | " separators
    let columns_width = widths.iter().sum::<usize>() + 6;
    let title_width = TABLE_TITLE.chars().count();
    if title_width > columns_width {
        widths[2] += title_width - columns_width;
    }
    let inner = columns_width.max(title_width);

    let line = |cells: [&str; 3]| {
        format!(
            "| {:w0$} | {:w1$} | {:w2$} |\n",
            cells[0],
            cells[1],
            cells[2],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2]
        )
    };

    let mut table = format!(
        " {} \n| {:<inner$} |\n|-{}-|\n",
        "=".repeat(inner + 2),
        TABLE_TITLE,
        "-".repeat(inner)
    );
    table.push_str(&line(TABLE_HEADERS));
    table.push_str(&format!(
        "|-{}-|-{}-|-{}-|\n",
        "-".repeat(widths[0]),
        "-".repeat(widths[1]),
        "-".repeat(widths[2])
    ));
    for [category, count, share] in &rows {
        table.push_str(&line([category.as_str(), count.as_str(), share.as_str()]));
    }
    table.push_str(&format!(" {} \n", "-".repeat(inner + 2)));
    table
}
