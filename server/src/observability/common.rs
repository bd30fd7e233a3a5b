//! Common Observability Utilities
//!
//! Progress counting and elapsed-time formatting for the console report.

// ============================================================================
// Progress Tracking
// ============================================================================

/// Position within a batch (1-based once an issue has started)
#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self { current: 0, total }
    }

    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            (self.current as f32 / self.total as f32) * 100.0
        }
    }

    pub fn advance(&mut self) {
        self.current = (self.current + 1).min(self.total);
    }

    /// Format as "current/total"
    pub fn format_progress(&self) -> String {
        format!("{}/{}", self.current, self.total)
    }
}

/// Format elapsed time as "Xm Ys" or "Ys"
pub fn format_elapsed_secs(secs: u64) -> String {
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}
