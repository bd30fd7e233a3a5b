use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{response::EmailIssue, Category, Priority, ProcessedItem};

use super::{percentage, BatchStats};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub category: Category,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_issues: usize,
    pub by_category: Vec<CategoryStats>,
    pub by_priority: IndexMap<Priority, usize>,
    pub recent_issues: Vec<EmailIssue>,
}

impl DashboardStats {
    /// Stats over a classified lookback window. `recent` caps how many of the
    /// first issues are echoed back.
    pub fn from_items(items: Vec<ProcessedItem>, recent: usize) -> Self {
        let stats = BatchStats::from_items(&items);
        let by_category = stats
            .categories
            .iter()
            .map(|(category, count)| CategoryStats {
                category: *category,
                count: *count,
                percentage: percentage(*count, stats.total),
            })
            .collect();

        Self {
            total_issues: stats.total,
            by_category,
            by_priority: stats.priorities,
            recent_issues: items.into_iter().take(recent).map(EmailIssue::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{prompt::classification::fallback_analysis, testing::issue};

    fn classified(id: &str, category: Category, priority: Priority) -> ProcessedItem {
        let issue = issue(id, "subject", "snippet");
        let mut analysis = fallback_analysis(&issue);
        analysis.category = category;
        analysis.priority = priority;
        ProcessedItem::new(issue, analysis)
    }

    #[test]
    fn test_two_thirds_one_third() {
        let items = vec![
            classified("1", Category::Electrical, Priority::High),
            classified("2", Category::Electrical, Priority::High),
            classified("3", Category::Plumbing, Priority::Low),
        ];
        let stats = DashboardStats::from_items(items, 5);

        assert_eq!(stats.total_issues, 3);
        assert_eq!(
            stats.by_category,
            vec![
                CategoryStats {
                    category: Category::Electrical,
                    count: 2,
                    percentage: 66.7
                },
                CategoryStats {
                    category: Category::Plumbing,
                    count: 1,
                    percentage: 33.3
                },
            ]
        );
        assert_eq!(stats.by_priority[&Priority::High], 2);
        assert_eq!(stats.by_priority[&Priority::Medium], 0);
        assert_eq!(stats.by_priority[&Priority::Low], 1);
    }

    #[test]
    fn test_recent_issues_are_capped_in_fetch_order() {
        let items = (0..8)
            .map(|i| classified(&i.to_string(), Category::Hvac, Priority::Medium))
            .collect();
        let stats = DashboardStats::from_items(items, 5);
        let ids: Vec<_> = stats.recent_issues.iter().map(|i| i.issue.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
        assert!(stats.recent_issues[0].analysis.is_some());
    }

    #[test]
    fn test_serialized_shape() {
        let stats = DashboardStats::from_items(
            vec![classified("1", Category::ItSupport, Priority::Low)],
            5,
        );
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["by_category"][0]["category"], "IT Support");
        assert_eq!(json["by_category"][0]["percentage"], 100.0);
        assert_eq!(json["by_priority"]["Low"], 1);
        assert_eq!(json["recent_issues"][0]["analysis"]["category"], "IT Support");
    }
}
