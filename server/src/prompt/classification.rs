use indoc::formatdoc;
use serde_json::Value;

use crate::{
    email::IssueRecord,
    model::{AnalysisResult, Category, Priority},
};

use super::{LanguageModel, ResponseFormat};

pub const NO_SUMMARY: &str = "No summary available";
pub const FALLBACK_ROOT_CAUSE: &str = "Classification unavailable - manual review needed";
pub const FALLBACK_ACTION_ITEM: &str = "Manual classification required";
pub const DEFAULT_ROOT_CAUSE: &str = "To be determined";
pub const DEFAULT_ACTION_ITEM: &str = "Review and assess";

/// Why a classification fell back to the fixed result
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FallbackReason {
    #[error("model not configured")]
    ModelNotConfigured,
    #[error("model call failed: {0}")]
    ModelFailed(String),
    #[error("malformed completion: {0}")]
    Malformed(String),
}

pub fn classification_prompt(issue: &IssueRecord) -> String {
    formatdoc! {r#"
        You are an AI Maintenance Supervisor analyzing facility maintenance requests.

        MAINTENANCE REQUEST:
        Subject: {subject}
        From: {sender}
        Date: {date}
        Content: {snippet}

        TASK: Analyze this maintenance issue and provide a structured response in JSON format.

        CATEGORIES (choose ONE):
        - Electrical: Power outages, wiring issues, lighting problems, circuit breakers, electrical safety
        - Plumbing: Leaks, clogs, water pressure, pipes, drains, toilets, faucets, water heaters
        - IT Support: Computers, network issues, software problems, printers, access cards, security systems
        - HVAC: Heating, cooling, air conditioning, ventilation, temperature control, air quality
        - General Inquiry: Questions, requests that don't fit above, or multi-category issues

        OUTPUT FORMAT (must be valid JSON):
        {{
            "category": "<one of the 5 categories above>",
            "summary": "<2-3 sentence summary of the issue>",
            "priority": "<High/Medium/Low>",
            "root_cause": "<likely root cause analysis in 1-2 sentences>",
            "action_items": ["<specific action 1>", "<specific action 2>", "..."]
        }}

        PRIORITY GUIDELINES:
        - High: Safety hazards, complete system failures, affecting multiple people
        - Medium: Partial failures, inconvenience, single person affected
        - Low: Minor issues, cosmetic problems, non-urgent requests

        Respond ONLY with the JSON object, no additional text."#,
        subject = issue.subject,
        sender = issue.sender,
        date = issue.date,
        snippet = issue.snippet,
    }
}

/// The JSON payload between the first `{` and the last `}`, inclusive.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse a completion into an analysis, repairing missing or invalid fields.
/// Fails only when no JSON object can be recovered from the text.
pub fn parse_analysis(completion: &str, issue: &IssueRecord) -> Result<AnalysisResult, String> {
    let payload = extract_json_object(completion)
        .ok_or_else(|| "no JSON object found in response".to_string())?;
    let parsed: Value = serde_json::from_str(payload).map_err(|e| e.to_string())?;
    let fields = parsed
        .as_object()
        .ok_or_else(|| "response is not a JSON object".to_string())?;

    let text_field = |key: &str| {
        fields
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let action_items = match fields.get("action_items") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>(),
        Some(Value::String(item)) if !item.trim().is_empty() => vec![item.trim().to_string()],
        _ => vec![],
    };

    Ok(AnalysisResult {
        category: Category::from_model_value(fields.get("category").and_then(|v| v.as_str())),
        summary: text_field("summary").unwrap_or_else(|| snippet_summary(issue)),
        priority: Priority::from_model_value(fields.get("priority").and_then(|v| v.as_str())),
        root_cause: text_field("root_cause").unwrap_or_else(|| DEFAULT_ROOT_CAUSE.to_string()),
        action_items: if action_items.is_empty() {
            vec![DEFAULT_ACTION_ITEM.to_string()]
        } else {
            action_items
        },
    })
}

/// The deterministic result used whenever the model can't be relied on.
pub fn fallback_analysis(issue: &IssueRecord) -> AnalysisResult {
    AnalysisResult {
        category: Category::GeneralInquiry,
        summary: snippet_summary(issue),
        priority: Priority::Medium,
        root_cause: FALLBACK_ROOT_CAUSE.to_string(),
        action_items: vec![FALLBACK_ACTION_ITEM.to_string()],
    }
}

fn snippet_summary(issue: &IssueRecord) -> String {
    if issue.snippet.trim().is_empty() {
        NO_SUMMARY.to_string()
    } else {
        issue.snippet.clone()
    }
}

pub struct Classifier<'a> {
    model: Option<&'a dyn LanguageModel>,
}

impl<'a> Classifier<'a> {
    pub fn new(model: Option<&'a dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Never fails: any model problem yields the fallback analysis.
    pub async fn classify(&self, issue: &IssueRecord) -> AnalysisResult {
        match self.try_classify(issue).await {
            Ok(analysis) => analysis,
            Err(reason) => {
                if reason == FallbackReason::ModelNotConfigured {
                    tracing::debug!("Using fallback classification for {}: {}", issue.id, reason);
                } else {
                    tracing::warn!("AI classification failed for {}: {}", issue.id, reason);
                }
                fallback_analysis(issue)
            }
        }
    }

    async fn try_classify(&self, issue: &IssueRecord) -> Result<AnalysisResult, FallbackReason> {
        let model = self.model.ok_or(FallbackReason::ModelNotConfigured)?;
        let completion = model
            .complete(&classification_prompt(issue), ResponseFormat::JsonObject)
            .await
            .map_err(|e| FallbackReason::ModelFailed(e.to_string()))?;

        parse_analysis(&completion, issue).map_err(FallbackReason::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{issue, ScriptedModel};
    use strum::IntoEnumIterator;

    fn ac_issue() -> IssueRecord {
        issue("m1", "AC not cooling in room 204", "The unit is blowing warm air")
    }

    #[test]
    fn test_prompt_embeds_issue_fields() {
        let prompt = classification_prompt(&ac_issue());
        assert!(prompt.contains("Subject: AC not cooling in room 204"));
        assert!(prompt.contains("Content: The unit is blowing warm air"));
        assert!(prompt.contains("\"action_items\": ["));
        assert!(prompt.contains("Respond ONLY with the JSON object"));
    }

    #[test]
    fn test_extract_json_object() {
        assert_eq!(
            extract_json_object("Sure! {\"a\": {\"b\": 1}} hope that helps"),
            Some("{\"a\": {\"b\": 1}}")
        );
        assert_eq!(extract_json_object("no braces here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
        assert_eq!(extract_json_object("{ only open"), None);
    }

    #[tokio::test]
    async fn test_each_fixed_category_is_kept() {
        for category in Category::iter() {
            let model = ScriptedModel::replying(format!(
                r#"{{"category": "{}", "summary": "s", "priority": "High", "root_cause": "r", "action_items": ["a"]}}"#,
                category
            ));
            let analysis = Classifier::new(Some(&model)).classify(&ac_issue()).await;
            assert_eq!(analysis.category, category);
            assert_eq!(analysis.priority, Priority::High);
        }
    }

    #[tokio::test]
    async fn test_other_categories_are_coerced() {
        for value in ["\"Roofing\"", "\"hvac\"", "\"\"", "42", "null"] {
            let model = ScriptedModel::replying(format!(
                r#"{{"category": {}, "summary": "s", "priority": "Low", "root_cause": "r", "action_items": ["a"]}}"#,
                value
            ));
            let analysis = Classifier::new(Some(&model)).classify(&ac_issue()).await;
            assert_eq!(analysis.category, Category::GeneralInquiry, "{value}");
            assert_eq!(analysis.priority, Priority::Low);
            assert_eq!(analysis.root_cause, "r");
        }
    }

    #[tokio::test]
    async fn test_malformed_completions_fall_back() {
        let issue = ac_issue();
        let expected = fallback_analysis(&issue);
        for completion in [
            "I cannot help with that.",
            "{\"category\": \"HVAC\", \"summary\": ",
            "{not json at all}",
            "{\"a\": 1} and then {\"b\": 2}",
            "[\"HVAC\"]",
            "",
        ] {
            let model = ScriptedModel::replying(completion);
            let analysis = Classifier::new(Some(&model)).classify(&issue).await;
            assert_eq!(analysis, expected, "{completion:?}");
            assert_eq!(analysis.priority, Priority::Medium);
            assert!(!analysis.action_items.is_empty());
        }
    }

    #[tokio::test]
    async fn test_disabled_or_failing_model_falls_back() {
        let issue = ac_issue();

        let analysis = Classifier::new(None).classify(&issue).await;
        assert_eq!(analysis.category, Category::GeneralInquiry);
        assert_eq!(analysis.priority, Priority::Medium);
        assert_eq!(analysis.summary, "The unit is blowing warm air");
        assert_eq!(analysis.root_cause, FALLBACK_ROOT_CAUSE);
        assert_eq!(analysis.action_items, vec![FALLBACK_ACTION_ITEM.to_string()]);

        let failing = ScriptedModel::failing();
        assert_eq!(
            Classifier::new(Some(&failing)).classify(&issue).await,
            analysis
        );
    }

    #[tokio::test]
    async fn test_fallback_with_empty_snippet_uses_placeholder() {
        let issue = issue("m2", "", "   ");
        let analysis = Classifier::new(None).classify(&issue).await;
        assert_eq!(analysis.summary, NO_SUMMARY);
    }

    #[tokio::test]
    async fn test_missing_fields_are_repaired() {
        let model = ScriptedModel::replying(
            "Here you go:\n```json\n{\"category\": \"Plumbing\"}\n```",
        );
        let analysis = Classifier::new(Some(&model)).classify(&ac_issue()).await;
        assert_eq!(analysis.category, Category::Plumbing);
        assert_eq!(analysis.summary, "The unit is blowing warm air");
        assert_eq!(analysis.priority, Priority::Medium);
        assert_eq!(analysis.root_cause, DEFAULT_ROOT_CAUSE);
        assert_eq!(analysis.action_items, vec![DEFAULT_ACTION_ITEM.to_string()]);
    }

    #[test]
    fn test_action_items_shapes() {
        let issue = ac_issue();
        let single = parse_analysis(r#"{"action_items": "Call the vendor"}"#, &issue).unwrap();
        assert_eq!(single.action_items, vec!["Call the vendor".to_string()]);

        let mixed = parse_analysis(r#"{"action_items": ["Check filter", 3, "", "Reset unit"]}"#, &issue)
            .unwrap();
        assert_eq!(
            mixed.action_items,
            vec!["Check filter".to_string(), "Reset unit".to_string()]
        );

        let empty = parse_analysis(r#"{"action_items": []}"#, &issue).unwrap();
        assert_eq!(empty.action_items, vec![DEFAULT_ACTION_ITEM.to_string()]);
    }

    #[test]
    fn test_priority_outside_enum_defaults_to_medium() {
        let analysis = parse_analysis(r#"{"priority": "Critical"}"#, &ac_issue()).unwrap();
        assert_eq!(analysis.priority, Priority::Medium);
        let analysis = parse_analysis(r#"{"priority": "high"}"#, &ac_issue()).unwrap();
        assert_eq!(analysis.priority, Priority::High);
    }

    #[tokio::test]
    async fn test_prompt_reaches_the_model() {
        let model = ScriptedModel::replying("{}");
        Classifier::new(Some(&model)).classify(&ac_issue()).await;
        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("AC not cooling in room 204"));
        assert_eq!(model.formats(), vec![ResponseFormat::JsonObject]);
    }
}
