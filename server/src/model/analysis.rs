use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The fixed set of maintenance categories. Anything else the model returns
/// is coerced to `GeneralInquiry`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum Category {
    #[serde(rename = "Electrical")]
    #[strum(to_string = "Electrical")]
    Electrical,
    #[serde(rename = "Plumbing")]
    #[strum(to_string = "Plumbing")]
    Plumbing,
    #[serde(rename = "IT Support")]
    #[strum(to_string = "IT Support")]
    ItSupport,
    #[serde(rename = "HVAC")]
    #[strum(to_string = "HVAC")]
    Hvac,
    #[serde(rename = "General Inquiry")]
    #[strum(to_string = "General Inquiry")]
    GeneralInquiry,
}

impl Category {
    /// Exact match on the display name, coercing everything else.
    pub fn from_model_value(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse::<Category>().ok())
            .unwrap_or(Category::GeneralInquiry)
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn from_model_value(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.trim().parse::<Priority>().ok())
            .unwrap_or(Priority::Medium)
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub category: Category,
    pub summary: String,
    pub priority: Priority,
    pub root_cause: String,
    pub action_items: Vec<String>,
}
