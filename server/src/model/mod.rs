pub mod analysis;
pub mod glyphs;
pub mod processed_issue;
pub mod response;

pub use analysis::{AnalysisResult, Category, Priority};
pub use processed_issue::ProcessedItem;
