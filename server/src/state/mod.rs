pub mod context;
pub mod pipeline;

pub use context::AppContext;
pub use pipeline::{Pipeline, ProcessOutcome, RunOptions};
