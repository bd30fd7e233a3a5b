//! Observability Module
//!
//! Provides tools for following a pipeline run:
//! - Phase transitions and per-issue progress
//! - Console output for the batch run and the closing category table

mod common;
mod console;
mod observer;

pub use common::{format_elapsed_secs, Progress};
pub use console::{category_table, ConsoleObserver};
pub use observer::{PipelineObserver, PipelinePhase, TracingObserver};
