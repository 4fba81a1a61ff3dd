//! Pipeline module.
//!
//! This module provides the churn feature pipeline and its progress reporting.

mod builder;
pub mod progress;

pub use builder::{ChurnPipeline, ChurnPipelineBuilder};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
