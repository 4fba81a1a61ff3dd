//! Churn Feature Pipeline Library
//!
//! Turns a raw listening-event log (one JSON record per user action) into a
//! per-user feature table with a binary churn label, built on Polars.
//!
//! # Overview
//!
//! Each dataset goes through two stages:
//!
//! - **Cleaning** ([`clean`]): drops records missing identity-critical
//!   fields, fills missing song metadata, removes exact duplicates
//! - **Feature extraction** ([`aggregate`]): derives region and browser per
//!   event, then reduces each user's chronologically ordered events to one
//!   row (levels, sessions, errors, listen time, like ratio, churn label)
//!
//! The only shared state is the immutable [`RegionLookup`], passed
//! explicitly and safe to share between threads.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use churn_features::{ChurnPipeline, RegionLookup, write_features};
//!
//! let lookup = RegionLookup::load("assets/state_to_region.json")?;
//! let pipeline = ChurnPipeline::builder()
//!     .region_lookup(lookup)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?;
//!
//! let mut result = pipeline.process_file("train.json")?;
//! println!("{} users, {} churned", result.summary.users, result.summary.churned_users);
//! write_features(&mut result.features, "processed_train_data.json")?;
//! ```
//!
//! # Using the stages directly
//!
//! ```rust,ignore
//! use churn_features::{aggregate, clean, FeatureConfig, RegionLookup};
//!
//! let lookup = RegionLookup::from_json_str(r#"{"Midwest": ["OH"]}"#)?;
//! let (cleaned, report) = clean(events)?;
//! let features = aggregate(cleaned, &lookup, &FeatureConfig::default())?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod pipeline;
pub mod reporting;
pub mod types;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-exports for convenient access
pub use cleaner::{clean, empty_events};
pub use config::{ConfigValidationError, FeatureConfig, FeatureConfigBuilder};
pub use error::{PipelineError, Result as ChurnResult, ResultExt};
pub use features::{Browser, RegionLookup, aggregate, state_code};
pub use io::{read_events, write_features};
pub use pipeline::{
    ChurnPipeline, ChurnPipelineBuilder, ClosureProgressReporter, PipelineStage,
    ProgressReporter, ProgressUpdate,
};
pub use reporting::{DatasetReport, ReportGenerator, RunReport};
pub use types::{CleaningReport, PipelineResult, PipelineSummary, columns, feature_columns};
