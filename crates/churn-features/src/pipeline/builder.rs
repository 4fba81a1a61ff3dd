//! Main churn feature pipeline.
//!
//! This module provides the [`ChurnPipeline`] struct and its builder,
//! orchestrating cleaning and feature extraction for one dataset at a time.

use crate::cleaner::clean;
use crate::config::FeatureConfig;
use crate::error::{PipelineError, Result, ResultExt};
use crate::features::{RegionLookup, extract_features};
use crate::io::read_events;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::types::{PipelineResult, PipelineSummary, feature_columns};
use crate::utils::count_equal_i32;
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// The churn feature pipeline.
///
/// A pipeline holds only immutable state (configuration and region lookup),
/// so one instance can process any number of datasets, from any thread.
///
/// # Example
///
/// ```rust,ignore
/// use churn_features::{ChurnPipeline, RegionLookup};
///
/// let lookup = RegionLookup::load("assets/state_to_region.json")?;
/// let pipeline = ChurnPipeline::builder().region_lookup(lookup).build()?;
///
/// let train = pipeline.process_file("train.json")?;
/// let test = pipeline.process_file("test.json")?;
/// ```
pub struct ChurnPipeline {
    config: FeatureConfig,
    lookup: Arc<RegionLookup>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(ChurnPipeline: Send, Sync);

impl ChurnPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> ChurnPipelineBuilder {
        ChurnPipelineBuilder::default()
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn region_lookup(&self) -> &RegionLookup {
        &self.lookup
    }

    /// Read a JSON-lines event log and process it.
    pub fn process_file(&self, path: impl AsRef<Path>) -> Result<PipelineResult> {
        let path = path.as_ref();
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            0.0,
            format!("Loading events from {}", path.display()),
        ));

        let events = match read_events(path) {
            Ok(events) => events,
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                return Err(e);
            }
        };

        self.process(events)
    }

    /// Clean an event frame and aggregate it into the per-user feature table.
    pub fn process(&self, events: DataFrame) -> Result<PipelineResult> {
        match self.process_internal(events) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Processed {} users",
                    result.summary.users
                )));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, events: DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let mut summary = PipelineSummary::default();

        info!("Starting churn feature pipeline on {} events...", events.height());

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            0.0,
            format!("Cleaning {} events", events.height()),
        ));
        let (cleaned, cleaning) = clean(events).context("Cleaning events")?;
        summary.cleaning = cleaning;

        self.report_progress(ProgressUpdate::new(
            PipelineStage::FeatureExtraction,
            0.0,
            format!("Aggregating {} cleaned events", cleaned.height()),
        ));
        let (features, unmapped) = extract_features(cleaned, &self.lookup, &self.config)
            .context("Extracting features")?;

        summary.users = features.height();
        summary.churned_users = count_equal_i32(&features, feature_columns::LABEL, 1)?;
        summary.unmapped_locations = unmapped;
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Preprocessing completed: {} users ({} churned) in {}ms.",
            summary.users, summary.churned_users, summary.duration_ms
        );

        Ok(PipelineResult { features, summary })
    }
}

/// Builder for [`ChurnPipeline`].
#[derive(Default)]
pub struct ChurnPipelineBuilder {
    config: Option<FeatureConfig>,
    lookup: Option<Arc<RegionLookup>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl ChurnPipelineBuilder {
    /// Set the feature configuration. Defaults to [`FeatureConfig::default`].
    pub fn config(mut self, config: FeatureConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the state-to-region lookup. Required.
    pub fn region_lookup(mut self, lookup: impl Into<Arc<RegionLookup>>) -> Self {
        self.lookup = Some(lookup.into());
        self
    }

    /// Set a progress reporter.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a closure to receive progress updates.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Fails if no region lookup was provided or the configuration is invalid.
    pub fn build(self) -> Result<ChurnPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let lookup = self.lookup.ok_or_else(|| {
            PipelineError::InvalidConfig("a region lookup is required".to_string())
        })?;

        Ok(ChurnPipeline {
            config,
            lookup,
            progress_reporter: self.progress_reporter,
        })
    }
}
