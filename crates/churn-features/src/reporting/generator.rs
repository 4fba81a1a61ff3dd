use crate::config::FeatureConfig;
use crate::error::{Result, ResultExt};
use crate::types::PipelineSummary;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Report of one CLI run covering every processed dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path of the region lookup asset
    pub region_asset: String,
    /// Number of state codes in the region lookup
    pub states_mapped: usize,
    pub config: FeatureConfig,
    pub datasets: Vec<DatasetReport>,
}

/// Outcome of one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetReport {
    /// Dataset name, e.g. "train"
    pub name: String,
    pub input_file: String,
    pub output_file: String,
    pub summary: PipelineSummary,
}

impl DatasetReport {
    pub fn new(
        name: impl Into<String>,
        input_file: &Path,
        output_file: &Path,
        summary: PipelineSummary,
    ) -> Self {
        Self {
            name: name.into(),
            input_file: input_file.display().to_string(),
            output_file: output_file.display().to_string(),
            summary,
        }
    }
}

/// Writes run reports to an output directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Assemble a report stamped with the current local time.
    pub fn build_run_report(
        region_asset: &Path,
        states_mapped: usize,
        config: &FeatureConfig,
        datasets: Vec<DatasetReport>,
    ) -> RunReport {
        RunReport {
            generated_at: Local::now().to_rfc3339(),
            region_asset: region_asset.display().to_string(),
            states_mapped,
            config: config.clone(),
            datasets,
        }
    }

    /// Write a report as pretty JSON to `<output_dir>/<report_base_name>_report.json`.
    pub fn write_report_to_file(
        &self,
        report: &RunReport,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .context(format!("Creating {}", self.output_dir.display()))?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_report() {
        let dir = std::env::temp_dir().join(format!("churn-features-report-{}", std::process::id()));
        let summary = PipelineSummary {
            users: 3,
            churned_users: 1,
            ..Default::default()
        };
        let report = ReportGenerator::build_run_report(
            Path::new("assets/state_to_region.json"),
            51,
            &FeatureConfig::default(),
            vec![DatasetReport::new(
                "train",
                Path::new("train.json"),
                Path::new("out/processed_train_data.json"),
                summary,
            )],
        );

        let path = ReportGenerator::new(&dir)
            .write_report_to_file(&report, "churn_features")
            .unwrap();

        assert!(path.ends_with("churn_features_report.json"));
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["datasets"][0]["name"], "train");
        assert_eq!(written["datasets"][0]["summary"]["users"], 3);
        assert_eq!(written["states_mapped"], 51);
        assert!(written["generated_at"].as_str().is_some());

        fs::remove_dir_all(dir).ok();
    }
}
