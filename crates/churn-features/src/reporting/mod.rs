//! Run reports.
//!
//! A [`RunReport`] records what a CLI run did to each dataset: row counts
//! per cleaning rule, users and churned users, unmapped locations and the
//! feature configuration used. It is written with `--emit-report`.
//!
//! # Example
//!
//! ```rust,ignore
//! use churn_features::reporting::{DatasetReport, ReportGenerator};
//!
//! let report = ReportGenerator::build_run_report(&asset, lookup.len(), &config, datasets);
//! ReportGenerator::new("output").write_report_to_file(&report, "churn_features")?;
//! ```

mod generator;

pub use generator::{DatasetReport, ReportGenerator, RunReport};
