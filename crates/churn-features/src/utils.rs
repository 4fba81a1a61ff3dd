//! Shared helpers for working with event frames.

use crate::error::{PipelineError, Result};
use polars::prelude::*;

/// Owned names of all columns in a DataFrame, in frame order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

/// Names from `required` that the DataFrame does not have.
pub fn missing_columns(df: &DataFrame, required: &[&str]) -> Vec<String> {
    let present = column_names(df);
    required
        .iter()
        .filter(|name| !present.iter().any(|p| p == *name))
        .map(|name| name.to_string())
        .collect()
}

/// Fail with [`PipelineError::ColumnNotFound`] on the first absent column.
pub fn require_columns(df: &DataFrame, required: &[&str]) -> Result<()> {
    match missing_columns(df, required).into_iter().next() {
        Some(name) => Err(PipelineError::ColumnNotFound(name)),
        None => Ok(()),
    }
}

/// Count rows of an integer column equal to `value`.
pub fn count_equal_i32(df: &DataFrame, column: &str, value: i32) -> Result<usize> {
    let values = df.column(column)?.as_materialized_series().i32()?;
    Ok(values.into_iter().filter(|v| *v == Some(value)).count())
}
