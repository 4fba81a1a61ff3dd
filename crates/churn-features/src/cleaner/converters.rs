//! Column type normalization for raw event frames.

use crate::error::{PipelineError, Result};
use crate::types::{columns, event_column_types, event_schema};
use crate::utils::column_names;
use polars::prelude::*;
use tracing::debug;

/// Columns that may be absent from the log; they are added as all-null.
const OPTIONAL_COLUMNS: [&str; 5] = [
    columns::LENGTH,
    columns::ARTIST,
    columns::SONG,
    columns::FIRST_NAME,
    columns::LAST_NAME,
];

/// An event frame with no rows and every known column.
pub fn empty_events() -> DataFrame {
    DataFrame::empty_with_schema(&event_schema())
}

/// Cast known columns to their canonical types and add missing optional columns.
///
/// Casts are strict: a value that cannot be represented in the target type
/// (e.g. a date string in `ts`) fails the whole frame with
/// [`PipelineError::InvalidColumnType`]. Nulls stay null.
pub(crate) fn coerce_event_types(mut df: DataFrame) -> Result<DataFrame> {
    let present = column_names(&df);
    let height = df.height();

    for (name, dtype) in event_column_types() {
        if present.iter().any(|p| p == name) {
            let column = df.column(name)?;
            if column.dtype() == &dtype {
                continue;
            }
            debug!("Casting column '{}' from {} to {}", name, column.dtype(), dtype);
            let cast = column
                .strict_cast(&dtype)
                .map_err(|e| PipelineError::InvalidColumnType {
                    column: name.to_string(),
                    expected: dtype.to_string(),
                    reason: e.to_string(),
                })?;
            df.with_column(cast)?;
        } else if OPTIONAL_COLUMNS.contains(&name) {
            debug!("Column '{}' absent, adding it as nulls", name);
            df.with_column(Column::full_null(name.into(), height, &dtype))?;
        }
    }

    Ok(df)
}
