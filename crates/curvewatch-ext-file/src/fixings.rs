//! Index fixings from CSV.

use std::path::Path;

use curvewatch_core::Date;
use curvewatch_pricing::{Fixings, FloatIndex};
use curvewatch_traits::TraitError;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct FixingRow {
    index: String,
    date: String,
    rate: f64,
}

/// Loads fixings from a CSV with columns `index,date,rate`.
///
/// A later row for the same index and date replaces an earlier one.
///
/// # Errors
///
/// `IoError` if the file cannot be read, `ParseError` with the row number for a bad row.
pub fn load_fixings_csv(path: impl AsRef<Path>) -> Result<Fixings, TraitError> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| TraitError::IoError(format!("{}: {e}", path.display())))?;

    let mut fixings = Fixings::new();
    for (i, row) in reader.deserialize::<FixingRow>().enumerate() {
        let row_number = i + 2;
        let row = row.map_err(|e| TraitError::ParseError(format!("row {row_number}: {e}")))?;
        let index: FloatIndex = row
            .index
            .parse()
            .map_err(|e| TraitError::ParseError(format!("row {row_number}: {e}")))?;
        let date = Date::parse(&row.date)
            .map_err(|e| TraitError::ParseError(format!("row {row_number}: {e}")))?;
        fixings.insert(index, date, row.rate);
    }

    info!(path = %path.display(), fixings = fixings.len(), "fixings loaded");
    Ok(fixings)
}
