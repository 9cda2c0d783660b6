//! File-based and static reference data sources.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use curvewatch_pricing::Instrument;
use curvewatch_traits::{ReferenceDataSource, ReferenceSnapshot, TraitError};
use serde_json::Value;
use tracing::debug;

// =============================================================================
// JSON FILE
// =============================================================================

/// Reads the instrument universe from a JSON file.
///
/// The file holds either an array of instrument records or a security-master page
/// (`{"items": [...], "total": n}`). The file is re-read on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileReferenceSource {
    path: PathBuf,
}

impl JsonFileReferenceSource {
    /// Creates a source for `path`. The file is not opened until the first fetch.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ReferenceDataSource for JsonFileReferenceSource {
    async fn fetch_instruments(&self) -> Result<ReferenceSnapshot, TraitError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| TraitError::IoError(format!("{}: {e}", self.path.display())))?;
        let document: Value = serde_json::from_str(&content)?;

        let (items, total) = match document {
            Value::Array(items) => (items, None),
            Value::Object(mut page) => {
                let total = page
                    .get("total")
                    .and_then(Value::as_u64)
                    .map(|t| t as usize);
                match page.remove("items") {
                    Some(Value::Array(items)) => (items, total),
                    _ => {
                        return Err(TraitError::ParseError(format!(
                            "{}: expected an 'items' array",
                            self.path.display()
                        )))
                    }
                }
            }
            _ => {
                return Err(TraitError::ParseError(format!(
                    "{}: expected an array or an object",
                    self.path.display()
                )))
            }
        };

        let mut snapshot = ReferenceSnapshot {
            reported_total: Some(total.unwrap_or(items.len())),
            ..ReferenceSnapshot::default()
        };
        for item in items {
            snapshot.push_raw(item);
        }
        debug!(
            path = %self.path.display(),
            instruments = snapshot.instruments.len(),
            rejected = snapshot.rejected.len(),
            "reference file read"
        );
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }
}

// =============================================================================
// STATIC
// =============================================================================

/// Serves a fixed instrument list.
#[derive(Debug, Clone, Default)]
pub struct StaticReferenceSource {
    instruments: Vec<Instrument>,
}

impl StaticReferenceSource {
    /// Creates a source over `instruments`.
    #[must_use]
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self { instruments }
    }
}

#[async_trait]
impl ReferenceDataSource for StaticReferenceSource {
    async fn fetch_instruments(&self) -> Result<ReferenceSnapshot, TraitError> {
        Ok(ReferenceSnapshot {
            instruments: self.instruments.clone(),
            rejected: Vec::new(),
            reported_total: Some(self.instruments.len()),
        })
    }

    fn describe(&self) -> String {
        format!("static ({} instruments)", self.instruments.len())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PAGE: &str = r#"{
        "items": [
            {"id": "UST-5Y", "instrument_type": "BOND", "notional": "1000000.00",
             "currency": "USD", "coupon_rate": "0.0400", "maturity_date": "2031-01-28",
             "payment_frequency": "SEMI_ANNUAL", "day_count_convention": "ACT/ACT"},
            {"id": "SWP-1", "instrument_type": "SWAP", "notional": 10000000,
             "fixed_rate": 0.0425, "maturity_date": "2031-02-02", "trade_date": "2026-01-28",
             "pay_receive": "PAY", "float_index": "SOFR"},
            {"id": "BAD-1", "instrument_type": "BOND", "notional": 1000000,
             "maturity_date": "2031-01-28"},
            {"id": "BAD-2", "instrument_type": "BOND", "notional": "lots"}
        ],
        "total": 4, "page": 1, "page_size": 100, "pages": 1
    }"#;

    #[tokio::test]
    async fn test_page_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PAGE.as_bytes()).unwrap();

        let snapshot = JsonFileReferenceSource::new(file.path())
            .fetch_instruments()
            .await
            .unwrap();
        assert_eq!(snapshot.instruments.len(), 2);
        assert_eq!(snapshot.rejected.len(), 2);
        assert_eq!(snapshot.rejected[1].id, "BAD-2");
        assert!(!snapshot.is_partial());
    }

    #[tokio::test]
    async fn test_array_document_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[]").unwrap();
        let snapshot = JsonFileReferenceSource::new(file.path())
            .fetch_instruments()
            .await
            .unwrap();
        assert!(snapshot.instruments.is_empty());
        assert_eq!(snapshot.reported_total, Some(0));

        let err = JsonFileReferenceSource::new("/nonexistent/instruments.json")
            .fetch_instruments()
            .await
            .unwrap_err();
        assert!(matches!(err, TraitError::IoError(_)));
    }
}
