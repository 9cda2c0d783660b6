//! # Curvewatch Ext HTTP
//!
//! Security-master client for the curvewatch worker.
//!
//! [`SecurityMasterClient`] implements [`ReferenceDataSource`] over the paged REST endpoint
//! `GET {url}/api/v1/instruments?page=N&page_size=M`. Every page is fetched. Items that do
//! not convert into instruments are returned as rejections, not errors.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::time::Duration;

use async_trait::async_trait;
use curvewatch_traits::{ReferenceDataSource, ReferenceSection, ReferenceSnapshot, TraitError};
use serde::Deserialize;
use tracing::{debug, info};

/// Largest page the security master serves.
pub const MAX_PAGE_SIZE: usize = 100;

/// One page of the instrument listing.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentPage {
    /// Raw items, converted one by one
    pub items: Vec<serde_json::Value>,
    /// Instruments across all pages
    pub total: usize,
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub page_size: usize,
    /// Page count
    pub pages: u32,
}

/// Paged REST client for the security master.
#[derive(Debug, Clone)]
pub struct SecurityMasterClient {
    client: reqwest::Client,
    base_url: String,
    page_size: usize,
}

impl SecurityMasterClient {
    /// Creates a client. `page_size` is clamped to `1..=100`.
    ///
    /// # Errors
    ///
    /// `Configuration` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        page_size: usize,
        timeout: Duration,
    ) -> Result<Self, TraitError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TraitError::Configuration(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        })
    }

    /// Creates a client from the `[reference]` section.
    ///
    /// # Errors
    ///
    /// `Configuration` if the HTTP client cannot be built.
    pub fn from_section(section: &ReferenceSection) -> Result<Self, TraitError> {
        Self::new(
            section.url.clone(),
            section.page_size as usize,
            Duration::from_secs(section.timeout_secs),
        )
    }

    /// Listing endpoint.
    #[must_use]
    pub fn instruments_url(&self) -> String {
        format!("{}/api/v1/instruments", self.base_url)
    }

    /// Fetches one page.
    ///
    /// # Errors
    ///
    /// `Timeout`, `ConnectionFailed` for transport failures and non-success statuses,
    /// `ParseError` for a body that is not a page.
    pub async fn fetch_page(&self, page: u32) -> Result<InstrumentPage, TraitError> {
        let response = self
            .client
            .get(self.instruments_url())
            .query(&[("page", page as usize), ("page_size", self.page_size)])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TraitError::ConnectionFailed(format!(
                "security master returned {status} for page {page}"
            )));
        }

        let body = response.text().await.map_err(transport_error)?;
        let parsed: InstrumentPage = serde_json::from_str(&body)
            .map_err(|e| TraitError::ParseError(format!("page {page}: {e}")))?;
        debug!(page, pages = parsed.pages, items = parsed.items.len(), "instrument page fetched");
        Ok(parsed)
    }
}

fn transport_error(e: reqwest::Error) -> TraitError {
    if e.is_timeout() {
        TraitError::Timeout
    } else {
        TraitError::ConnectionFailed(e.to_string())
    }
}

#[async_trait]
impl ReferenceDataSource for SecurityMasterClient {
    async fn fetch_instruments(&self) -> Result<ReferenceSnapshot, TraitError> {
        let mut snapshot = ReferenceSnapshot::default();
        let mut page = 1;
        loop {
            let listing = self.fetch_page(page).await?;
            snapshot.reported_total = Some(listing.total);
            for item in listing.items {
                snapshot.push_raw(item);
            }
            if page >= listing.pages {
                break;
            }
            page += 1;
        }

        info!(
            url = %self.base_url,
            total = ?snapshot.reported_total,
            accepted = snapshot.instruments.len(),
            rejected = snapshot.rejected.len(),
            "security master fetched"
        );
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        format!("security master {}", self.base_url)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_and_page_size() {
        let client =
            SecurityMasterClient::new("http://localhost:8000/", 500, Duration::from_secs(30)).unwrap();
        assert_eq!(client.instruments_url(), "http://localhost:8000/api/v1/instruments");
        assert_eq!(client.page_size, MAX_PAGE_SIZE);

        let section = ReferenceSection::default();
        let client = SecurityMasterClient::from_section(&section).unwrap();
        assert_eq!(client.describe(), "security master http://localhost:8000");
    }

    #[test]
    fn test_page_shape() {
        let page: InstrumentPage = serde_json::from_str(
            r#"{"items":[{"id":"B1"}],"total":101,"page":1,"page_size":100,"pages":2}"#,
        )
        .unwrap();
        assert_eq!(page.pages, 2);
        assert_eq!(page.total, 101);
    }
}
