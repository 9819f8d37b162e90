//! Network collaborators: ProPublica profile/filing/search endpoints and the
//! Treasury daily bill-rate feed.
//!
//! Nothing here retries. Retrieval failures map onto `ExtractionFailure`;
//! benchmark failures collapse to `None` so the caller can substitute its
//! fallback rate.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Datelike;
use roxmltree::Document;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{ExtractionFailure, Result, YieldGapError};
use crate::models::{Ein, OrganizationHit};
use crate::settings::Settings;

const FOUR_WEEK_YIELD_FIELD: &str = "ROUND_B1_YIELD_4WK_2";

#[async_trait]
pub trait FilingSource: Send + Sync {
    /// Raw HTML of the organization's profile page.
    async fn fetch_profile(&self, ein: &Ein) -> std::result::Result<String, ExtractionFailure>;

    /// Raw XML of one e-filed return.
    async fn fetch_filing(&self, object_id: &str) -> std::result::Result<String, ExtractionFailure>;
}

#[async_trait]
pub trait BenchmarkSource: Send + Sync {
    /// Current annual rate as a fraction, or `None` when unavailable.
    async fn current_rate(&self) -> Option<Decimal>;
}

fn build_client(settings: &Settings) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .user_agent(settings.user_agent.clone())
        .build()?;
    Ok(client)
}

async fn get_text(client: &reqwest::Client, url: &str) -> std::result::Result<String, String> {
    debug!(url, "GET");
    let resp = client.get(url).send().await.map_err(|e| e.to_string())?;
    let status = resp.status();
    if !status.is_success() {
        return Err(format!("HTTP {status} for {url}"));
    }
    resp.text().await.map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// ProPublica
// ---------------------------------------------------------------------------

pub struct ProPublicaClient {
    client: reqwest::Client,
    base_url: String,
}

impl ProPublicaClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            client: build_client(settings)?,
            base_url: settings.profile_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn profile_url(&self, ein: &Ein) -> String {
        format!("{}/organizations/{}", self.base_url, ein.as_str())
    }

    fn filing_url(&self, object_id: &str) -> String {
        format!("{}/download-xml?object_id={}", self.base_url, object_id)
    }

    fn search_url(&self) -> String {
        format!("{}/api/v2/search.json", self.base_url)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<OrganizationHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        info!(query, "searching organizations");
        let resp = self
            .client
            .get(self.search_url())
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| YieldGapError::Search(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(YieldGapError::Search(format!("HTTP {status}")));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| YieldGapError::Search(e.to_string()))?;
        parse_search_response(&body)
    }
}

#[async_trait]
impl FilingSource for ProPublicaClient {
    async fn fetch_profile(&self, ein: &Ein) -> std::result::Result<String, ExtractionFailure> {
        let url = self.profile_url(ein);
        info!(ein = %ein, "fetching organization profile");
        get_text(&self.client, &url)
            .await
            .map_err(ExtractionFailure::ProfileUnavailable)
    }

    async fn fetch_filing(&self, object_id: &str) -> std::result::Result<String, ExtractionFailure> {
        let url = self.filing_url(object_id);
        info!(object_id, "downloading XML filing");
        get_text(&self.client, &url)
            .await
            .map_err(ExtractionFailure::FilingDownloadFailed)
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organizations: Vec<RawOrganization>,
}

#[derive(Deserialize)]
struct RawOrganization {
    ein: u64,
    name: String,
    city: Option<String>,
    state: Option<String>,
}

fn parse_search_response(body: &str) -> Result<Vec<OrganizationHit>> {
    let parsed: SearchResponse = serde_json::from_str(body)?;
    Ok(parsed
        .organizations
        .into_iter()
        .map(|o| OrganizationHit {
            ein: format!("{:09}", o.ein),
            name: o.name,
            city: o.city,
            state: o.state,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Treasury
// ---------------------------------------------------------------------------

pub struct TreasuryClient {
    client: reqwest::Client,
    feed_url: String,
}

impl TreasuryClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            client: build_client(settings)?,
            feed_url: settings.treasury_url.clone(),
        })
    }

    fn feed_url_for_year(&self, year: i32) -> String {
        format!(
            "{}?data=daily_treasury_bill_rates&field_tdr_date_value={}",
            self.feed_url, year
        )
    }
}

#[async_trait]
impl BenchmarkSource for TreasuryClient {
    async fn current_rate(&self) -> Option<Decimal> {
        let url = self.feed_url_for_year(chrono::Local::now().year());
        match get_text(&self.client, &url).await {
            Ok(xml) => {
                let rate = latest_four_week_rate(&xml);
                if rate.is_none() {
                    warn!("treasury feed had no 4-week yields");
                }
                rate
            }
            Err(e) => {
                warn!(error = %e, "treasury feed unavailable");
                None
            }
        }
    }
}

/// Most recent 4-week bill yield in the feed, as a fraction. Entries are in
/// ascending date order, so the last populated sample wins.
pub fn latest_four_week_rate(xml: &str) -> Option<Decimal> {
    let doc = Document::parse(xml).ok()?;
    let percent = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == FOUR_WEEK_YIELD_FIELD)
        .filter_map(|n| n.text())
        .filter_map(|t| Decimal::from_str(t.trim()).ok())
        .last()?;
    Some(percent / Decimal::ONE_HUNDRED)
}
