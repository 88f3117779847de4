//! NVD 2.0 keyword search provider
//!
//! Queries the NIST NVD REST API for CVEs matching the target as a keyword.
//! Works without an API key; a key improves upstream rate limits. Results
//! are hard-capped at 10 per request to keep bandwidth small.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{LookupProvider, ProviderError, ProviderKind, RawCve, RawRecord};
use crate::domain::Target;

const NVD_URL: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";

/// Largest upstream response body we accept, in bytes.
const UPSTREAM_SIZE_CAP: u64 = 200_000;

/// Summaries are clipped to keep brief payloads small.
const SUMMARY_LEN: usize = 240;

/// Live vulnerability search backed by the NVD 2.0 API.
pub struct NvdProvider {
    api_key: Option<String>,
}

impl NvdProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }
}

#[async_trait]
impl LookupProvider for NvdProvider {
    fn name(&self) -> &str {
        "nvd"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::VulnSearch
    }

    async fn fetch(
        &self,
        target: &Target,
        cap: usize,
        timeout: Duration,
    ) -> Result<Vec<RawRecord>, ProviderError> {
        let keyword = target.to_string();
        let api_key = self.api_key.clone();
        // ureq is a blocking client; keep it off the async worker threads.
        let result = tokio::task::spawn_blocking(move || {
            fetch_blocking(&keyword, cap, timeout, api_key.as_deref())
        })
        .await
        .map_err(|e| ProviderError(format!("NVD lookup task failed: {}", e)))?;
        result
    }
}

fn fetch_blocking(
    keyword: &str,
    cap: usize,
    timeout: Duration,
    api_key: Option<&str>,
) -> Result<Vec<RawRecord>, ProviderError> {
    let cap = cap.clamp(1, 10);
    let agent = ureq::AgentBuilder::new().timeout(timeout).build();

    let mut request = agent
        .get(NVD_URL)
        .query("keywordSearch", keyword)
        .query("resultsPerPage", &cap.to_string());
    if let Some(key) = api_key {
        request = request.set("apiKey", key);
    }

    let response = request
        .call()
        .map_err(|e| ProviderError(format!("NVD request failed: {}", e)))?;

    if let Some(length) = response
        .header("content-length")
        .and_then(|v| v.parse::<u64>().ok())
    {
        if length > UPSTREAM_SIZE_CAP {
            return Err(ProviderError(format!(
                "NVD response too large: {} bytes",
                length
            )));
        }
    }

    let body: NvdResponse = response
        .into_json()
        .map_err(|e| ProviderError(format!("NVD response parse failed: {}", e)))?;

    Ok(map_response(body))
}

/// Map an NVD payload into raw CVE records.
fn map_response(body: NvdResponse) -> Vec<RawRecord> {
    body.vulnerabilities
        .into_iter()
        .map(|entry| {
            let cve = entry.cve;
            let summary = cve
                .descriptions
                .iter()
                .find(|d| d.lang == "en")
                .or_else(|| cve.descriptions.first())
                .map(|d| clip(&d.value, SUMMARY_LEN));
            let (cvss, severity) = extract_metric(cve.metrics.as_ref());
            RawRecord::Cve(RawCve {
                cve_id: cve.id,
                cvss,
                severity,
                summary,
            })
        })
        .collect()
}

/// Pull score and severity out of the metrics block, preferring CVSS v3.1
/// and falling back to v2 (where severity is derived: score >= 7 is High).
fn extract_metric(metrics: Option<&NvdMetrics>) -> (Option<f64>, Option<String>) {
    let Some(metrics) = metrics else {
        return (None, None);
    };

    if let Some(metric) = metrics.v31.as_ref().and_then(|m| m.first()) {
        let score = metric.cvss_data.as_ref().and_then(|d| d.base_score);
        let severity = metric
            .cvss_data
            .as_ref()
            .and_then(|d| d.base_severity.clone())
            .or_else(|| metric.base_severity.clone())
            .map(|s| title_case(&s))
            .or_else(|| score.map(|s| derive_severity(s).to_string()));
        return (score, severity);
    }

    if let Some(metric) = metrics.v2.as_ref().and_then(|m| m.first()) {
        let score = metric
            .cvss_data
            .as_ref()
            .and_then(|d| d.base_score)
            .or(metric.base_score);
        let severity = score.map(|s| if s >= 7.0 { "High" } else { "Medium" }.to_string());
        return (score, severity);
    }

    (None, None)
}

fn derive_severity(score: f64) -> &'static str {
    if score >= 9.0 {
        "Critical"
    } else if score >= 7.0 {
        "High"
    } else if score >= 4.0 {
        "Medium"
    } else {
        "Low"
    }
}

fn clip(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

fn title_case(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

#[derive(Debug, Deserialize)]
struct NvdResponse {
    #[serde(default)]
    vulnerabilities: Vec<NvdVulnerability>,
}

#[derive(Debug, Deserialize)]
struct NvdVulnerability {
    cve: NvdCve,
}

#[derive(Debug, Deserialize)]
struct NvdCve {
    id: Option<String>,

    #[serde(default)]
    descriptions: Vec<NvdDescription>,

    metrics: Option<NvdMetrics>,
}

#[derive(Debug, Deserialize)]
struct NvdDescription {
    lang: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct NvdMetrics {
    #[serde(rename = "cvssMetricV31")]
    v31: Option<Vec<NvdMetric>>,

    #[serde(rename = "cvssMetricV2")]
    v2: Option<Vec<NvdMetric>>,
}

#[derive(Debug, Deserialize)]
struct NvdMetric {
    #[serde(rename = "cvssData")]
    cvss_data: Option<NvdCvssData>,

    /// Some records carry severity at the metric level instead
    #[serde(rename = "baseSeverity")]
    base_severity: Option<String>,

    /// v2 records occasionally put the score here
    #[serde(rename = "baseScore")]
    base_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct NvdCvssData {
    #[serde(rename = "baseScore")]
    base_score: Option<f64>,

    #[serde(rename = "baseSeverity")]
    base_severity: Option<String>,
}
