//! Deterministic fixture providers for dry runs and local development
//!
//! The fixtures return the same records for the same target on every call,
//! with a short simulated I/O delay, so a full triage run can be exercised
//! without touching any external service.

use std::time::Duration;

use async_trait::async_trait;

use super::{
    LookupProvider, ProviderError, ProviderKind, RawAsset, RawCve, RawExposure, RawRecord, RawTech,
};
use crate::domain::Target;

/// Simulated upstream latency for every fixture call.
const STUB_DELAY: Duration = Duration::from_millis(100);

/// Fixture vulnerability search: three descending-score CVEs.
pub struct StubVulnProvider;

#[async_trait]
impl LookupProvider for StubVulnProvider {
    fn name(&self) -> &str {
        "stub-cve"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::VulnSearch
    }

    async fn fetch(
        &self,
        target: &Target,
        cap: usize,
        _timeout: Duration,
    ) -> Result<Vec<RawRecord>, ProviderError> {
        tokio::time::sleep(STUB_DELAY).await;
        let records = (0..cap.min(3))
            .map(|i| {
                RawRecord::Cve(RawCve {
                    cve_id: Some(format!("CVE-2024-{}", 1000 + i)),
                    cvss: Some(7.5 - (i as f64) * 0.5),
                    severity: Some("High".to_string()),
                    summary: Some(format!(
                        "Vulnerability in {} component {}",
                        target,
                        i + 1
                    )),
                })
            })
            .collect();
        Ok(records)
    }
}

/// Fixture code-hosting search: two exposed-configuration hits.
pub struct StubExposureProvider;

#[async_trait]
impl LookupProvider for StubExposureProvider {
    fn name(&self) -> &str {
        "stub-github"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::CodeSearch
    }

    async fn fetch(
        &self,
        target: &Target,
        cap: usize,
        _timeout: Duration,
    ) -> Result<Vec<RawRecord>, ProviderError> {
        tokio::time::sleep(STUB_DELAY).await;
        let records = (0..cap.min(2))
            .map(|i| {
                RawRecord::Exposure(RawExposure {
                    url: Some(format!(
                        "https://github.com/example/repo-{}/config/{}.yml",
                        i + 1,
                        target
                    )),
                    repo: Some(format!("example/repo-{}", i + 1)),
                    snippet: Some(format!("Potential exposure in {} configuration", target)),
                    confidence: Some(0.7 - (i as f64) * 0.1),
                })
            })
            .collect();
        Ok(records)
    }
}

/// Fixture asset attribution: the target itself as the one known asset.
pub struct StubAssetProvider;

#[async_trait]
impl LookupProvider for StubAssetProvider {
    fn name(&self) -> &str {
        "stub-assets"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::AssetDiscovery
    }

    async fn fetch(
        &self,
        target: &Target,
        cap: usize,
        _timeout: Duration,
    ) -> Result<Vec<RawRecord>, ProviderError> {
        tokio::time::sleep(STUB_DELAY).await;
        let mut records = Vec::new();
        if cap > 0 {
            records.push(RawRecord::Asset(RawAsset {
                name: Some(target.to_string()),
                confidence: Some(0.9),
            }));
        }
        Ok(records)
    }
}

/// Fixture technology fingerprint: a single low-confidence unknown.
pub struct StubTechProvider;

#[async_trait]
impl LookupProvider for StubTechProvider {
    fn name(&self) -> &str {
        "stub-tech"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::TechFingerprint
    }

    async fn fetch(
        &self,
        _target: &Target,
        cap: usize,
        _timeout: Duration,
    ) -> Result<Vec<RawRecord>, ProviderError> {
        tokio::time::sleep(STUB_DELAY).await;
        let mut records = Vec::new();
        if cap > 0 {
            records.push(RawRecord::Tech(RawTech {
                name: Some("unknown".to_string()),
                version: None,
                confidence: Some(0.2),
            }));
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Target {
        Target::normalize("example.com").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_stub_cves_are_deterministic() {
        let provider = StubVulnProvider;
        let a = provider
            .fetch(&target(), 10, Duration::from_secs(1))
            .await
            .unwrap();
        let b = provider
            .fetch(&target(), 10, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        match &a[0] {
            RawRecord::Cve(cve) => {
                assert_eq!(cve.cve_id.as_deref(), Some("CVE-2024-1000"));
                assert_eq!(cve.cvss, Some(7.5));
            }
            other => panic!("expected a CVE record, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stub_respects_cap() {
        let provider = StubVulnProvider;
        let records = provider
            .fetch(&target(), 1, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);

        let provider = StubExposureProvider;
        let records = provider
            .fetch(&target(), 0, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(records.is_empty());
    }
}
