//! Lookup provider interface and registry
//!
//! A provider answers one question about a target (known CVEs, exposed
//! code, owned assets, technology fingerprints) and returns a bounded list
//! of raw records, or fails. The orchestrator only ever talks to the
//! [`LookupProvider`] trait, so fixture and live implementations swap
//! freely; [`ProviderRegistry::for_config`] picks the set for the current
//! operating mode.

mod nvd;
mod stub;

pub use nvd::NvdProvider;
pub use stub::{StubAssetProvider, StubExposureProvider, StubTechProvider, StubVulnProvider};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;
use crate::domain::{FindingKind, Target};

/// The question a provider answers. One configured provider per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Vulnerability database search by product hint
    VulnSearch,
    /// Code-hosting search for exposed configuration
    CodeSearch,
    /// Asset attribution (enrichment)
    AssetDiscovery,
    /// Technology fingerprinting (enrichment)
    TechFingerprint,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::VulnSearch => "vuln-search",
            ProviderKind::CodeSearch => "code-search",
            ProviderKind::AssetDiscovery => "asset-discovery",
            ProviderKind::TechFingerprint => "tech-fingerprint",
        }
    }

    /// Enrichment kinds are skipped when a run asks for core findings only.
    pub fn is_enrichment(&self) -> bool {
        matches!(
            self,
            ProviderKind::AssetDiscovery | ProviderKind::TechFingerprint
        )
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A vulnerability record as returned by a provider, fields unvalidated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawCve {
    pub cve_id: Option<String>,
    pub cvss: Option<f64>,
    pub severity: Option<String>,
    pub summary: Option<String>,
}

/// An exposed-content record, fields unvalidated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawExposure {
    pub url: Option<String>,
    pub repo: Option<String>,
    pub snippet: Option<String>,
    pub confidence: Option<f64>,
}

/// An asset-attribution record, fields unvalidated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawAsset {
    pub name: Option<String>,
    pub confidence: Option<f64>,
}

/// A technology-fingerprint record, fields unvalidated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTech {
    pub name: Option<String>,
    pub version: Option<String>,
    pub confidence: Option<f64>,
}

/// One heterogeneous upstream record. The ingest step maps these into
/// unified findings and drops the ones missing their identity field.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Cve(RawCve),
    Exposure(RawExposure),
    Asset(RawAsset),
    Tech(RawTech),
}

impl RawRecord {
    /// The finding kind this record maps to.
    pub fn finding_kind(&self) -> FindingKind {
        match self {
            RawRecord::Cve(_) => FindingKind::Cve,
            RawRecord::Exposure(_) => FindingKind::Exposure,
            RawRecord::Asset(_) => FindingKind::Asset,
            RawRecord::Tech(_) => FindingKind::Tech,
        }
    }
}

/// A failed provider call. The message stays in diagnostics; callers see
/// only the stable failure class.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

/// An external lookup source for one kind of finding.
#[async_trait]
pub trait LookupProvider: Send + Sync {
    /// Short tool name recorded in evidence (e.g. "nvd", "stub-cve").
    fn name(&self) -> &str;

    fn kind(&self) -> ProviderKind;

    /// Fetch at most `cap` raw records for `target`. `timeout` is the
    /// per-call budget; implementations doing their own I/O should pass it
    /// down to their transport.
    async fn fetch(
        &self,
        target: &Target,
        cap: usize,
        timeout: Duration,
    ) -> Result<Vec<RawRecord>, ProviderError>;
}

/// The configured provider set, one per kind.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn LookupProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Registry matching the operating mode: all fixtures in stub mode,
    /// otherwise the live NVD lookup with fixtures for the kinds that have
    /// no live implementation yet.
    pub fn for_config(config: &Config) -> Self {
        if config.stub_mode {
            return Self::with_stubs();
        }
        let mut registry = Self::with_stubs();
        registry.register(Arc::new(NvdProvider::new(config.nvd_api_key.clone())));
        registry
    }

    /// Registry of deterministic fixtures for every kind.
    pub fn with_stubs() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(StubVulnProvider));
        registry.register(Arc::new(StubExposureProvider));
        registry.register(Arc::new(StubAssetProvider));
        registry.register(Arc::new(StubTechProvider));
        registry
    }

    /// Register a provider under its kind, replacing any existing one.
    pub fn register(&mut self, provider: Arc<dyn LookupProvider>) {
        self.providers.insert(provider.kind(), provider);
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn LookupProvider>> {
        self.providers.get(&kind).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_for_stub_mode() {
        let registry = ProviderRegistry::for_config(&Config::default());
        let vuln = registry.get(ProviderKind::VulnSearch).unwrap();
        assert_eq!(vuln.name(), "stub-cve");
    }

    #[test]
    fn test_registry_for_live_mode_swaps_vuln_search() {
        let config = Config {
            stub_mode: false,
            ..Config::default()
        };
        let registry = ProviderRegistry::for_config(&config);
        assert_eq!(registry.get(ProviderKind::VulnSearch).unwrap().name(), "nvd");
        // Exposure lookups stay fixture-backed even in live mode.
        assert_eq!(
            registry.get(ProviderKind::CodeSearch).unwrap().name(),
            "stub-github"
        );
    }

    #[test]
    fn test_register_replaces_same_kind() {
        let mut registry = ProviderRegistry::with_stubs();
        registry.register(Arc::new(NvdProvider::new(None)));
        assert_eq!(registry.get(ProviderKind::VulnSearch).unwrap().name(), "nvd");
    }
}
