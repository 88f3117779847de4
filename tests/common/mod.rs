//! Shared fixture providers and harness for engine integration tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use relic::config::Config;
use relic::domain::Target;
use relic::engine::{LookupCache, Orchestrator};
use relic::evidence::EvidenceLog;
use relic::provider::{
    LookupProvider, ProviderError, ProviderKind, ProviderRegistry, RawCve, RawExposure, RawRecord,
};

/// Returns a fixed script of records on every call, counting invocations.
/// Deliberately ignores the cap so tests can prove the budget guard
/// enforces it.
pub struct ScriptedProvider {
    name: String,
    kind: ProviderKind,
    records: Vec<RawRecord>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(name: &str, kind: ProviderKind, records: Vec<RawRecord>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            records,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LookupProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn fetch(
        &self,
        _target: &Target,
        _cap: usize,
        _timeout: Duration,
    ) -> Result<Vec<RawRecord>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.clone())
    }
}

/// Fails every call.
pub struct FailingProvider {
    name: String,
    kind: ProviderKind,
}

impl FailingProvider {
    pub fn new(name: &str, kind: ProviderKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

#[async_trait]
impl LookupProvider for FailingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn fetch(
        &self,
        _target: &Target,
        _cap: usize,
        _timeout: Duration,
    ) -> Result<Vec<RawRecord>, ProviderError> {
        Err(ProviderError("upstream unavailable".to_string()))
    }
}

/// Sleeps for a fixed duration before answering.
pub struct SleepyProvider {
    name: String,
    kind: ProviderKind,
    delay: Duration,
}

impl SleepyProvider {
    pub fn new(name: &str, kind: ProviderKind, delay: Duration) -> Self {
        Self {
            name: name.to_string(),
            kind,
            delay,
        }
    }
}

#[async_trait]
impl LookupProvider for SleepyProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn fetch(
        &self,
        _target: &Target,
        _cap: usize,
        _timeout: Duration,
    ) -> Result<Vec<RawRecord>, ProviderError> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![raw_cve("CVE-2099-9999", 9.9, Some("Critical"))])
    }
}

pub fn raw_cve(id: &str, cvss: f64, severity: Option<&str>) -> RawRecord {
    RawRecord::Cve(RawCve {
        cve_id: Some(id.to_string()),
        cvss: Some(cvss),
        severity: severity.map(|s| s.to_string()),
        summary: Some(format!("Summary for {}", id)),
    })
}

pub fn raw_exposure(url: &str) -> RawRecord {
    RawRecord::Exposure(RawExposure {
        url: Some(url.to_string()),
        repo: Some("example/repo".to_string()),
        snippet: Some("Potential exposure".to_string()),
        confidence: Some(0.7),
    })
}

/// Build an orchestrator around the given providers, with a fresh cache
/// and an evidence log in a temp dir. The `TempDir` must stay alive for
/// the duration of the test.
pub fn harness(providers: Vec<Arc<dyn LookupProvider>>, config: Config) -> (Orchestrator, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let evidence = Arc::new(EvidenceLog::new(dir.path().join("evidence.log")));
    let mut registry = ProviderRegistry::new();
    for provider in providers {
        registry.register(provider);
    }
    let orchestrator = Orchestrator::new(config, Arc::new(LookupCache::new()), evidence, registry);
    (orchestrator, dir)
}

/// Parse every line of the harness evidence log.
pub fn evidence_lines(dir: &TempDir) -> Vec<serde_json::Value> {
    let path = dir.path().join("evidence.log");
    if !path.exists() {
        return Vec::new();
    }
    std::fs::read_to_string(path)
        .expect("Failed to read evidence log")
        .lines()
        .map(|line| serde_json::from_str(line).expect("Evidence line is not valid JSON"))
        .collect()
}
