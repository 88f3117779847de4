//! End-to-end triage run orchestration
//!
//! One [`Orchestrator::run`] call is one triage: normalize the target,
//! establish the run budget, fan provider calls out as tasks, absorb
//! per-provider failures into partial results, then dedupe, rank, cap,
//! and assemble the brief. Only invalid input or total upstream failure
//! surface as errors.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::{BRIEF_CVE_CAP, BRIEF_KIND_CAP, Config, Depth};
use crate::domain::{Brief, FailureKind, SourceRecord, Target, TriageError};
use crate::engine::budget::{BudgetState, FetchOutcome, guarded_fetch};
use crate::engine::cache::LookupCache;
use crate::engine::ingest::FindingSet;
use crate::engine::rank::RankedFindings;
use crate::evidence::EvidenceLog;
use crate::provider::{ProviderKind, ProviderRegistry};

/// Per-run options supplied by the caller.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Also run the enrichment provider kinds (assets, tech)
    pub include_enrichment: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            include_enrichment: true,
        }
    }
}

/// Composes cache, budget guard, providers, and evidence into triage runs.
///
/// The cache and evidence log are process-scoped resources owned by the
/// caller and injected here; the orchestrator itself keeps no run state
/// between calls.
pub struct Orchestrator {
    config: Config,
    cache: Arc<LookupCache>,
    evidence: Arc<EvidenceLog>,
    registry: ProviderRegistry,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        cache: Arc<LookupCache>,
        evidence: Arc<EvidenceLog>,
        registry: ProviderRegistry,
    ) -> Self {
        Self {
            config,
            cache,
            evidence,
            registry,
        }
    }

    /// Run one triage against a raw target string.
    pub async fn run(
        &self,
        raw_target: &str,
        depth: Depth,
        options: &RunOptions,
    ) -> Result<Brief, TriageError> {
        let correlation_id = Uuid::new_v4().to_string();
        let target = Target::normalize(raw_target).map_err(|e| TriageError::InvalidTarget {
            reason: e.0,
            correlation_id: correlation_id.clone(),
        })?;

        tracing::info!(
            run_target = %target,
            depth = %depth,
            correlation_id = %correlation_id,
            "triage run started"
        );

        let budget = Arc::new(BudgetState::new(
            Instant::now() + depth.deadline(),
            self.config.effective_cap(depth),
        ));
        let ttl = self.config.cache_ttl();

        let mut set = FindingSet::new();
        let mut sources: Vec<SourceRecord> = Vec::new();
        let mut any_success = false;

        // Cache pass first; misses fan out as concurrent tasks.
        let mut meta: Vec<(usize, ProviderKind, String)> = Vec::new();
        let mut handles: Vec<JoinHandle<FetchOutcome>> = Vec::new();
        for (index, kind) in self.plan(options).into_iter().enumerate() {
            let Some(provider) = self.registry.get(kind) else {
                tracing::debug!(kind = %kind, "no provider configured");
                continue;
            };
            let name = provider.name().to_string();

            if let Some(records) = self.cache.get(kind, &target) {
                let record = SourceRecord::cache_hit(&name);
                self.record_evidence(&record);
                sources.push(record);
                let dropped = set.ingest(records, &name, index);
                self.note_drops(&name, dropped);
                any_success = true;
                continue;
            }

            let task_target = target.clone();
            let task_budget = Arc::clone(&budget);
            let call_timeout = depth.call_timeout();
            handles.push(tokio::spawn(async move {
                guarded_fetch(provider.as_ref(), &task_target, &task_budget, call_timeout).await
            }));
            meta.push((index, kind, name));
        }

        // Every task bounds itself by its call window clipped to the run
        // deadline, so this join cannot outlive the deadline; a provider
        // still on the wire past its window is dropped, not awaited.
        let outcomes = futures::future::join_all(handles).await;
        for ((index, kind, name), joined) in meta.into_iter().zip(outcomes) {
            match joined {
                Ok(FetchOutcome::Records(records)) => {
                    self.cache.put(kind, &target, records.clone(), ttl);
                    let record = SourceRecord::success(&name);
                    self.record_evidence(&record);
                    sources.push(record);
                    let dropped = set.ingest(records, &name, index);
                    self.note_drops(&name, dropped);
                    any_success = true;
                }
                Ok(FetchOutcome::Failed(failure, message)) => {
                    tracing::debug!(provider = %name, %message, "provider call failed");
                    let record = SourceRecord::failure(&name, failure.error_class());
                    self.record_evidence(&record);
                    sources.push(record);
                }
                Err(join_error) => {
                    tracing::warn!(provider = %name, %join_error, "provider task aborted");
                    let record =
                        SourceRecord::failure(&name, FailureKind::Upstream.error_class());
                    self.record_evidence(&record);
                    sources.push(record);
                }
            }
        }

        if !any_success {
            tracing::warn!(correlation_id = %correlation_id, "all providers failed, no cached data");
            return Err(TriageError::Upstream { correlation_id });
        }

        tracing::debug!(
            consumed = budget.consumed(),
            findings = set.len(),
            "aggregation complete"
        );

        let mut ranked = RankedFindings::rank(set.into_findings());
        ranked.truncate(BRIEF_CVE_CAP, BRIEF_KIND_CAP);

        let mut brief = Brief::new(correlation_id, target);
        brief.cves = ranked.cves;
        brief.exposures = ranked.exposures;
        brief.assets = ranked.assets;
        brief.tech = ranked.tech;
        brief.sources = sources;

        enforce_byte_cap(&mut brief, self.config.response_byte_cap())?;
        Ok(brief)
    }

    /// Provider kinds to run, in configured (and dedup-tiebreak) order.
    fn plan(&self, options: &RunOptions) -> Vec<ProviderKind> {
        self.config
            .provider_order
            .iter()
            .copied()
            .filter(|kind| options.include_enrichment || !kind.is_enrichment())
            .collect()
    }

    /// Evidence is best-effort: failures go to diagnostics, never the run.
    fn record_evidence(&self, record: &SourceRecord) {
        if let Err(e) = self.evidence.record(record) {
            tracing::warn!(error = %e, "evidence write failed");
        }
    }

    fn note_drops(&self, tool: &str, dropped: usize) {
        if dropped == 0 {
            return;
        }
        let detail = format!("{} records dropped", dropped);
        if let Err(e) = self.evidence.note(tool, "malformed_record", &detail) {
            tracing::warn!(error = %e, "evidence note failed");
        }
    }
}

/// Shrink the brief under the response byte cap by dropping the
/// lowest-priority findings first: exposures, then tech, then assets, and
/// CVEs only as a last resort. Fails if the envelope alone is still over.
fn enforce_byte_cap(brief: &mut Brief, cap: Option<usize>) -> Result<(), TriageError> {
    let Some(cap) = cap else {
        return Ok(());
    };
    loop {
        let Ok(serialized) = serde_json::to_vec(&*brief) else {
            tracing::warn!("brief serialization failed, skipping byte-cap check");
            return Ok(());
        };
        let size = serialized.len();
        if size <= cap {
            return Ok(());
        }
        // Lists are sorted best-first, so pop removes the weakest entry.
        if brief.exposures.pop().is_some()
            || brief.tech.pop().is_some()
            || brief.assets.pop().is_some()
            || brief.cves.pop().is_some()
        {
            continue;
        }
        return Err(TriageError::ResponseTooLarge {
            size,
            cap,
            correlation_id: brief.correlation_id.clone(),
        });
    }
}
