//! Wall-clock and result-count budget enforcement
//!
//! Every provider call goes through [`guarded_fetch`]: the run deadline is
//! checked before the provider is invoked, the call gets its own timeout
//! (clipped to whatever deadline remains), and successful results are
//! capped deterministically by keeping the first N records in
//! provider-returned order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::FailureKind;
use crate::domain::Target;
use crate::provider::{LookupProvider, RawRecord};

/// Latency and result budget for one orchestration run. Shared by that
/// run's provider tasks, never across runs.
pub struct BudgetState {
    deadline: Instant,
    consumed: AtomicUsize,
    provider_cap: usize,
}

impl BudgetState {
    pub fn new(deadline: Instant, provider_cap: usize) -> Self {
        Self {
            deadline,
            consumed: AtomicUsize::new(0),
            provider_cap,
        }
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Time left before the run deadline.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn provider_cap(&self) -> usize {
        self.provider_cap
    }

    /// Raw records accepted so far across all providers in the run.
    pub fn consumed(&self) -> usize {
        self.consumed.load(Ordering::Relaxed)
    }

    fn consume(&self, n: usize) {
        self.consumed.fetch_add(n, Ordering::Relaxed);
    }
}

/// What one guarded provider call produced.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Raw records, already capped to the budget's per-provider maximum
    Records(Vec<RawRecord>),
    /// The call failed; the message is for diagnostics only
    Failed(FailureKind, String),
}

/// Invoke a provider under the run budget.
///
/// Returns `BudgetExceeded` without touching the provider when the
/// deadline has already passed. A timeout here never aborts sibling calls;
/// the caller absorbs the failure into partial results.
pub async fn guarded_fetch(
    provider: &dyn LookupProvider,
    target: &Target,
    budget: &BudgetState,
    call_timeout: Duration,
) -> FetchOutcome {
    if budget.expired() {
        return FetchOutcome::Failed(
            FailureKind::BudgetExceeded,
            "run deadline passed before the call".to_string(),
        );
    }

    let window = call_timeout.min(budget.remaining());
    let cap = budget.provider_cap();

    match tokio::time::timeout(window, provider.fetch(target, cap, window)).await {
        Ok(Ok(mut records)) => {
            // Keep-first-N in provider order so reruns are reproducible.
            records.truncate(cap);
            budget.consume(records.len());
            FetchOutcome::Records(records)
        }
        Ok(Err(e)) => FetchOutcome::Failed(FailureKind::Upstream, e.to_string()),
        Err(_) => {
            let kind = if budget.expired() {
                FailureKind::BudgetExceeded
            } else {
                FailureKind::ProviderTimeout
            };
            FetchOutcome::Failed(kind, format!("no response within {:?}", window))
        }
    }
}
