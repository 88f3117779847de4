//! The aggregate output of one triage run

use serde::{Deserialize, Serialize};

use super::finding::{AssetFinding, CveFinding, ExposureFinding, TechFinding};
use super::source_record::SourceRecord;
use super::target::Target;

/// Passive verification steps suggested alongside every brief.
pub const PASSIVE_CHECKS: [&str; 4] = [
    "Verify CVE applicability to in-scope assets",
    "Review exposed configurations (passive only)",
    "Check TLS/headers and CSP",
    "Enumerate subdomains (passive)",
];

/// The final aggregated, ranked, capped output of one triage run.
///
/// Owned exclusively by the run that produced it; finding lists are ordered
/// by priority and already truncated to their caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brief {
    /// Correlation identifier for this run (also carried by run failures)
    pub correlation_id: String,
    pub target: Target,
    pub cves: Vec<CveFinding>,
    pub exposures: Vec<ExposureFinding>,
    pub assets: Vec<AssetFinding>,
    pub tech: Vec<TechFinding>,
    /// Suggested passive follow-up checks
    pub checks: Vec<String>,
    /// Every provider call attempted during the run, in provider order
    pub sources: Vec<SourceRecord>,
}

impl Brief {
    pub fn new(correlation_id: String, target: Target) -> Self {
        Self {
            correlation_id,
            target,
            cves: Vec::new(),
            exposures: Vec::new(),
            assets: Vec::new(),
            tech: Vec::new(),
            checks: PASSIVE_CHECKS.iter().map(|c| c.to_string()).collect(),
            sources: Vec::new(),
        }
    }

    /// Total findings across all kinds.
    pub fn finding_count(&self) -> usize {
        self.cves.len() + self.exposures.len() + self.assets.len() + self.tech.len()
    }
}
