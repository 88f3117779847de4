//! Deterministic ranking and truncation
//!
//! CVE findings sort by severity tier, then numeric score descending, then
//! identity; other kinds by confidence descending, then identity. The
//! identity tiebreak keeps output stable across runs. Truncation is a pure
//! prefix take.

use crate::domain::{AssetFinding, CveFinding, ExposureFinding, Finding, TechFinding};

/// Findings split by kind and sorted into brief order.
#[derive(Debug, Default)]
pub struct RankedFindings {
    pub cves: Vec<CveFinding>,
    pub exposures: Vec<ExposureFinding>,
    pub assets: Vec<AssetFinding>,
    pub tech: Vec<TechFinding>,
}

impl RankedFindings {
    /// Split and sort a deduplicated finding set.
    pub fn rank(findings: Vec<Finding>) -> Self {
        let mut ranked = Self::default();
        for finding in findings {
            match finding {
                Finding::Cve(f) => ranked.cves.push(f),
                Finding::Exposure(f) => ranked.exposures.push(f),
                Finding::Asset(f) => ranked.assets.push(f),
                Finding::Tech(f) => ranked.tech.push(f),
            }
        }

        ranked.cves.sort_by(|a, b| {
            a.severity
                .rank()
                .cmp(&b.severity.rank())
                .then(b.cvss.total_cmp(&a.cvss))
                .then_with(|| a.cve_id.cmp(&b.cve_id))
        });
        ranked.exposures.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.url.cmp(&b.url))
        });
        ranked.assets.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.name.cmp(&b.name))
        });
        ranked.tech.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.name.cmp(&b.name))
        });
        ranked
    }

    /// Prefix-truncate each list to its brief cap, preserving order.
    pub fn truncate(&mut self, cve_cap: usize, kind_cap: usize) {
        self.cves.truncate(cve_cap);
        self.exposures.truncate(kind_cap);
        self.assets.truncate(kind_cap);
        self.tech.truncate(kind_cap);
    }
}
