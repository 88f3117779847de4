//! Raw-record normalization and deduplication
//!
//! Heterogeneous provider records are mapped into unified findings with
//! kind-specific field extraction. Records missing their identity field are
//! dropped (never failing the run); the caller writes the drop to the
//! evidence trail. Duplicates collapse by (kind, identity) with the
//! stronger record winning and ties going to the earliest provider in
//! configured order, so reruns against the same cache state reproduce.

use std::collections::HashMap;

use crate::domain::{
    AssetFinding, CveFinding, ExposureFinding, Finding, FindingKind, Severity, TechFinding,
};
use crate::provider::RawRecord;

struct Stored {
    finding: Finding,
    provider_index: usize,
}

/// Accumulates findings across providers, collapsing duplicates.
#[derive(Default)]
pub struct FindingSet {
    entries: HashMap<(FindingKind, String), Stored>,
}

impl FindingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one provider's records in. `provider_index` is the provider's
    /// position in configured order. Returns how many malformed records
    /// were dropped.
    pub fn ingest(&mut self, records: Vec<RawRecord>, source: &str, provider_index: usize) -> usize {
        let mut dropped = 0;
        for record in records {
            let record_kind = record.finding_kind();
            match map_record(record, source) {
                Some(finding) => self.insert(finding, provider_index),
                None => {
                    dropped += 1;
                    tracing::debug!(
                        source,
                        kind = record_kind.as_str(),
                        "dropped record without identity"
                    );
                }
            }
        }
        dropped
    }

    fn insert(&mut self, finding: Finding, provider_index: usize) {
        let key = (finding.kind(), finding.identity().to_lowercase());
        match self.entries.get_mut(&key) {
            None => {
                self.entries.insert(
                    key,
                    Stored {
                        finding,
                        provider_index,
                    },
                );
            }
            Some(existing) => {
                let wins = finding.outranks(&existing.finding)
                    || (!existing.finding.outranks(&finding)
                        && provider_index < existing.provider_index);
                if wins {
                    existing.finding = finding;
                    existing.provider_index = provider_index;
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the set. Ordering is left to the ranking stage.
    pub fn into_findings(self) -> Vec<Finding> {
        self.entries.into_values().map(|s| s.finding).collect()
    }
}

/// Kind-specific extraction from a raw record. `None` means the record
/// lacks its identity field and must be dropped.
fn map_record(record: RawRecord, source: &str) -> Option<Finding> {
    match record {
        RawRecord::Cve(raw) => {
            let cve_id = non_empty(raw.cve_id)?;
            let cvss = raw.cvss.unwrap_or(0.0);
            let severity = raw
                .severity
                .as_deref()
                .and_then(Severity::from_str)
                .unwrap_or_else(|| Severity::from_score(cvss));
            Some(Finding::Cve(CveFinding {
                cve_id,
                cvss,
                severity,
                summary: raw.summary.unwrap_or_else(|| "N/A".to_string()),
                source: source.to_string(),
            }))
        }
        RawRecord::Exposure(raw) => {
            let url = non_empty(raw.url)?;
            Some(Finding::Exposure(ExposureFinding {
                url,
                repo: raw.repo,
                snippet: raw.snippet.unwrap_or_default(),
                confidence: raw.confidence.unwrap_or(0.5),
                source: source.to_string(),
            }))
        }
        RawRecord::Asset(raw) => {
            let name = non_empty(raw.name)?;
            Some(Finding::Asset(AssetFinding {
                name,
                confidence: raw.confidence.unwrap_or(0.5),
                source: source.to_string(),
            }))
        }
        RawRecord::Tech(raw) => {
            let name = non_empty(raw.name)?;
            Some(Finding::Tech(TechFinding {
                name,
                version: raw.version,
                confidence: raw.confidence.unwrap_or(0.5),
                source: source.to_string(),
            }))
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
