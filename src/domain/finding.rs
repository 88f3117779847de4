//! Unified finding model produced by the ingest pipeline

use serde::{Deserialize, Serialize};

/// Severity tiers for vulnerability findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    /// Upstream record carried no usable metric
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "critical" | "crit" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" | "med" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            "unknown" | "none" => Some(Severity::Unknown),
            _ => None,
        }
    }

    /// Derive a tier from a CVSS base score (v3 bands).
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            Severity::Critical
        } else if score >= 7.0 {
            Severity::High
        } else if score >= 4.0 {
            Severity::Medium
        } else if score > 0.0 {
            Severity::Low
        } else {
            Severity::Unknown
        }
    }

    /// Sort rank, most severe first (for ordering within a brief).
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
            Severity::Unknown => 4,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind of a finding - one per provider family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingKind {
    Cve,
    Exposure,
    Asset,
    Tech,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::Cve => "cve",
            FindingKind::Exposure => "exposure",
            FindingKind::Asset => "asset",
            FindingKind::Tech => "tech",
        }
    }
}

/// A known vulnerability, identified by its CVE ID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CveFinding {
    /// Canonical identity, e.g. "CVE-2021-44228"
    pub cve_id: String,
    /// CVSS base score (0.0 when the upstream record carried none)
    pub cvss: f64,
    pub severity: Severity,
    pub summary: String,
    /// Provider that supplied the record
    pub source: String,
}

/// A code/configuration exposure found in public hosting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureFinding {
    /// Canonical identity: the normalized URL of the exposed content
    pub url: String,
    pub repo: Option<String>,
    pub snippet: String,
    pub confidence: f64,
    pub source: String,
}

/// An asset (host, domain, endpoint) attributed to the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetFinding {
    pub name: String,
    pub confidence: f64,
    pub source: String,
}

/// A technology fingerprint attributed to the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechFinding {
    pub name: String,
    pub version: Option<String>,
    pub confidence: f64,
    pub source: String,
}

/// A single triage finding. Immutable once created; identity is unique
/// within its kind after deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Finding {
    Cve(CveFinding),
    Exposure(ExposureFinding),
    Asset(AssetFinding),
    Tech(TechFinding),
}

impl Finding {
    pub fn kind(&self) -> FindingKind {
        match self {
            Finding::Cve(_) => FindingKind::Cve,
            Finding::Exposure(_) => FindingKind::Exposure,
            Finding::Asset(_) => FindingKind::Asset,
            Finding::Tech(_) => FindingKind::Tech,
        }
    }

    /// Canonical identity within the finding's kind.
    pub fn identity(&self) -> &str {
        match self {
            Finding::Cve(f) => &f.cve_id,
            Finding::Exposure(f) => &f.url,
            Finding::Asset(f) => &f.name,
            Finding::Tech(f) => &f.name,
        }
    }

    /// Provider that supplied the winning record.
    pub fn source(&self) -> &str {
        match self {
            Finding::Cve(f) => &f.source,
            Finding::Exposure(f) => &f.source,
            Finding::Asset(f) => &f.source,
            Finding::Tech(f) => &f.source,
        }
    }

    /// Returns true when `self` beats `other` in a duplicate-key merge.
    ///
    /// CVE records compare by severity tier then score; the other kinds by
    /// confidence. Equal strength is not a win - the caller breaks that tie
    /// by provider order.
    pub fn outranks(&self, other: &Finding) -> bool {
        match (self, other) {
            (Finding::Cve(a), Finding::Cve(b)) => {
                a.severity.rank() < b.severity.rank()
                    || (a.severity.rank() == b.severity.rank() && a.cvss > b.cvss)
            }
            (a, b) => a.confidence() > b.confidence(),
        }
    }

    fn confidence(&self) -> f64 {
        match self {
            Finding::Cve(f) => f.cvss,
            Finding::Exposure(f) => f.confidence,
            Finding::Asset(f) => f.confidence,
            Finding::Tech(f) => f.confidence,
        }
    }
}
