//! Per-call provenance records for the evidence trail

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one attempted provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
    CacheHit,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::CacheHit => "cache_hit",
        }
    }
}

/// One attempted provider call: created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Provider/tool name, e.g. "nvd" or "stub-cve"
    pub tool: String,
    pub timestamp: DateTime<Utc>,
    pub outcome: Outcome,
    /// Stable failure class when `outcome` is a failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_class: Option<String>,
}

impl SourceRecord {
    fn new(tool: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            tool: tool.into(),
            timestamp: Utc::now(),
            outcome,
            error_class: None,
        }
    }

    pub fn success(tool: impl Into<String>) -> Self {
        Self::new(tool, Outcome::Success)
    }

    pub fn cache_hit(tool: impl Into<String>) -> Self {
        Self::new(tool, Outcome::CacheHit)
    }

    pub fn failure(tool: impl Into<String>, error_class: impl Into<String>) -> Self {
        let mut record = Self::new(tool, Outcome::Failure);
        record.error_class = Some(error_class.into());
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_carries_error_class() {
        let record = SourceRecord::failure("nvd", "provider_timeout");
        assert_eq!(record.outcome, Outcome::Failure);
        assert_eq!(record.error_class.as_deref(), Some("provider_timeout"));
    }

    #[test]
    fn test_serialized_form_omits_empty_error_class() {
        let line = serde_json::to_string(&SourceRecord::success("stub-cve")).unwrap();
        assert!(line.contains("\"tool\":\"stub-cve\""));
        assert!(line.contains("\"outcome\":\"success\""));
        assert!(!line.contains("error_class"));
    }
}
