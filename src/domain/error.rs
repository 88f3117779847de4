//! Error taxonomy for triage runs

use serde::Serialize;
use thiserror::Error;

/// Rejection of a raw target string before any run state exists.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct InvalidTargetError(pub String);

/// Per-provider failure classes. These are absorbed into partial results
/// and surface only through the evidence trail, never as the run's error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The provider exceeded its own call timeout
    ProviderTimeout,
    /// The run deadline passed before the provider was invoked
    BudgetExceeded,
    /// The provider returned an error
    Upstream,
}

impl FailureKind {
    /// Stable class string recorded in the evidence trail.
    pub fn error_class(&self) -> &'static str {
        match self {
            FailureKind::ProviderTimeout => "provider_timeout",
            FailureKind::BudgetExceeded => "budget_exceeded",
            FailureKind::Upstream => "upstream_error",
        }
    }
}

/// A failed triage run. Only invalid input or total upstream failure reach
/// the caller; partial provider failures degrade the brief instead.
#[derive(Debug, Error)]
pub enum TriageError {
    #[error("invalid target: {reason}")]
    InvalidTarget {
        reason: String,
        correlation_id: String,
    },

    #[error("all lookup providers failed and no cached data was available")]
    Upstream { correlation_id: String },

    #[error("brief is {size} bytes after truncation, over the {cap} byte cap")]
    ResponseTooLarge {
        size: usize,
        cap: usize,
        correlation_id: String,
    },
}

/// The structured error object handed to callers - a stable kind, a human
/// summary, and the run's correlation identifier. Raw provider errors never
/// appear here.
#[derive(Debug, Clone, Serialize)]
pub struct WireError {
    pub kind: String,
    pub summary: String,
    pub correlation_id: String,
}

impl TriageError {
    pub fn kind(&self) -> &'static str {
        match self {
            TriageError::InvalidTarget { .. } => "invalid_target",
            TriageError::Upstream { .. } => "upstream_error",
            TriageError::ResponseTooLarge { .. } => "response_too_large",
        }
    }

    /// HTTP status the (external) transport layer should map this to.
    pub fn status_code(&self) -> u16 {
        match self {
            TriageError::InvalidTarget { .. } => 400,
            TriageError::Upstream { .. } => 502,
            TriageError::ResponseTooLarge { .. } => 503,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            TriageError::InvalidTarget { correlation_id, .. }
            | TriageError::Upstream { correlation_id }
            | TriageError::ResponseTooLarge { correlation_id, .. } => correlation_id,
        }
    }

    pub fn to_wire(&self) -> WireError {
        WireError {
            kind: self.kind().to_string(),
            summary: self.to_string(),
            correlation_id: self.correlation_id().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let invalid = TriageError::InvalidTarget {
            reason: "empty".to_string(),
            correlation_id: "c1".to_string(),
        };
        let upstream = TriageError::Upstream {
            correlation_id: "c2".to_string(),
        };
        let too_large = TriageError::ResponseTooLarge {
            size: 300_000,
            cap: 204_800,
            correlation_id: "c3".to_string(),
        };
        assert_eq!(invalid.status_code(), 400);
        assert_eq!(upstream.status_code(), 502);
        assert_eq!(too_large.status_code(), 503);
    }

    #[test]
    fn test_wire_form_is_stable() {
        let err = TriageError::Upstream {
            correlation_id: "abc-123".to_string(),
        };
        let wire = err.to_wire();
        assert_eq!(wire.kind, "upstream_error");
        assert_eq!(wire.correlation_id, "abc-123");
        assert!(!wire.summary.is_empty());
    }
}
