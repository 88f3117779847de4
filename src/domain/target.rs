//! Normalized triage target

use serde::{Deserialize, Serialize};

use super::error::InvalidTargetError;

/// Longest accepted raw input, matching the longest legal DNS name.
pub const MAX_TARGET_LEN: usize = 253;

/// The identifier under triage - a domain or product name, normalized.
///
/// A `Target` can only be obtained through [`Target::normalize`], so every
/// value in circulation is lower-cased, trimmed, scheme- and path-free, and
/// non-empty. Normalization is idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    /// Normalize a raw identifier into a `Target`.
    ///
    /// Strips an `http://`/`https://` scheme, drops the path portion of a
    /// domain, lower-cases, and collapses internal whitespace. Fails on
    /// empty, whitespace-only, or over-length input.
    pub fn normalize(raw: &str) -> Result<Self, InvalidTargetError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidTargetError("target is empty".to_string()));
        }
        if trimmed.len() > MAX_TARGET_LEN {
            return Err(InvalidTargetError(format!(
                "target exceeds {} characters",
                MAX_TARGET_LEN
            )));
        }

        let mut value = trimmed.to_lowercase();
        for scheme in ["https://", "http://"] {
            if let Some(rest) = value.strip_prefix(scheme) {
                value = rest.to_string();
            }
        }

        // A domain keeps only its host portion; anything without a dot in
        // the leading segment (product names, search phrases) keeps its
        // content and loses only trailing slashes.
        if let Some((host, _path)) = value.split_once('/') {
            if host.contains('.') && !host.contains(char::is_whitespace) {
                value = host.to_string();
            }
        }
        let value = value.trim_end_matches('/');

        let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
        if value.is_empty() {
            return Err(InvalidTargetError(
                "target is empty after normalization".to_string(),
            ));
        }

        Ok(Target(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
