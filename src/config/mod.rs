//! Runtime configuration and operating modes
//!
//! All mode flags are read from the environment exactly once, when `main`
//! builds the [`Config`]; nothing re-reads the environment afterwards.
//! Tests construct a `Config` directly instead.

use std::path::PathBuf;
use std::time::Duration;

use crate::provider::ProviderKind;

/// Maximum CVE findings in a brief.
pub const BRIEF_CVE_CAP: usize = 8;

/// Maximum findings per non-CVE kind in a brief.
pub const BRIEF_KIND_CAP: usize = 10;

/// How deep a triage run digs, and how long it may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Quick,
    Standard,
}

impl Depth {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "q" | "quick" => Some(Depth::Quick),
            "s" | "std" | "standard" => Some(Depth::Standard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Depth::Quick => "quick",
            Depth::Standard => "standard",
        }
    }

    /// Wall-clock budget for the whole run.
    pub fn deadline(&self) -> Duration {
        match self {
            Depth::Quick => Duration::from_secs(15),
            Depth::Standard => Duration::from_secs(30),
        }
    }

    /// Timeout for a single provider call, independent of the run deadline.
    pub fn call_timeout(&self) -> Duration {
        match self {
            Depth::Quick => Duration::from_secs(10),
            Depth::Standard => Duration::from_secs(20),
        }
    }

    /// Records requested per provider at this depth, before the mode cap.
    fn request_cap(&self) -> Option<usize> {
        match self {
            Depth::Quick => Some(5),
            Depth::Standard => None,
        }
    }
}

impl std::fmt::Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Process-wide configuration, immutable after startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Reduced result caps, short cache TTL, response byte ceiling
    pub low_data: bool,
    /// Deterministic fixture providers instead of live upstream calls
    pub stub_mode: bool,
    /// Optional NVD API key (improves upstream rate limits)
    pub nvd_api_key: Option<String>,
    /// Provider kinds in priority order; also the dedup tiebreak order
    pub provider_order: Vec<ProviderKind>,
    /// Where the evidence trail is written
    pub evidence_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            low_data: true,
            stub_mode: true,
            nvd_api_key: None,
            provider_order: vec![
                ProviderKind::VulnSearch,
                ProviderKind::CodeSearch,
                ProviderKind::AssetDiscovery,
                ProviderKind::TechFingerprint,
            ],
            evidence_path: default_evidence_path(),
        }
    }
}

impl Config {
    /// Build the configuration from environment flags. Call once at startup.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.low_data = env_flag("RELIC_LOW_DATA", config.low_data);
        config.stub_mode = env_flag("RELIC_STUB_MODE", config.stub_mode);
        config.nvd_api_key = std::env::var("RELIC_NVD_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        config
    }

    /// Per-provider raw record cap for the current mode.
    pub fn provider_cap(&self) -> usize {
        if self.low_data { 10 } else { 25 }
    }

    /// Cap actually applied to one provider call at the given depth.
    pub fn effective_cap(&self, depth: Depth) -> usize {
        let mode_cap = self.provider_cap();
        match depth.request_cap() {
            Some(requested) => requested.min(mode_cap),
            None => mode_cap,
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        if self.low_data {
            Duration::from_secs(15 * 60)
        } else {
            Duration::from_secs(60 * 60)
        }
    }

    /// Serialized-brief ceiling; `None` disables the check.
    pub fn response_byte_cap(&self) -> Option<usize> {
        self.low_data.then_some(200 * 1024)
    }
}

/// Default evidence log location (~/.relic/evidence.log).
fn default_evidence_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".relic")
        .join("evidence.log")
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_parsing() {
        assert_eq!(Depth::from_str("quick"), Some(Depth::Quick));
        assert_eq!(Depth::from_str("STANDARD"), Some(Depth::Standard));
        assert_eq!(Depth::from_str("deep"), None);
    }

    #[test]
    fn test_low_data_operating_point() {
        let config = Config::default();
        assert!(config.low_data);
        assert_eq!(config.provider_cap(), 10);
        assert_eq!(config.cache_ttl(), Duration::from_secs(900));
        assert_eq!(config.response_byte_cap(), Some(204_800));
    }

    #[test]
    fn test_full_data_operating_point() {
        let config = Config {
            low_data: false,
            ..Config::default()
        };
        assert_eq!(config.provider_cap(), 25);
        assert_eq!(config.response_byte_cap(), None);
    }

    #[test]
    fn test_effective_cap_takes_the_smaller_bound() {
        let config = Config::default();
        assert_eq!(config.effective_cap(Depth::Quick), 5);
        assert_eq!(config.effective_cap(Depth::Standard), 10);

        let full = Config {
            low_data: false,
            ..Config::default()
        };
        assert_eq!(full.effective_cap(Depth::Quick), 5);
        assert_eq!(full.effective_cap(Depth::Standard), 25);
    }
}
