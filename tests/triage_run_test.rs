//! End-to-end orchestrator tests with fixture providers

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{
    FailingProvider, ScriptedProvider, SleepyProvider, evidence_lines, harness, raw_cve,
    raw_exposure,
};
use relic::config::{Config, Depth};
use relic::domain::{Outcome, Severity, TriageError};
use relic::engine::RunOptions;
use relic::provider::ProviderKind;

#[tokio::test]
async fn test_partial_failure_degrades_to_partial_results() {
    let (orchestrator, dir) = harness(
        vec![
            Arc::new(FailingProvider::new("vuln-down", ProviderKind::VulnSearch)),
            Arc::new(ScriptedProvider::new(
                "exposures",
                ProviderKind::CodeSearch,
                vec![
                    raw_exposure("https://github.com/example/repo/config/a.yml"),
                    raw_exposure("https://github.com/example/repo/config/b.yml"),
                ],
            )),
        ],
        Config::default(),
    );

    let brief = orchestrator
        .run("example.com", Depth::Standard, &RunOptions::default())
        .await
        .unwrap();

    assert!(brief.cves.is_empty());
    assert_eq!(brief.exposures.len(), 2);

    let failed: Vec<_> = brief
        .sources
        .iter()
        .filter(|s| s.outcome == Outcome::Failure)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].tool, "vuln-down");
    assert_eq!(failed[0].error_class.as_deref(), Some("upstream_error"));

    drop(dir);
}

#[tokio::test]
async fn test_total_failure_is_an_upstream_error() {
    let (orchestrator, _dir) = harness(
        vec![
            Arc::new(FailingProvider::new("vuln-down", ProviderKind::VulnSearch)),
            Arc::new(FailingProvider::new("code-down", ProviderKind::CodeSearch)),
        ],
        Config::default(),
    );

    let err = orchestrator
        .run("example.com", Depth::Quick, &RunOptions::default())
        .await
        .unwrap_err();

    match &err {
        TriageError::Upstream { correlation_id } => assert!(!correlation_id.is_empty()),
        other => panic!("expected Upstream, got {:?}", other),
    }
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn test_invalid_target_fails_fast() {
    let (orchestrator, dir) = harness(vec![], Config::default());

    let err = orchestrator
        .run("   ", Depth::Quick, &RunOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    // Nothing upstream was attempted.
    assert!(evidence_lines(&dir).is_empty());
}

#[tokio::test]
async fn test_cache_serves_the_second_run() {
    let vuln = Arc::new(ScriptedProvider::new(
        "counted-vuln",
        ProviderKind::VulnSearch,
        vec![raw_cve("CVE-2024-0001", 8.0, Some("High"))],
    ));
    let (orchestrator, dir) = harness(vec![vuln.clone()], Config::default());

    let first = orchestrator
        .run("example.com", Depth::Quick, &RunOptions::default())
        .await
        .unwrap();
    let second = orchestrator
        .run("https://EXAMPLE.com/", Depth::Quick, &RunOptions::default())
        .await
        .unwrap();

    // Same normalized target within the TTL window: one upstream call.
    assert_eq!(vuln.call_count(), 1);
    assert_eq!(first.cves, second.cves);
    assert!(second.sources.iter().any(|s| s.outcome == Outcome::CacheHit));

    let outcomes: Vec<String> = evidence_lines(&dir)
        .iter()
        .map(|v| v["outcome"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(outcomes, vec!["success", "cache_hit"]);
}

#[tokio::test]
async fn test_low_data_caps_and_orders_cves() {
    // Fifteen raw records; LOW_DATA at standard depth caps the provider at
    // ten, and the brief at eight.
    let records: Vec<_> = (0..15)
        .map(|i| {
            let (cvss, severity) = match i % 4 {
                0 => (9.0 + (i as f64) * 0.05, Some("Critical")),
                1 => (7.0 + (i as f64) * 0.05, Some("High")),
                2 => (5.0 + (i as f64) * 0.05, Some("Medium")),
                _ => (2.0 + (i as f64) * 0.05, Some("Low")),
            };
            raw_cve(&format!("CVE-2024-{:04}", i), cvss, severity)
        })
        .collect();

    let (orchestrator, _dir) = harness(
        vec![Arc::new(ScriptedProvider::new(
            "bulk-vuln",
            ProviderKind::VulnSearch,
            records,
        ))],
        Config::default(),
    );

    let brief = orchestrator
        .run("example.com", Depth::Standard, &RunOptions::default())
        .await
        .unwrap();

    assert!(brief.cves.len() <= 8);
    assert!(!brief.cves.is_empty());

    // Severity tiers never regress, and scores descend within a tier.
    for pair in brief.cves.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.severity.rank() <= b.severity.rank());
        if a.severity.rank() == b.severity.rank() {
            assert!(a.cvss >= b.cvss);
        }
    }
    assert_eq!(brief.cves[0].severity, Severity::Critical);
}

#[tokio::test]
async fn test_duplicate_cve_ids_merge_to_strongest() {
    let (orchestrator, _dir) = harness(
        vec![Arc::new(ScriptedProvider::new(
            "dup-vuln",
            ProviderKind::VulnSearch,
            vec![
                raw_cve("CVE-2024-1111", 7.1, Some("High")),
                raw_cve("CVE-2024-1111", 9.8, Some("Critical")),
            ],
        ))],
        Config::default(),
    );

    let brief = orchestrator
        .run("example.com", Depth::Quick, &RunOptions::default())
        .await
        .unwrap();

    assert_eq!(brief.cves.len(), 1);
    assert_eq!(brief.cves[0].cvss, 9.8);
}

#[tokio::test(start_paused = true)]
async fn test_run_deadline_outlives_a_hung_provider() {
    let started = std::time::Instant::now();
    let logical_start = tokio::time::Instant::now();

    let (orchestrator, _dir) = harness(
        vec![
            Arc::new(SleepyProvider::new(
                "hung-vuln",
                ProviderKind::VulnSearch,
                Duration::from_secs(20),
            )),
            Arc::new(ScriptedProvider::new(
                "exposures",
                ProviderKind::CodeSearch,
                vec![raw_exposure("https://github.com/example/repo/config/a.yml")],
            )),
        ],
        Config::default(),
    );

    let brief = orchestrator
        .run("example.com", Depth::Quick, &RunOptions::default())
        .await
        .unwrap();

    // The quick deadline is 15s; the hung provider contributes nothing and
    // the run does not wait out its 20s sleep.
    assert!(logical_start.elapsed() <= Duration::from_secs(15));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(brief.cves.is_empty());
    assert_eq!(brief.exposures.len(), 1);

    let hung = brief
        .sources
        .iter()
        .find(|s| s.tool == "hung-vuln")
        .unwrap();
    assert_eq!(hung.outcome, Outcome::Failure);
    assert_eq!(hung.error_class.as_deref(), Some("provider_timeout"));
}

#[tokio::test]
async fn test_enrichment_gate_skips_asset_and_tech_kinds() {
    use relic::provider::ProviderRegistry;
    use relic::engine::{LookupCache, Orchestrator};
    use relic::evidence::EvidenceLog;

    let dir = tempfile::TempDir::new().unwrap();
    let orchestrator = Orchestrator::new(
        Config::default(),
        Arc::new(LookupCache::new()),
        Arc::new(EvidenceLog::new(dir.path().join("evidence.log"))),
        ProviderRegistry::with_stubs(),
    );

    let brief = orchestrator
        .run(
            "example.com",
            Depth::Quick,
            &RunOptions {
                include_enrichment: false,
            },
        )
        .await
        .unwrap();

    assert!(brief.assets.is_empty());
    assert!(brief.tech.is_empty());
    assert_eq!(brief.sources.len(), 2);
    assert!(!brief.cves.is_empty());
}

#[tokio::test]
async fn test_stub_registry_end_to_end() {
    use relic::provider::ProviderRegistry;
    use relic::engine::{LookupCache, Orchestrator};
    use relic::evidence::EvidenceLog;

    let dir = tempfile::TempDir::new().unwrap();
    let orchestrator = Orchestrator::new(
        Config::default(),
        Arc::new(LookupCache::new()),
        Arc::new(EvidenceLog::new(dir.path().join("evidence.log"))),
        ProviderRegistry::with_stubs(),
    );

    let brief = orchestrator
        .run("example.com", Depth::Quick, &RunOptions::default())
        .await
        .unwrap();

    assert_eq!(brief.cves.len(), 3);
    assert_eq!(brief.exposures.len(), 2);
    assert_eq!(brief.assets.len(), 1);
    assert_eq!(brief.tech.len(), 1);
    assert_eq!(brief.checks.len(), 4);
    assert_eq!(brief.sources.len(), 4);
    assert!(brief.sources.iter().all(|s| s.outcome == Outcome::Success));
}
