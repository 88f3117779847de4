//! `relic triage` - run one triage and print the brief

use std::sync::Arc;

use anyhow::{Context, Result, bail};

use relic::config::{Config, Depth};
use relic::domain::Brief;
use relic::engine::{LookupCache, Orchestrator, RunOptions};
use relic::evidence::EvidenceLog;
use relic::provider::ProviderRegistry;

pub async fn triage_command(
    target: &str,
    depth: &str,
    include_enrichment: bool,
    json: bool,
) -> Result<()> {
    let Some(depth) = Depth::from_str(depth) else {
        bail!("unknown depth '{}' (expected quick or standard)", depth);
    };

    let config = Config::from_env();
    let evidence = Arc::new(EvidenceLog::new(config.evidence_path.clone()));
    let registry = ProviderRegistry::for_config(&config);
    let orchestrator = Orchestrator::new(config, Arc::new(LookupCache::new()), evidence, registry);

    let options = RunOptions { include_enrichment };
    match orchestrator.run(target, depth, &options).await {
        Ok(brief) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&brief).context("Failed to serialize brief")?
                );
            } else {
                print_brief(&brief);
            }
            Ok(())
        }
        Err(err) => {
            let wire = err.to_wire();
            eprintln!(
                "{}",
                serde_json::to_string(&wire).context("Failed to serialize error")?
            );
            std::process::exit(1);
        }
    }
}

fn print_brief(brief: &Brief) {
    println!(
        "Triage brief for {} - {} findings [{}]",
        brief.target,
        brief.finding_count(),
        brief.correlation_id
    );

    println!("\nCVEs ({}):", brief.cves.len());
    for cve in &brief.cves {
        println!(
            "  {} [{} {:.1}] {}",
            cve.cve_id, cve.severity, cve.cvss, cve.summary
        );
    }

    println!("\nExposures ({}):", brief.exposures.len());
    for exposure in &brief.exposures {
        println!("  {} - {}", exposure.url, exposure.snippet);
    }

    println!("\nAssets ({}):", brief.assets.len());
    for asset in &brief.assets {
        println!("  {}", asset.name);
    }

    println!("\nTech ({}):", brief.tech.len());
    for tech in &brief.tech {
        match &tech.version {
            Some(version) => println!("  {} {}", tech.name, version),
            None => println!("  {}", tech.name),
        }
    }

    println!("\nSuggested checks:");
    for check in &brief.checks {
        println!("  - {}", check);
    }

    println!("\nSources:");
    for source in &brief.sources {
        match &source.error_class {
            Some(class) => println!(
                "  {} {} ({})",
                source.tool,
                source.outcome.as_str(),
                class
            ),
            None => println!("  {} {}", source.tool, source.outcome.as_str()),
        }
    }
}
