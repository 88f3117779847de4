use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(name = "relic")]
#[command(about = "Relic Recon - bounded, time-boxed security triage briefs")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a triage against a target and print the brief
    Triage {
        /// Domain or product name to triage
        target: String,

        /// How deep to dig: quick (15s budget) or standard (30s budget)
        #[arg(long, default_value = "quick")]
        depth: String,

        /// Skip the enrichment lookups (assets, tech fingerprints)
        #[arg(long)]
        no_enrichment: bool,

        /// Print the brief as JSON instead of a text summary
        #[arg(long)]
        json: bool,
    },

    /// Show where the evidence trail lives and its most recent entries
    Evidence {
        /// How many entries to show
        #[arg(long, default_value_t = 20)]
        tail: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    match cli.command {
        Commands::Triage {
            target,
            depth,
            no_enrichment,
            json,
        } => {
            cli::triage::triage_command(&target, &depth, !no_enrichment, json).await?;
        }
        Commands::Evidence { tail } => {
            cli::evidence::evidence_command(tail)?;
        }
    }

    Ok(())
}
