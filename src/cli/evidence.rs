//! `relic evidence` - inspect the evidence trail

use anyhow::{Context, Result};

use relic::config::Config;

pub fn evidence_command(tail: usize) -> Result<()> {
    let path = Config::from_env().evidence_path;
    if !path.exists() {
        println!("No evidence recorded yet (would be at {})", path.display());
        return Ok(());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read evidence log: {}", path.display()))?;
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(tail);

    println!("Evidence trail at {}", path.display());
    for line in &lines[start..] {
        println!("{}", line);
    }
    println!("({} of {} entries)", lines.len() - start, lines.len());
    Ok(())
}
