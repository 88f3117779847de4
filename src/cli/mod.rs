//! CLI subcommand implementations

pub mod evidence;
pub mod triage;
