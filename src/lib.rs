//! Relic Recon - bounded, time-boxed security triage briefs
//!
//! Relic takes a target identifier (a domain or product name), queries a set
//! of external lookup providers (vulnerability databases, code-hosting
//! search) under strict latency and size budgets, and folds the results into
//! a single deduplicated, ranked, capped brief. Every upstream call attempt
//! is recorded in an append-only evidence trail.
//!
//! ## Operating modes
//!
//! Two environment flags, read once at process start, shape a run:
//!
//! 1. **LOW_DATA** (`RELIC_LOW_DATA`, default on): 10-record provider caps,
//!    a 15-minute cache TTL, and a 200 KB response ceiling.
//!
//! 2. **STUB_MODE** (`RELIC_STUB_MODE`, default on): deterministic fixture
//!    providers instead of live upstream calls.

pub mod config;
pub mod domain;
pub mod engine;
pub mod evidence;
pub mod provider;

pub use domain::*;
