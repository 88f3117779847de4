//! Core domain types for triage runs

mod brief;
mod error;
mod finding;
mod source_record;
mod target;

pub use brief::{Brief, PASSIVE_CHECKS};
pub use error::{FailureKind, InvalidTargetError, TriageError, WireError};
pub use finding::{
    AssetFinding, CveFinding, ExposureFinding, Finding, FindingKind, Severity, TechFinding,
};
pub use source_record::{Outcome, SourceRecord};
pub use target::{MAX_TARGET_LEN, Target};
