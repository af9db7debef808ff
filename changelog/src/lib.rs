//! Reading, validating and editing "Keep a Changelog" style `CHANGELOG.md` files.
//!
//! The crate is split along the two halves of a changelog gate:
//!
//! * [`ChangelogDocument`] holds the raw lines of the file and performs
//!   minimal-diff edits such as inserting a new entry under a category.
//! * [`ChangeDetector`] decides whether the paths changed on a branch require
//!   a changelog entry and whether one was provided.
//!
//! [`Validator`] ties both together into the checks run in CI.

pub mod config;
pub mod detector;
pub mod document;
pub mod error;
pub mod format;
pub mod position;
pub mod types;
pub mod utils;
pub mod validation;
pub mod writer;

pub use config::ChangelogConfig;
pub use detector::{ChangeDetector, DiffOutcome, DiffProvider, PipelineContext};
pub use document::{ChangelogDocument, validate_message};
pub use error::ChangelogError;
pub use format::{FormatProblem, FormatReport, FormatWarning};
pub use types::{Category, Result};
pub use validation::{
    CheckKind, CheckOutcome, CheckResult, ValidationReport, ValidationStage, Validator,
};
