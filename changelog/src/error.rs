use crate::types::Category;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with changelogs
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Changelog file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Failed to read or write changelog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to compute diff: {0}")]
    DiffUnavailable(String),

    #[error("No '## [Unreleased]' section found in changelog")]
    NoUnreleasedSection,

    #[error("Invalid category '{token}'. Valid options: {options}", token = .0, options = Category::valid_options())]
    InvalidCategory(String),

    #[error("Changelog entry message cannot be empty")]
    EmptyMessage,

    #[error("Changelog entry message must fit on a single line")]
    MultiLineMessage,

    #[error("Invalid changelog format: {}", .0.join("; "))]
    FormatInvalid(Vec<String>),

    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        backup: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },
}

impl ChangelogError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingFile(path) => format!("{} not found", path.display()),
            Self::Io(e) => format!("File operation failed: {e}"),
            Self::DiffUnavailable(reason) => format!("Could not compute changed files: {reason}"),
            Self::NoUnreleasedSection => {
                "No '## [Unreleased]' section found in changelog".to_string()
            }
            Self::InvalidCategory(token) => format!(
                "Invalid category '{token}'. Valid options: {}",
                Category::valid_options()
            ),
            Self::EmptyMessage => "Changelog entry message cannot be empty".to_string(),
            Self::MultiLineMessage => {
                "Changelog entry message must fit on a single line".to_string()
            }
            Self::FormatInvalid(problems) => {
                format!("Changelog format is invalid: {}", problems.join("; "))
            }
            Self::WriteFailed { path, source, .. } => {
                format!("Failed to write {}: {source}", path.display())
            }
        }
    }

    /// Remediation suggestion shown next to the error, when one applies
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::MissingFile(_) => {
                Some("Create one with `chlog init` or restore it from version control".to_string())
            }
            Self::NoUnreleasedSection | Self::FormatInvalid(_) => Some(
                "Add a '## [Unreleased]' heading near the top of the changelog, see https://keepachangelog.com"
                    .to_string(),
            ),
            Self::InvalidCategory(_) => Some(format!(
                "Pass one of: {}",
                Category::valid_options().to_lowercase()
            )),
            Self::EmptyMessage => {
                Some("Describe the change, e.g. `chlog add -c fixed -m \"Fix login redirect\"`".to_string())
            }
            Self::MultiLineMessage => {
                Some("Each entry is one bullet line; add several entries instead".to_string())
            }
            Self::WriteFailed {
                backup: Some(backup),
                ..
            } => Some(format!(
                "The previous content is kept in {}",
                backup.display()
            )),
            Self::Io(_) | Self::DiffUnavailable(_) | Self::WriteFailed { .. } => None,
        }
    }
}
