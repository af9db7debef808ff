use crate::error::ChangelogError;
use crate::types::Result;
use crate::utils::UNRELEASED_HEADING;
use std::fmt::{self, Display, Formatter};

/// Structural defects that make the changelog unusable by the tooling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatProblem {
    MissingUnreleased,
}

impl Display for FormatProblem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingUnreleased => write!(f, "missing '{UNRELEASED_HEADING}' section"),
        }
    }
}

/// Advisory findings; they never fail a validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatWarning {
    MissingReference { url: String },
    UnknownCategory { name: String, line: usize },
    DuplicateUnreleased { lines: Vec<usize> },
}

impl Display for FormatWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingReference { url } => {
                write!(f, "no reference to the changelog format ({url})")
            }
            Self::UnknownCategory { name, line } => {
                write!(f, "line {line}: '### {name}' is not a Keep a Changelog category")
            }
            Self::DuplicateUnreleased { lines } => {
                let lines = lines
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "'{UNRELEASED_HEADING}' appears on lines {lines}; only the first is used"
                )
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatReport {
    pub problems: Vec<FormatProblem>,
    pub warnings: Vec<FormatWarning>,
}

impl FormatReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }

    /// Converts the report into an error when it contains problems
    ///
    /// # Errors
    /// Returns `FormatInvalid` listing every problem found
    pub fn into_result(self) -> Result<Vec<FormatWarning>> {
        if self.is_ok() {
            Ok(self.warnings)
        } else {
            Err(ChangelogError::FormatInvalid(
                self.problems.iter().map(ToString::to_string).collect(),
            ))
        }
    }
}
