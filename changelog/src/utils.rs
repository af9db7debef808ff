use once_cell::sync::Lazy;
use regex::Regex;

pub const UNRELEASED_HEADING: &str = "## [Unreleased]";

/// Prefix of any top-level release heading, `## [x.y.z] - date` included
pub const RELEASE_HEADING_PREFIX: &str = "## [";

pub static CHANGELOG_CATEGORY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^###\s+(.+?)\s*$").expect("Failed to compile category regex"));

pub static CHANGELOG_ITEM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-*]\s+(.+?)\s*$").expect("Failed to compile item regex"));

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

pub fn is_unreleased_heading(line: &str) -> bool {
    line.trim() == UNRELEASED_HEADING
}

/// A `## [` heading other than the Unreleased one closes the Unreleased scope
pub fn is_release_boundary(line: &str) -> bool {
    let line = line.trim();
    line.starts_with(RELEASE_HEADING_PREFIX) && line != UNRELEASED_HEADING
}

/// Name of a `### Name` heading, if the line is one
pub fn category_heading_name(line: &str) -> Option<&str> {
    CHANGELOG_CATEGORY_PATTERN
        .captures(line.trim())
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Text of a `- item` bullet, if the line is one
pub fn item_text(line: &str) -> Option<&str> {
    CHANGELOG_ITEM_PATTERN
        .captures(line.trim())
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}
