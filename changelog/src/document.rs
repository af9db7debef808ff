use crate::error::ChangelogError;
use crate::format::{FormatProblem, FormatReport, FormatWarning};
use crate::position::{
    find_category_position, find_next_section_position, find_unreleased_position,
    skip_blank_lines,
};
use crate::types::{Category, Result};
use crate::utils::{category_heading_name, is_unreleased_heading, item_text, UNRELEASED_HEADING};
use crate::writer::atomic_write;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// A changelog held as its raw lines.
///
/// The line sequence is authoritative: edits are insertions into it and
/// rendering joins it back together, so every line an edit does not touch is
/// reproduced byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogDocument {
    lines: Vec<String>,
    trailing_newline: bool,
    crlf: bool,
}

impl ChangelogDocument {
    /// Reads a changelog from disk
    ///
    /// # Errors
    /// Returns `MissingFile` if the file does not exist, `Io` for other read failures
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ChangelogError::MissingFile(path.to_path_buf()),
            _ => ChangelogError::Io(e),
        })?;

        let document = Self::parse(&content);
        debug!(
            path = %path.display(),
            lines = document.lines.len(),
            "loaded changelog"
        );
        Ok(document)
    }

    #[must_use]
    pub fn parse(content: &str) -> Self {
        if content.is_empty() {
            return Self {
                lines: Vec::new(),
                trailing_newline: false,
                crlf: false,
            };
        }

        let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
        let trailing_newline = content.ends_with('\n');
        if trailing_newline {
            lines.pop();
        }
        let crlf = lines.first().is_some_and(|line| line.ends_with('\r'));

        Self {
            lines,
            trailing_newline,
            crlf,
        }
    }

    /// A fresh changelog with an empty Unreleased section
    #[must_use]
    pub fn template(reference_url: &str) -> Self {
        let content = format!(
            "# Changelog\n\n\
             All notable changes to this project will be documented in this file.\n\n\
             The format is based on [Keep a Changelog]({reference_url}).\n\n\
             {UNRELEASED_HEADING}\n"
        );
        Self::parse(&content)
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut content = self.lines.join("\n");
        if self.trailing_newline {
            content.push('\n');
        }
        content
    }

    /// Writes the rendered document over `path` atomically
    ///
    /// # Errors
    /// Returns `WriteFailed` if the new content could not be committed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        atomic_write(path.as_ref(), &self.render())
    }

    #[must_use]
    pub fn find_unreleased_line(&self) -> Option<usize> {
        find_unreleased_position(&self.lines)
    }

    /// Line of the `### <category>` heading inside the Unreleased section
    #[must_use]
    pub fn find_category_section(&self, category: Category) -> Option<usize> {
        let unreleased = self.find_unreleased_line()?;
        find_category_position(&self.lines, unreleased, category)
    }

    /// Heading line of every category present in the Unreleased section
    #[must_use]
    pub fn category_sections(&self) -> BTreeMap<Category, usize> {
        Category::ALL
            .into_iter()
            .filter_map(|category| {
                self.find_category_section(category)
                    .map(|idx| (category, idx))
            })
            .collect()
    }

    /// Inserts `- <message>` as the first entry under `category` in the
    /// Unreleased section, creating the category right below the Unreleased
    /// heading when it does not exist yet.
    ///
    /// Returns the index of the inserted entry line.
    ///
    /// # Errors
    /// Returns `EmptyMessage` or `MultiLineMessage` for a message that is not
    /// a single non-blank line, and `NoUnreleasedSection` when the document
    /// has no Unreleased heading. The document is left
    /// unchanged on error.
    pub fn insert_entry(&mut self, category: Category, message: &str) -> Result<usize> {
        let message = validate_message(message)?;

        let unreleased = self
            .find_unreleased_line()
            .ok_or(ChangelogError::NoUnreleasedSection)?;
        let entry = format!("- {message}");

        let entry_idx = match find_category_position(&self.lines, unreleased, category) {
            Some(heading_idx) => {
                let idx = skip_blank_lines(&self.lines, heading_idx + 1);
                self.insert_lines(idx, [entry]);
                debug!(%category, line = idx + 1, "added entry to existing category");
                idx
            }
            None => {
                let block = [
                    String::new(),
                    category.heading(),
                    String::new(),
                    entry,
                    String::new(),
                ];
                self.insert_lines(unreleased + 1, block);
                debug!(%category, line = unreleased + 2, "created category section");
                unreleased + 4
            }
        };

        Ok(entry_idx)
    }

    fn insert_lines<const N: usize>(&mut self, idx: usize, lines: [String; N]) {
        let crlf = self.crlf;
        let lines = lines.into_iter().map(|mut line| {
            if crlf {
                line.push('\r');
            }
            line
        });
        self.lines.splice(idx..idx, lines);
    }

    /// Checks the structure the changelog tooling depends on
    #[must_use]
    pub fn validate_format(&self, reference_url: &str) -> FormatReport {
        let mut report = FormatReport::default();

        let unreleased_lines: Vec<usize> = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| is_unreleased_heading(line))
            .map(|(idx, _)| idx)
            .collect();

        match unreleased_lines.as_slice() {
            [] => report.problems.push(FormatProblem::MissingUnreleased),
            [first, rest @ ..] => {
                if !rest.is_empty() {
                    report.warnings.push(FormatWarning::DuplicateUnreleased {
                        lines: unreleased_lines.iter().map(|idx| idx + 1).collect(),
                    });
                }
                self.collect_unknown_categories(*first, &mut report);
            }
        }

        if !self.lines.iter().any(|line| line.contains(reference_url)) {
            report.warnings.push(FormatWarning::MissingReference {
                url: reference_url.to_string(),
            });
        }

        report
    }

    fn collect_unknown_categories(&self, unreleased: usize, report: &mut FormatReport) {
        let end = find_next_section_position(&self.lines, unreleased);
        for (idx, line) in self.lines.iter().enumerate().take(end).skip(unreleased + 1) {
            if let Some(name) = category_heading_name(line) {
                if Category::from_heading_name(name).is_none() {
                    report.warnings.push(FormatWarning::UnknownCategory {
                        name: name.to_string(),
                        line: idx + 1,
                    });
                }
            }
        }
    }

    /// Entries of the Unreleased section, grouped by category in document order
    #[must_use]
    pub fn unreleased_entries(&self) -> Vec<(Category, Vec<String>)> {
        let Some(unreleased) = self.find_unreleased_line() else {
            return Vec::new();
        };
        let end = find_next_section_position(&self.lines, unreleased);

        let mut groups: Vec<(Category, Vec<String>)> = Vec::new();
        let mut current: Option<Category> = None;

        for line in &self.lines[unreleased + 1..end] {
            if let Some(name) = category_heading_name(line) {
                current = Category::from_heading_name(name);
                if let Some(category) = current {
                    if !groups.iter().any(|(c, _)| *c == category) {
                        groups.push((category, Vec::new()));
                    }
                }
            } else if let (Some(category), Some(text)) = (current, item_text(line)) {
                if let Some((_, items)) = groups.iter_mut().find(|(c, _)| *c == category) {
                    items.push(text.to_string());
                }
            }
        }

        groups
    }
}

/// Trims an entry message and checks it fits on one bullet line
///
/// # Errors
/// Returns `EmptyMessage` for a blank message and `MultiLineMessage` when a
/// line break remains after trimming
pub fn validate_message(message: &str) -> Result<&str> {
    let message = message.trim();
    if message.is_empty() {
        Err(ChangelogError::EmptyMessage)
    } else if message.contains(['\n', '\r']) {
        Err(ChangelogError::MultiLineMessage)
    } else {
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const URL: &str = "https://keepachangelog.com";

    fn insert(content: &str, category: Category, message: &str) -> String {
        let mut document = ChangelogDocument::parse(content);
        document.insert_entry(category, message).unwrap();
        document.render()
    }

    #[test]
    fn test_insert_into_existing_category_goes_first() {
        let result = insert(
            "## [Unreleased]\n\n### Added\n\n- existing\n",
            Category::Added,
            "new item",
        );
        assert_eq!(
            result,
            "## [Unreleased]\n\n### Added\n\n- new item\n- existing\n"
        );
    }

    #[test]
    fn test_insert_creates_missing_category_below_heading() {
        let result = insert("## [Unreleased]\n", Category::Fixed, "bugfix");
        assert_eq!(result, "## [Unreleased]\n\n### Fixed\n\n- bugfix\n\n");
    }

    #[test]
    fn test_new_category_goes_before_existing_ones() {
        let result = insert(
            "## [Unreleased]\n\n### Added\n\n- feature\n",
            Category::Security,
            "patch CVE",
        );
        assert_eq!(
            result,
            "## [Unreleased]\n\n### Security\n\n- patch CVE\n\n\n### Added\n\n- feature\n"
        );
    }

    #[test]
    fn test_newest_entry_first() {
        let mut document = ChangelogDocument::parse("## [Unreleased]\n\n### Fixed\n\n- old\n");
        document.insert_entry(Category::Fixed, "m1").unwrap();
        document.insert_entry(Category::Fixed, "m2").unwrap();
        assert_eq!(
            document.render(),
            "## [Unreleased]\n\n### Fixed\n\n- m2\n- m1\n- old\n"
        );
    }

    #[test]
    fn test_released_category_is_not_reused() {
        let content = "## [Unreleased]\n\n## [1.0.0] - 2024-01-01\n\n### Added\n\n- shipped\n";
        let mut document = ChangelogDocument::parse(content);
        assert_eq!(document.find_category_section(Category::Added), None);

        document.insert_entry(Category::Added, "next").unwrap();
        assert_eq!(
            document.render(),
            "## [Unreleased]\n\n### Added\n\n- next\n\n\n## [1.0.0] - 2024-01-01\n\n### Added\n\n- shipped\n"
        );
    }

    #[test]
    fn test_insert_preserves_unrelated_lines() {
        let content = "# Changelog  \n\n## [Unreleased]\n### Changed\n-   odd   spacing\n\n## [0.1.0]\n\t- tabbed\n";
        let result = insert(content, Category::Changed, "tidy");
        assert_eq!(
            result,
            "# Changelog  \n\n## [Unreleased]\n### Changed\n- tidy\n-   odd   spacing\n\n## [0.1.0]\n\t- tabbed\n"
        );
    }

    #[test]
    fn test_insert_keeps_crlf_and_missing_trailing_newline() {
        let result = insert(
            "## [Unreleased]\r\n\r\n### Added\r\n\r\n- existing",
            Category::Added,
            "new",
        );
        assert_eq!(
            result,
            "## [Unreleased]\r\n\r\n### Added\r\n\r\n- new\r\n- existing"
        );
    }

    #[test]
    fn test_insert_into_empty_category_at_end_of_file() {
        let result = insert("## [Unreleased]\n\n### Removed\n", Category::Removed, "old api");
        assert_eq!(result, "## [Unreleased]\n\n### Removed\n- old api\n");
    }

    #[test]
    fn test_insert_trims_message() {
        let result = insert("## [Unreleased]\n### Added\n", Category::Added, "  spaced  ");
        assert_eq!(result, "## [Unreleased]\n### Added\n- spaced\n");
    }

    #[test]
    fn test_insert_rejects_empty_message() {
        let mut document = ChangelogDocument::parse("## [Unreleased]\n");
        let err = document.insert_entry(Category::Added, "   ").unwrap_err();
        assert!(matches!(err, ChangelogError::EmptyMessage));
        assert_eq!(document.render(), "## [Unreleased]\n");
    }

    #[test]
    fn test_insert_rejects_multi_line_message() {
        for content in ["## [Unreleased]\n### Added\n", "## [Unreleased]\r\n### Added\r\n"] {
            let mut document = ChangelogDocument::parse(content);
            for message in ["first\nsecond", "first\r\nsecond", "first\rsecond"] {
                let err = document.insert_entry(Category::Added, message).unwrap_err();
                assert!(matches!(err, ChangelogError::MultiLineMessage));
            }
            assert_eq!(document.render(), content);
        }
    }

    #[test]
    fn test_validate_message_trims_surrounding_newlines() {
        assert_eq!(validate_message("  fix crash\n").unwrap(), "fix crash");
        assert!(matches!(
            validate_message("\n \r\n"),
            Err(ChangelogError::EmptyMessage)
        ));
    }

    #[test]
    fn test_insert_without_unreleased_fails_untouched() {
        let content = "# Changelog\n\n## [1.0.0]\n";
        let mut document = ChangelogDocument::parse(content);
        let err = document.insert_entry(Category::Added, "x").unwrap_err();
        assert!(matches!(err, ChangelogError::NoUnreleasedSection));
        assert_eq!(document.render(), content);
    }

    #[test]
    fn test_loose_release_boundary() {
        let content = "## [Unreleased]\n\n## [Notes]\n\n### Fixed\n\n- not unreleased\n";
        let document = ChangelogDocument::parse(content);
        assert_eq!(document.find_category_section(Category::Fixed), None);
    }

    #[test]
    fn test_category_sections_map() {
        let document = ChangelogDocument::parse(
            "## [Unreleased]\n### Fixed\n- a\n### Added\n- b\n## [1.0.0]\n### Removed\n",
        );
        let sections = document.category_sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[&Category::Fixed], 1);
        assert_eq!(sections[&Category::Added], 3);
    }

    #[test]
    fn test_validate_format_requires_unreleased_only() {
        let with_url = ChangelogDocument::parse(&format!("# Changelog\n{URL}\n## [Unreleased]\n"));
        let report = with_url.validate_format(URL);
        assert!(report.is_ok());
        assert!(report.warnings.is_empty());

        let without_url = ChangelogDocument::parse("## [Unreleased]\n");
        let report = without_url.validate_format(URL);
        assert!(report.is_ok());
        assert_eq!(
            report.warnings,
            vec![FormatWarning::MissingReference {
                url: URL.to_string()
            }]
        );

        let missing = ChangelogDocument::parse("# Changelog\n## [unreleased]\n");
        let report = missing.validate_format(URL);
        assert!(!report.is_ok());
        assert_eq!(report.problems, vec![FormatProblem::MissingUnreleased]);
    }

    #[test]
    fn test_validate_format_advisories() {
        let document = ChangelogDocument::parse(&format!(
            "{URL}\n## [Unreleased]\n### Misc\n- x\n## [Unreleased]\n"
        ));
        let report = document.validate_format(URL);
        assert!(report.is_ok());
        assert!(report
            .warnings
            .contains(&FormatWarning::DuplicateUnreleased { lines: vec![2, 5] }));
        assert!(report.warnings.contains(&FormatWarning::UnknownCategory {
            name: "Misc".to_string(),
            line: 3
        }));
    }

    #[test]
    fn test_unreleased_entries_grouped() {
        let document = ChangelogDocument::parse(
            "## [Unreleased]\n\n### Fixed\n\n- one\n- two\n\n### Notes\n- ignored\n### Added\n- three\n\n## [1.0.0]\n### Added\n- old\n",
        );
        assert_eq!(
            document.unreleased_entries(),
            vec![
                (Category::Fixed, vec!["one".to_string(), "two".to_string()]),
                (Category::Added, vec!["three".to_string()]),
            ]
        );
    }

    #[test]
    fn test_template_is_valid() {
        let document = ChangelogDocument::template(URL);
        let report = document.validate_format(URL);
        assert!(report.is_ok());
        assert!(report.warnings.is_empty());
        assert!(document.render().ends_with("## [Unreleased]\n"));
    }

    #[test]
    fn test_load_save_roundtrip_is_identical() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        let content = "# Changelog\r\n\r\n## [Unreleased]\r\n";
        fs::write(&path, content).unwrap();

        let document = ChangelogDocument::load(&path).unwrap();
        let _ = document.validate_format(URL);
        let reloaded = ChangelogDocument::load(&path).unwrap();
        assert_eq!(document, reloaded);

        document.save(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        let err = ChangelogDocument::load(&path).unwrap_err();
        assert!(matches!(err, ChangelogError::MissingFile(p) if p == path));
    }
}
