/// Configuration options for changelog validation and change detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogConfig {
    /// Changelog path, relative to the repository root
    pub changelog_file: String,
    /// Path prefixes (directories or single files) whose changes need an entry
    pub source_prefixes: Vec<String>,
    /// Format reference every changelog is expected to link to
    pub reference_url: String,
    /// Branch to diff against when the pipeline does not name one
    pub default_target_branch: String,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            changelog_file: "CHANGELOG.md".to_string(),
            source_prefixes: vec![
                "src/".to_string(),
                "tests/".to_string(),
                "pyproject.toml".to_string(),
                "poetry.lock".to_string(),
            ],
            reference_url: "https://keepachangelog.com".to_string(),
            default_target_branch: "main".to_string(),
        }
    }
}
