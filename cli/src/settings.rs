use crate::error::{CliError, Result, ResultExt};
use changelog::{ChangelogConfig, PipelineContext};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_SETTINGS_FILE: &str = ".chlog.toml";

/// GitLab reports merge request pipelines with this source
const GITLAB_MERGE_REQUEST_SOURCE: &str = "merge_request_event";
const GITHUB_PULL_REQUEST_EVENTS: [&str; 2] = ["pull_request", "pull_request_target"];

/// Optional overrides read from the settings file
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub changelog_file: Option<String>,
    pub source_prefixes: Option<Vec<String>>,
    pub reference_url: Option<String>,
    pub default_target_branch: Option<String>,
}

impl Settings {
    /// Loads `path`, or the default settings file when it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings = Self::parse(&content)
            .map_err(|e| e.with_context(format!("Failed to load {}", path.display())))?;
        debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(CliError::Settings)
    }

    pub fn apply(self, mut config: ChangelogConfig) -> ChangelogConfig {
        if let Some(file) = self.changelog_file {
            config.changelog_file = file;
        }
        if let Some(prefixes) = self.source_prefixes {
            config.source_prefixes = prefixes;
        }
        if let Some(url) = self.reference_url {
            config.reference_url = url;
        }
        if let Some(branch) = self.default_target_branch {
            config.default_target_branch = branch;
        }
        config
    }
}

/// Reads the pipeline context through `lookup` (an environment accessor)
pub fn pipeline_context_from<F>(lookup: F) -> PipelineContext
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    let gitlab_merge = non_empty("CI_PIPELINE_SOURCE")
        .is_some_and(|source| source == GITLAB_MERGE_REQUEST_SOURCE);
    let github_pull = non_empty("GITHUB_EVENT_NAME")
        .is_some_and(|event| GITHUB_PULL_REQUEST_EVENTS.contains(&event.as_str()));

    PipelineContext {
        merge_event: gitlab_merge || github_pull,
        target_branch: non_empty("CI_MERGE_REQUEST_TARGET_BRANCH_NAME")
            .or_else(|| non_empty("GITHUB_BASE_REF")),
    }
}

pub fn pipeline_context() -> PipelineContext {
    pipeline_context_from(|key| std::env::var(key).ok())
}
