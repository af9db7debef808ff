use crate::config::ChangelogConfig;
use crate::types::Result;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// What the calling pipeline tells us about itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineContext {
    /// The pipeline runs for a merge/pull request
    pub merge_event: bool,
    /// Branch the request targets, if the pipeline names one
    pub target_branch: Option<String>,
}

/// Source of the paths changed between a target branch and the current revision
pub trait DiffProvider {
    /// Paths changed between the merge base with `target_branch` and `HEAD`
    ///
    /// # Errors
    /// Returns an error when the diff cannot be computed (missing branch,
    /// failed fetch, not a repository...)
    fn changed_paths(&self, target_branch: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    Changed(BTreeSet<String>),
    /// The diff could not be computed; the update check must be skipped
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct ChangeDetector {
    changelog_file: String,
    source_prefixes: Vec<String>,
    default_target_branch: String,
    context: PipelineContext,
}

impl ChangeDetector {
    #[must_use]
    pub fn new(config: &ChangelogConfig, context: PipelineContext) -> Self {
        Self {
            changelog_file: normalize(&config.changelog_file).to_string(),
            source_prefixes: config
                .source_prefixes
                .iter()
                .map(|prefix| normalize(prefix).to_string())
                .filter(|prefix| !prefix.is_empty())
                .collect(),
            default_target_branch: config.default_target_branch.clone(),
            context,
        }
    }

    /// Compares diffs against `changelog_file` instead of the configured path.
    ///
    /// Diff paths are relative to the repository root, while the configured
    /// path is relative to the working directory (or absolute).
    #[must_use]
    pub fn with_changelog_file(mut self, changelog_file: &str) -> Self {
        self.changelog_file = normalize(changelog_file).to_string();
        self
    }

    #[must_use]
    pub const fn is_merge_context(&self) -> bool {
        self.context.merge_event
    }

    #[must_use]
    pub fn resolve_target_branch(&self) -> String {
        self.context
            .target_branch
            .as_deref()
            .map(str::trim)
            .filter(|branch| !branch.is_empty())
            .unwrap_or(self.default_target_branch.as_str())
            .to_string()
    }

    /// Asks `provider` for the changed paths, degrading failures to `Unavailable`
    pub fn diff(&self, provider: &dyn DiffProvider) -> DiffOutcome {
        let target = self.resolve_target_branch();
        match provider.changed_paths(&target) {
            Ok(paths) => {
                let paths: BTreeSet<String> =
                    paths.iter().map(|p| normalize(p).to_string()).collect();
                debug!(target = %target, changed = paths.len(), "computed changed paths");
                DiffOutcome::Changed(paths)
            }
            Err(e) => {
                warn!(target = %target, error = %e, "diff unavailable, skipping update check");
                DiffOutcome::Unavailable(e.user_message())
            }
        }
    }

    #[must_use]
    pub fn is_changelog(&self, path: &str) -> bool {
        normalize(path) == self.changelog_file
    }

    #[must_use]
    pub fn is_source_change(&self, path: &str) -> bool {
        let path = normalize(path);
        path != self.changelog_file
            && self
                .source_prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
    }

    #[must_use]
    pub fn requires_changelog_update(&self, changed_paths: &BTreeSet<String>) -> bool {
        changed_paths.iter().any(|path| self.is_source_change(path))
    }

    #[must_use]
    pub fn is_satisfied(&self, changed_paths: &BTreeSet<String>) -> bool {
        changed_paths.iter().any(|path| self.is_changelog(path))
    }

    #[must_use]
    pub fn changelog_file(&self) -> &str {
        &self.changelog_file
    }
}

fn normalize(path: &str) -> &str {
    path.trim().trim_start_matches("./")
}
