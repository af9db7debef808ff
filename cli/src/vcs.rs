use crate::progress::Spinner;
use changelog::{ChangelogError, DiffProvider};
use git::{RealGitRepository, Repository};
use std::path::Path;
use tracing::debug;

/// Diff provider backed by the git repository around the working directory
pub struct GitDiffProvider {
    fetch: bool,
}

impl GitDiffProvider {
    pub fn new() -> Self {
        Self { fetch: true }
    }

    #[cfg(test)]
    fn offline() -> Self {
        Self { fetch: false }
    }

    /// `path` in the form diff paths take, when it lies inside the repository
    pub fn repo_relative(&self, path: &Path) -> Option<String> {
        match RealGitRepository::open().and_then(|repo| repo.repo_relative_path(path)) {
            Ok(key) => {
                debug!(path = %path.display(), key = %key, "resolved changelog inside repository");
                Some(key)
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e.user_message(), "changelog not resolved in repository");
                None
            }
        }
    }
}

impl DiffProvider for GitDiffProvider {
    fn changed_paths(&self, target_branch: &str) -> changelog::Result<Vec<String>> {
        let repo = RealGitRepository::open()
            .map_err(|e| ChangelogError::DiffUnavailable(e.user_message()))?;

        if self.fetch {
            let spinner = Spinner::start(format!("Fetching origin/{target_branch}"));
            match repo.fetch_branch(target_branch) {
                Ok(()) => spinner.succeed(&format!("Fetched origin/{target_branch}")),
                // A stale or local ref can still give a usable diff
                Err(e) => {
                    spinner.warn(&format!("Could not fetch origin/{target_branch}"));
                    debug!(error = %e.user_message(), "fetch failed, using local refs");
                }
            }
        }

        let paths = repo
            .changed_paths_since(target_branch)
            .map_err(|e| ChangelogError::DiffUnavailable(e.user_message()))?;
        debug!(?paths, "changed paths");
        Ok(paths)
    }
}
