use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;

use crate::error::{GitError, Result, ResultExt};
use git2::{Commit, Repository as GitRepository};
use tracing::debug;

pub trait Repository {
    fn open() -> Result<Self>
    where
        Self: Sized;
    fn fetch_branch(&self, branch: &str) -> Result<()>;
    fn changed_paths_since(&self, branch: &str) -> Result<Vec<String>>;
    fn repo_relative_path(&self, path: &Path) -> Result<String>;
}

pub struct RealGitRepository {
    repo: GitRepository,
}

impl RealGitRepository {
    /// Opens the repository containing `path`
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let repo = GitRepository::discover(path.as_ref()).map_err(|e| {
            GitError::RepositoryError(format!("Failed to discover git repository: {e}"))
        })?;
        Ok(Self { repo })
    }

    // The remote-tracking ref is preferred, CI checkouts rarely have local branches
    fn resolve_branch_commit(&self, branch: &str) -> Result<Commit<'_>> {
        let candidates = [
            format!("refs/remotes/origin/{branch}"),
            format!("refs/heads/{branch}"),
        ];

        for name in &candidates {
            if let Ok(reference) = self.repo.find_reference(name) {
                debug!(reference = %name, "resolved target branch");
                return reference.peel_to_commit().context(format!(
                    "Failed to resolve '{name}' to a commit"
                ));
            }
        }

        Err(GitError::BranchNotFound(branch.to_string()))
    }
}

impl Repository for RealGitRepository {
    fn open() -> Result<Self> {
        Self::discover(".")
    }

    fn fetch_branch(&self, branch: &str) -> Result<()> {
        let workdir = self
            .repo
            .workdir()
            .unwrap_or_else(|| self.repo.path());

        let output = Command::new("git")
            .args(["fetch", "--quiet", "origin", branch])
            .current_dir(workdir)
            .output()
            .map_err(|e| {
                GitError::IoError(e).with_context(format!("Failed to fetch origin/{branch}"))
            })?;

        if !output.status.success() {
            return Err(GitError::CommandError(format!(
                "Failed to fetch origin/{branch}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }

    /// Paths touched between the merge base of `branch` and `HEAD`
    fn changed_paths_since(&self, branch: &str) -> Result<Vec<String>> {
        let head = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .context("Failed to resolve HEAD")?;
        let target = self.resolve_branch_commit(branch)?;

        let base = self
            .repo
            .merge_base(head.id(), target.id())
            .context(format!("No common ancestor between HEAD and '{branch}'"))?;
        let base_tree = self.repo.find_commit(base)?.tree()?;
        let head_tree = head.tree()?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&base_tree), Some(&head_tree), None)?;

        let mut paths = BTreeSet::new();
        for delta in diff.deltas() {
            for file in [delta.old_file(), delta.new_file()] {
                if let Some(path) = file.path() {
                    paths.insert(path.to_string_lossy().replace('\\', "/"));
                }
            }
        }

        debug!(base = %base, changed = paths.len(), "diffed against merge base");
        Ok(paths.into_iter().collect())
    }

    /// `path` as git reports it in diffs: relative to the workdir, `/`-separated
    fn repo_relative_path(&self, path: &Path) -> Result<String> {
        let workdir = self
            .repo
            .workdir()
            .ok_or_else(|| GitError::RepositoryError("Repository has no working directory".to_string()))?
            .canonicalize()?;
        let absolute = path
            .canonicalize()
            .map_err(|e| GitError::IoError(e).with_context(format!("Failed to resolve {}", path.display())))?;

        let relative = absolute.strip_prefix(&workdir).map_err(|_| {
            GitError::RepositoryError(format!("{} is outside the repository", path.display()))
        })?;

        Ok(relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"))
    }
}
