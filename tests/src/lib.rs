//! Fixtures shared by the integration tests.

use git2::{Commit, Repository, Signature, Time};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const KEEP_A_CHANGELOG: &str = r"# Changelog

All notable changes to this project will be documented in this file.

The format is based on [Keep a Changelog](https://keepachangelog.com/en/1.0.0/).

## [Unreleased]

### Added

- Health endpoint

## [0.1.0] - 2024-01-01

### Fixed

- Initial release
";

/// Writes `content` as `CHANGELOG.md` in a fresh temporary directory
pub fn changelog_dir(content: &str) -> std::io::Result<TempDir> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("CHANGELOG.md"), content)?;
    Ok(dir)
}

/// A scratch repository with one commit on `main` and `feature` checked out
pub struct ScratchRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl ScratchRepo {
    pub fn new() -> Result<Self, git2::Error> {
        let dir = TempDir::new().map_err(|e| git2::Error::from_str(&e.to_string()))?;
        let repo = Repository::init(dir.path())?;
        let scratch = Self { dir, repo };
        scratch.commit("CHANGELOG.md", KEEP_A_CHANGELOG, "initial")?;

        {
            let head = scratch.repo.head()?.peel_to_commit()?;
            scratch.repo.branch("feature", &head, false)?;
            scratch.repo.set_head("refs/heads/feature")?;
            scratch.repo.branch("main", &head, true)?;
        }
        Ok(scratch)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `name` and commits it on the current branch
    pub fn commit(&self, name: &str, content: &str, message: &str) -> Result<(), git2::Error> {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| git2::Error::from_str(&e.to_string()))?;
        }
        fs::write(&path, content).map_err(|e| git2::Error::from_str(&e.to_string()))?;

        let mut index = self.repo.index()?;
        index.add_path(Path::new(name))?;
        index.write()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = Signature::new("Test User", "test@example.com", &Time::new(0, 0))?;
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&Commit> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
        Ok(())
    }
}
