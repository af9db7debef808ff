pub mod error;
pub mod repository;

pub use error::{GitError, Result};
pub use repository::{RealGitRepository, Repository};
