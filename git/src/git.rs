pub mod error;
pub mod history;

pub use error::{GitError, Result};
pub use history::{CommitRecord, GitHistory, History, Tag};
