//! Shared fakes for the integration tests.

use git::{CommitRecord, History, Tag};

/// In-memory `History` with YYYY-MM-DD commit dates, filtered by simple
/// string comparison: a commit belongs to a window when it is strictly
/// after the start and at or before the end.
pub struct FakeHistory {
    pub commits: Vec<CommitRecord>,
    pub tags: Vec<Tag>,
    pub available: bool,
}

impl FakeHistory {
    pub fn empty() -> Self {
        Self {
            commits: Vec::new(),
            tags: Vec::new(),
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::empty()
        }
    }

    pub fn with_commits(commits: Vec<CommitRecord>) -> Self {
        Self {
            commits,
            ..Self::empty()
        }
    }

    pub fn tagged(mut self, name: &str, date: &str) -> Self {
        self.tags.push(Tag {
            name: name.to_string(),
            date: date.to_string(),
        });
        self
    }
}

pub fn commit(title: &str, date: &str) -> CommitRecord {
    CommitRecord {
        title: title.to_string(),
        date: date.to_string(),
        ..CommitRecord::default()
    }
}

impl History for FakeHistory {
    fn commits(&self, since: Option<&str>, until: Option<&str>) -> Vec<CommitRecord> {
        self.commits
            .iter()
            .filter(|c| since.is_none_or(|since| c.date.as_str() > since))
            .filter(|c| until.is_none_or(|until| c.date.as_str() <= until))
            .cloned()
            .collect()
    }

    fn tags(&self) -> Vec<Tag> {
        self.tags.clone()
    }

    fn is_available(&self) -> bool {
        self.available
    }
}
