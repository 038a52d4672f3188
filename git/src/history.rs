use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{GitError, Result};
use git2::Repository as GitRepository;

/// A single commit parsed from the repository history.
#[derive(Debug, Clone, Default)]
pub struct CommitRecord {
    pub hash: String,
    pub title: String,
    pub message: String,
    pub files: Vec<String>,
    pub date: String,
    pub author: String,
}

/// A tag together with the date (YYYY-MM-DD) of the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub date: String,
}

/// Read access to repository history.
///
/// Query failures are absorbed into empty results so that callers can always
/// produce a best-effort changelog from whatever history is reachable.
pub trait History {
    /// Commits in the `[since, until]` date window, earliest first.
    /// Both bounds omitted retrieves the full history.
    fn commits(&self, since: Option<&str>, until: Option<&str>) -> Vec<CommitRecord>;

    /// Tags of the repository, newest first.
    fn tags(&self) -> Vec<Tag>;

    /// Whether a repository with at least one commit is present.
    fn is_available(&self) -> bool;
}

/// `History` backed by the `git` executable, rooted at a working directory.
pub struct GitHistory {
    workdir: PathBuf,
}

impl GitHistory {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| GitError::IoError(e).with_context("Failed to execute git"))?;

        if !output.status.success() {
            return Err(GitError::CommandError(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }

        Ok(String::from_utf8(output.stdout)?)
    }

    fn tag_date(&self, tag_name: &str) -> Result<String> {
        let stamp = self.run(&["log", "-1", "--format=%ai", tag_name])?;
        Ok(stamp.split_whitespace().next().unwrap_or_default().to_string())
    }
}

impl History for GitHistory {
    fn commits(&self, since: Option<&str>, until: Option<&str>) -> Vec<CommitRecord> {
        let output = match (since, until) {
            (Some(since), Some(until)) => self.run(&[
                "log", "--stat", "--since", since, "--until", until,
            ]),
            _ => self.run(&["log", "--stat"]),
        };

        match output {
            Ok(log) => parse_log(&log),
            Err(_) => Vec::new(),
        }
    }

    fn tags(&self) -> Vec<Tag> {
        let listing = match self.run(&["tag", "-n"]) {
            Ok(listing) => listing,
            Err(_) => return Vec::new(),
        };

        listing
            .lines()
            .rev()
            .filter_map(|line| line.split(' ').next())
            .filter(|name| !name.is_empty())
            .filter_map(|name| {
                self.tag_date(name).ok().map(|date| Tag {
                    name: name.to_string(),
                    date,
                })
            })
            .collect()
    }

    fn is_available(&self) -> bool {
        match GitRepository::discover(&self.workdir) {
            Ok(repo) => repo.head().is_ok(),
            Err(_) => false,
        }
    }
}

/// Parse `git log --stat` output into commit records, earliest first.
fn parse_log(log: &str) -> Vec<CommitRecord> {
    let mut commits = Vec::new();
    let mut current: Option<(CommitRecord, Vec<String>)> = None;

    for line in log.lines() {
        if let Some(body) = line.strip_prefix(' ') {
            if let Some((_, message)) = current.as_mut() {
                // Message and stat lines are indented by 4 spaces.
                message.push(body.strip_prefix("   ").unwrap_or(body).to_string());
            }
        } else if let Some(hash) = line.strip_prefix("commit ") {
            if let Some(commit) = current.take() {
                commits.push(finish_commit(commit));
            }
            current = Some((
                CommitRecord {
                    hash: hash.trim().to_string(),
                    ..CommitRecord::default()
                },
                Vec::new(),
            ));
        } else if let Some((key, value)) = line.split_once(':') {
            if let Some((commit, _)) = current.as_mut() {
                match key.to_lowercase().as_str() {
                    "author" => commit.author = value.trim().to_string(),
                    "date" => commit.date = value.trim().to_string(),
                    _ => {}
                }
            }
        }
    }

    if let Some(commit) = current.take() {
        commits.push(finish_commit(commit));
    }

    commits.reverse();
    commits
}

fn finish_commit((mut commit, message): (CommitRecord, Vec<String>)) -> CommitRecord {
    let mut body: &[String] = &message;

    if let Some((title, rest)) = body.split_first() {
        commit.title = title.clone();
        body = rest;
    }

    if body.first().is_some_and(|line| line.is_empty()) {
        body = &body[1..];
    }

    commit.files = body
        .iter()
        .filter(|line| line.contains('|'))
        .filter_map(|line| line.split('|').next())
        .map(|name| name.trim().to_string())
        .collect();
    commit.message = body.join("\n");

    commit
}
