use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use git::{History, Tag};

use crate::error::{ChangelogError, Result};
use crate::patterns::{RELEASE_HEADING_PATTERN, UNRELEASED_HEADING_PATTERN};
use crate::release::{Release, UNRELEASED};
use crate::remote::Classifier;

/// Fixed first lines of every generated changelog.
const PREAMBLE: &str = "# Changelog\n\nBased on KeepAChangelog.\nGenerated by **Documatic.**\n\n";

/// Window start used when no earlier tag exists. Anything before it is
/// unreachable; the specific date carries no meaning.
const EARLY_DATE: &str = "1999-01-01";

/// The changelog: one release per tag plus the unreleased working state,
/// merged with whatever was previously written to the file.
pub struct ChangelogDoc<'a> {
    path: PathBuf,
    releases: HashMap<String, Release>,
    tags: Vec<Tag>,
    history: &'a dyn History,
    classifier: &'a dyn Classifier,
    available: bool,
}

impl<'a> ChangelogDoc<'a> {
    pub fn new(
        path: impl Into<PathBuf>,
        history: &'a dyn History,
        classifier: &'a dyn Classifier,
    ) -> Self {
        let tags = history.tags();
        let available = history.is_available();

        Self {
            path: path.into(),
            releases: HashMap::new(),
            tags,
            history,
            classifier,
            available,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn release(&self, version: &str) -> Option<&Release> {
        self.releases.get(version)
    }

    /// Recover releases from an existing changelog file, if any.
    ///
    /// A single forward scan: each release heading closes out the previous
    /// accumulator; all other lines buffer into the current release.
    pub fn read(&mut self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let content = fs::read_to_string(&self.path).map_err(ChangelogError::ReadError)?;

        let mut current: Option<(String, Option<String>)> = None;
        let mut buffer: Vec<String> = Vec::new();

        for line in content.lines() {
            if let Some(heading) = parse_release_heading(line, &self.tags) {
                self.close_release(current.take(), &buffer);
                buffer.clear();
                current = Some(heading);
            } else {
                buffer.push(line.to_string());
            }
        }

        self.close_release(current.take(), &buffer);

        Ok(())
    }

    fn close_release(&mut self, heading: Option<(String, Option<String>)>, lines: &[String]) {
        let Some((version, date)) = heading else {
            return;
        };

        let mut release = if version.eq_ignore_ascii_case(UNRELEASED) {
            Release::unreleased()
        } else {
            Release::new(version, date)
        };

        release.read(lines);
        self.releases.insert(release.version().to_string(), release);
    }

    /// Merge existing content with newly generated releases.
    ///
    /// Only the unreleased bucket and tags absent from the existing document
    /// are generated; populated releases are never re-fetched.
    pub fn generate(&mut self) -> Result<()> {
        if !self.available {
            return Ok(());
        }

        self.read()?;

        // A fresh unreleased bucket is needed on first run, and again when
        // the newest tag is missing from the document: a release was cut
        // since the last generation, absorbing the old unreleased content.
        let newest_tag_missing = self
            .tags
            .first()
            .is_some_and(|tag| !self.releases.contains_key(deprefix(&tag.name)));

        if !self.releases.contains_key(UNRELEASED) || newest_tag_missing {
            self.releases
                .insert(UNRELEASED.to_string(), Release::unreleased());
        }

        let unreleased_start = self
            .tags
            .first()
            .map_or(EARLY_DATE, |tag| tag.date.as_str())
            .to_string();

        if let Some(unreleased) = self.releases.get_mut(UNRELEASED) {
            unreleased.generate(self.history, self.classifier, &unreleased_start);
        }

        for (i, tag) in self.tags.iter().enumerate() {
            let version = deprefix(&tag.name).to_string();

            if self.releases.contains_key(&version) {
                continue;
            }

            let window_start = self
                .tags
                .get(i + 1)
                .map_or(EARLY_DATE, |older| older.date.as_str());

            let mut release = Release::new(version.clone(), Some(tag.date.clone()));
            release.generate(self.history, self.classifier, window_start);
            self.releases.insert(version, release);
        }

        Ok(())
    }

    /// The full markdown document: preamble, unreleased, then tagged
    /// releases newest-first, with one trailing newline.
    #[must_use]
    pub fn render(&self) -> String {
        let mut content = PREAMBLE.to_string();

        if let Some(unreleased) = self.releases.get(UNRELEASED) {
            content.push_str(unreleased.render().trim());
        }

        for tag in &self.tags {
            if let Some(release) = self.releases.get(deprefix(&tag.name)) {
                content.push_str("\n\n");
                content.push_str(release.render().trim());
            }
        }

        content.push('\n');
        content
    }

    /// Overwrite the changelog file in full. Merging with existing content
    /// already happened via `read` and `generate`.
    pub fn save(&self) -> Result<()> {
        if !self.available {
            return Ok(());
        }

        fs::write(&self.path, self.render())
            .map_err(|e| ChangelogError::ReadError(e).with_context("Failed to save changelog"))
    }
}

fn deprefix(tag_name: &str) -> &str {
    tag_name.trim_start_matches('v').trim()
}

/// Match a release heading, returning the de-prefixed version and the date:
/// the explicit `- YYYY-MM-DD` suffix when present, otherwise the matching
/// tag's recorded date.
fn parse_release_heading(line: &str, tags: &[Tag]) -> Option<(String, Option<String>)> {
    if UNRELEASED_HEADING_PATTERN.is_match(line) {
        return Some((UNRELEASED.to_string(), None));
    }

    let captures = RELEASE_HEADING_PATTERN.captures(line)?;
    let version = captures.get(1)?.as_str().to_string();

    let explicit_date = captures
        .get(2)
        .map(|m| m.as_str())
        .filter(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok())
        .map(ToString::to_string);

    let date = explicit_date.or_else(|| {
        tags.iter()
            .find(|tag| deprefix(&tag.name) == version)
            .map(|tag| tag.date.clone())
    });

    Some((version, date))
}
