use std::collections::HashMap;

use git::History;

use crate::category::{classify, Category};
use crate::patterns::{BULLET_PATTERN, HEADING_PATTERN};
use crate::remote::{ClassifiedCommit, Classifier};
use crate::section::Section;

/// Version string of the synthetic release holding not-yet-tagged commits.
pub const UNRELEASED: &str = "Unreleased";

/// Commits are classified remotely in batches of this size, bounding the
/// request payload while keeping round trips low.
pub const BATCH_SIZE: usize = 25;

/// Window end for the unreleased release. A far-future date; some dates
/// even further out make git return zero commits.
const FAR_FUTURE_DATE: &str = "2099-01-01";

/// The changelog content of one tagged version, or of the unreleased
/// working state. Populated once, via either `read` or `generate`.
pub struct Release {
    version: String,
    date: Option<String>,
    sections: HashMap<Category, Section>,
    pending: Vec<ClassifiedCommit>,
}

impl Release {
    #[must_use]
    pub fn new(version: impl Into<String>, date: Option<String>) -> Self {
        let sections = Category::ALL
            .into_iter()
            .map(|category| (category, Section::new(category)))
            .collect();

        Self {
            version: version.into(),
            date,
            sections,
            pending: Vec::new(),
        }
    }

    /// The always-dateless unreleased bucket.
    #[must_use]
    pub fn unreleased() -> Self {
        Self::new(UNRELEASED, None)
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    #[must_use]
    pub fn section(&self, category: Category) -> &Section {
        &self.sections[&category]
    }

    /// Populate sections from previously-written markdown lines.
    ///
    /// Unknown headings and stray prose are ignored, so a hand-edited
    /// changelog survives a round trip.
    pub fn read(&mut self, lines: &[String]) {
        for (i, line) in lines.iter().enumerate() {
            let title = line.trim_start_matches('#').trim();

            let Some(category) = Category::parse(title) else {
                continue;
            };

            for bullet_line in &lines[i + 1..] {
                if BULLET_PATTERN.is_match(bullet_line) {
                    if let Some(section) = self.sections.get_mut(&category) {
                        section.add_line(bullet_line);
                    }
                } else if HEADING_PATTERN.is_match(bullet_line) {
                    break;
                }
            }
        }
    }

    /// Populate sections from the commits in `[window_start, release date]`,
    /// classifying locally and refining through the classifier in batches.
    pub fn generate(
        &mut self,
        history: &dyn History,
        classifier: &dyn Classifier,
        window_start: &str,
    ) {
        let window_end = self.date.clone().unwrap_or_else(|| FAR_FUTURE_DATE.to_string());

        for commit in history.commits(Some(window_start), Some(window_end.as_str())) {
            if commit.title.is_empty() {
                continue;
            }

            let (category, text) = classify(&commit.title);
            self.pending.push((category, text));

            if self.pending.len() >= BATCH_SIZE {
                self.post_classification(classifier);
            }
        }

        self.post_classification(classifier);

        for section in self.sections.values_mut() {
            section.remove_duplicates();
        }
    }

    /// Flush the pending batch through the classifier and merge the result.
    ///
    /// When the classifier declines, or returns a list whose length does not
    /// match the submitted batch, the local classification stands. Commits
    /// that end up with no category are dropped.
    fn post_classification(&mut self, classifier: &dyn Classifier) {
        if self.pending.is_empty() {
            return;
        }

        let batch = std::mem::take(&mut self.pending);
        let refined = classifier
            .classify_batch(&batch, &self.version)
            .filter(|refined| refined.len() == batch.len());

        for (category, text) in refined.unwrap_or(batch) {
            if let Some(category) = category {
                if let Some(section) = self.sections.get_mut(&category) {
                    section.add_line(&text);
                }
            }
        }
    }

    /// `## <version> - <date>`, or just `## Unreleased` for the synthetic
    /// release. Keyed on the version string, so a historical release
    /// literally named "Unreleased" behaves the same way.
    #[must_use]
    pub fn header(&self) -> String {
        if self.version == UNRELEASED {
            return format!("## {}", self.version);
        }

        match &self.date {
            Some(date) => format!("## {} - {}", self.version, date),
            None => format!("## {}", self.version),
        }
    }

    /// Header plus every non-empty section, trimmed of trailing blank lines.
    #[must_use]
    pub fn render(&self) -> String {
        let mut content = format!("{}\n\n", self.header());

        for category in Category::ALL {
            let section = &self.sections[&category];
            if section.has_content() {
                content.push_str(section.render().trim_end());
                content.push_str("\n\n");
            }
        }

        content.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::LocalClassifier;
    use git::{CommitRecord, Tag};
    use std::cell::RefCell;

    struct FakeHistory {
        commits: Vec<CommitRecord>,
    }

    impl FakeHistory {
        fn with_titles(titles: &[&str]) -> Self {
            let commits = titles
                .iter()
                .map(|title| CommitRecord {
                    title: (*title).to_string(),
                    ..CommitRecord::default()
                })
                .collect();
            Self { commits }
        }
    }

    impl History for FakeHistory {
        fn commits(&self, _since: Option<&str>, _until: Option<&str>) -> Vec<CommitRecord> {
            self.commits.clone()
        }

        fn tags(&self) -> Vec<Tag> {
            Vec::new()
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    /// Records submitted batch sizes and replies with a canned refinement.
    struct StubClassifier {
        reply: Option<Vec<ClassifiedCommit>>,
        batch_sizes: RefCell<Vec<usize>>,
    }

    impl StubClassifier {
        fn declining() -> Self {
            Self {
                reply: None,
                batch_sizes: RefCell::new(Vec::new()),
            }
        }

        fn replying(reply: Vec<ClassifiedCommit>) -> Self {
            Self {
                reply: Some(reply),
                batch_sizes: RefCell::new(Vec::new()),
            }
        }
    }

    impl Classifier for StubClassifier {
        fn classify_batch(
            &self,
            batch: &[ClassifiedCommit],
            _version: &str,
        ) -> Option<Vec<ClassifiedCommit>> {
            self.batch_sizes.borrow_mut().push(batch.len());
            self.reply.clone()
        }
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn read_populates_existing_section() {
        for category in Category::ALL {
            let existing = lines(&[
                &format!("### {category}"),
                "",
                "* an update",
                "  * a sub update",
                "* another update message",
                "- a third update",
                "### Some other section",
                "* this update should not be included",
            ]);

            let mut release = Release::new("test", Some("2021-12-25".to_string()));
            release.read(&existing);

            for other in Category::ALL {
                if other == category {
                    assert_eq!(
                        release.section(other).lines(),
                        [
                            "* an update",
                            "  * a sub update",
                            "* another update message",
                            "- a third update",
                        ]
                    );
                } else {
                    assert!(release.section(other).lines().is_empty());
                }
            }
        }
    }

    #[test]
    fn read_populates_multiple_sections() {
        let existing = lines(&[
            "### Added",
            "",
            "* an update",
            "  * a sub update",
            "### Removed",
            "* something",
        ]);

        let mut release = Release::new("test", Some("2021-12-25".to_string()));
        release.read(&existing);

        assert_eq!(
            release.section(Category::Added).lines(),
            ["* an update", "  * a sub update"]
        );
        assert_eq!(release.section(Category::Removed).lines(), ["* something"]);
    }

    #[test]
    fn read_handles_empty_sections() {
        let existing = lines(&["### Added", "### Removed"]);

        let mut release = Release::new("test", Some("2021-12-25".to_string()));
        release.read(&existing);

        for category in Category::ALL {
            assert!(release.section(category).lines().is_empty());
        }
    }

    #[test]
    fn generate_files_commits_into_sections() {
        let history = FakeHistory::with_titles(&["Fix the login bug", "Add a new widget"]);
        let mut release = Release::unreleased();

        release.generate(&history, &LocalClassifier, "1999-01-01");

        assert_eq!(
            release.section(Category::Fixed).lines(),
            ["* The login bug"]
        );
        assert_eq!(
            release.section(Category::Added).lines(),
            ["* A new widget"]
        );
    }

    #[test]
    fn generate_drops_unclassified_commits() {
        let history = FakeHistory::with_titles(&["Gazumped the release", "Tweet about it"]);
        let mut release = Release::unreleased();

        release.generate(&history, &LocalClassifier, "1999-01-01");

        for category in Category::ALL {
            assert!(release.section(category).lines().is_empty());
        }
    }

    #[test]
    fn generate_deduplicates_sections() {
        let history =
            FakeHistory::with_titles(&["Fix the login bug", "Fix the login bug", "Fix a typo"]);
        let mut release = Release::unreleased();

        release.generate(&history, &LocalClassifier, "1999-01-01");

        assert_eq!(
            release.section(Category::Fixed).lines(),
            ["* The login bug", "* A typo"]
        );
    }

    #[test]
    fn generate_flushes_in_batches_of_25() {
        let titles: Vec<String> = (0..60).map(|i| format!("Fix bug number {i}")).collect();
        let title_refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        let history = FakeHistory::with_titles(&title_refs);
        let classifier = StubClassifier::declining();

        let mut release = Release::unreleased();
        release.generate(&history, &classifier, "1999-01-01");

        assert_eq!(*classifier.batch_sizes.borrow(), vec![25, 25, 10]);
    }

    #[test]
    fn refined_batch_replaces_local_classification() {
        let history = FakeHistory::with_titles(&["Gazumped the tests"]);
        let classifier = StubClassifier::replying(vec![(
            Some(Category::Fixed),
            "Gazumped the tests".to_string(),
        )]);

        let mut release = Release::unreleased();
        release.generate(&history, &classifier, "1999-01-01");

        assert_eq!(
            release.section(Category::Fixed).lines(),
            ["* Gazumped the tests"]
        );
    }

    #[test]
    fn mismatched_refinement_length_falls_back_to_local() {
        let history = FakeHistory::with_titles(&["Fix the login bug", "Add a widget"]);
        let classifier =
            StubClassifier::replying(vec![(Some(Category::Removed), "Everything".to_string())]);

        let mut release = Release::unreleased();
        release.generate(&history, &classifier, "1999-01-01");

        assert_eq!(
            release.section(Category::Fixed).lines(),
            ["* The login bug"]
        );
        assert!(release.section(Category::Removed).lines().is_empty());
    }

    #[test]
    fn unreleased_header_has_no_date() {
        assert_eq!(Release::unreleased().header(), "## Unreleased");
    }

    #[test]
    fn tagged_release_header_carries_date() {
        let release = Release::new("1.2.0", Some("2021-12-25".to_string()));

        assert_eq!(release.header(), "## 1.2.0 - 2021-12-25");
    }

    #[test]
    fn render_skips_empty_sections() {
        let mut release = Release::new("1.2.0", Some("2021-12-25".to_string()));
        release.read(&lines(&["### Fixed", "* the login bug"]));

        assert_eq!(
            release.render(),
            "## 1.2.0 - 2021-12-25\n\n### Fixed\n\n* the login bug"
        );
    }
}
