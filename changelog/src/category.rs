use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

/// The closed set of changelog sections, per KeepAChangelog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Added,
    Changed,
    Fixed,
    Removed,
    Deprecated,
}

impl Category {
    /// All categories, in the order they appear in a rendered release.
    pub const ALL: [Category; 5] = [
        Category::Added,
        Category::Changed,
        Category::Fixed,
        Category::Removed,
        Category::Deprecated,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Category::Added => "Added",
            Category::Changed => "Changed",
            Category::Fixed => "Fixed",
            Category::Removed => "Removed",
            Category::Deprecated => "Deprecated",
        }
    }

    /// Case-insensitive lookup of a category by its section title.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Leading imperative (and non-imperative) verbs mapped to their category.
/// Editable independently of the `Category` variants themselves.
static VERB_LEXICON: Lazy<HashMap<&'static str, Category>> = Lazy::new(|| {
    use Category::*;

    HashMap::from([
        ("fix", Fixed),
        ("fixes", Fixed),
        ("fixed", Fixed),
        ("bugfix", Fixed),
        ("solve", Fixed),
        ("solves", Fixed),
        ("solved", Fixed),
        ("close", Fixed),
        ("closes", Fixed),
        ("closed", Fixed),
        ("correct", Fixed),
        ("corrects", Fixed),
        ("corrected", Fixed),
        ("create", Added),
        ("creates", Added),
        ("created", Added),
        ("make", Added),
        ("makes", Added),
        ("made", Added),
        ("write", Added),
        ("wrote", Added),
        ("add", Added),
        ("adds", Added),
        ("added", Added),
        ("list", Changed),
        ("lists", Changed),
        ("use", Changed),
        ("uses", Changed),
        ("fetch", Changed),
        ("fetches", Changed),
        ("fetched", Changed),
        ("log", Changed),
        ("logs", Changed),
        ("logged", Changed),
        ("improve", Changed),
        ("improves", Changed),
        ("improved", Changed),
        ("print", Changed),
        ("prints", Changed),
        ("printed", Changed),
        ("rewrite", Changed),
        ("rewrote", Changed),
        ("rewrit", Changed),
        ("refactor", Changed),
        ("change", Changed),
        ("changes", Changed),
        ("changed", Changed),
        ("move", Changed),
        ("moves", Changed),
        ("moved", Changed),
        ("update", Changed),
        ("updates", Changed),
        ("updated", Changed),
        ("tweak", Changed),
        ("tweaks", Changed),
        ("tweaked", Changed),
        ("remove", Removed),
        ("removes", Removed),
        ("removed", Removed),
        ("delete", Removed),
        ("deletes", Removed),
        ("deleted", Removed),
        ("deprecate", Deprecated),
        ("deprecates", Deprecated),
        ("deprecated", Deprecated),
    ])
});

/// Naively classify a commit title by its leading word.
///
/// On a lexicon hit, returns the category and the title with the verb
/// stripped and the first letter capitalized. On a miss, returns the
/// original title untouched so a remote classifier still sees the full
/// sentence.
#[must_use]
pub fn classify(title: &str) -> (Option<Category>, String) {
    let lowered = title.to_lowercase();
    let first_word = lowered.split(' ').next().unwrap_or("");

    match VERB_LEXICON.get(first_word) {
        Some(&category) => {
            let cleaned = capitalize(lowered[first_word.len()..].trim());
            (Some(category), cleaned)
        }
        None => (None, title.to_string()),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_leading_keyword() {
        let cases = [
            ("Make", Category::Added),
            ("Add", Category::Added),
            ("Tweaked", Category::Changed),
            ("Remove", Category::Removed),
            ("Fix", Category::Fixed),
            ("Deprecate", Category::Deprecated),
        ];

        for (keyword, expected) in cases {
            let (category, _) = classify(&format!("{keyword} a test commit"));
            assert_eq!(category, Some(expected), "keyword {keyword}");
        }
    }

    #[test]
    fn classifies_lowercase_keywords() {
        for (keyword, expected) in [
            ("make", Category::Added),
            ("tweaked", Category::Changed),
            ("deprecate", Category::Deprecated),
        ] {
            let (category, _) = classify(&format!("{keyword} a test commit"));
            assert_eq!(category, Some(expected), "keyword {keyword}");
        }
    }

    #[test]
    fn strips_keyword_and_capitalizes() {
        let (category, cleaned) = classify("Fix the login bug");

        assert_eq!(category, Some(Category::Fixed));
        assert_eq!(cleaned, "The login bug");
    }

    #[test]
    fn unknown_keyword_returns_original_title() {
        for first_word in ["Google", "Gazumped", "Tweet", "Did", "finally"] {
            let title = format!("{first_word} a test commit");
            let (category, text) = classify(&title);

            assert_eq!(category, None);
            assert_eq!(text, title);
        }
    }

    #[test]
    fn bare_keyword_yields_empty_cleaned_text() {
        let (category, cleaned) = classify("Fixed");

        assert_eq!(category, Some(Category::Fixed));
        assert_eq!(cleaned, "");
    }

    #[test]
    fn parses_section_titles_case_insensitively() {
        assert_eq!(Category::parse("added"), Some(Category::Added));
        assert_eq!(Category::parse("DEPRECATED"), Some(Category::Deprecated));
        assert_eq!(Category::parse("Security"), None);
    }
}
