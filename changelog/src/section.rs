use std::collections::HashSet;

use crate::category::Category;
use crate::patterns::BULLET_PATTERN;

/// One category bucket of a release: an ordered list of bullet lines.
#[derive(Debug, Clone)]
pub struct Section {
    category: Category,
    lines: Vec<String>,
}

impl Section {
    #[must_use]
    pub fn new(category: Category) -> Self {
        Self {
            category,
            lines: Vec::new(),
        }
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Append a line, prefixing `* ` when it does not already carry a
    /// bullet marker. Trailing whitespace is stripped.
    pub fn add_line(&mut self, text: &str) {
        let line = if BULLET_PATTERN.is_match(text) {
            text.trim_end().to_string()
        } else {
            format!("* {}", text.trim_end())
        };

        self.lines.push(line);
    }

    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.lines.is_empty()
    }

    /// Drop repeated lines, keeping the first occurrence of each. Idempotent.
    pub fn remove_duplicates(&mut self) {
        let mut seen = HashSet::new();
        self.lines.retain(|line| seen.insert(line.clone()));
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut content = format!("### {}\n\n", self.category);

        for line in &self.lines {
            content.push_str(line);
            content.push('\n');
        }

        content
    }
}
