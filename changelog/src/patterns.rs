use once_cell::sync::Lazy;
use regex::Regex;

/// A bullet line: optional indentation, `*` or `-`, then a space.
pub static BULLET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[*-]\s").expect("Failed to compile bullet regex"));

/// Any markdown heading, used to close a section scan.
pub static HEADING_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#+\s").expect("Failed to compile heading regex"));

/// A release heading: `X.Y.Z` with optional `v` prefix and optional
/// `- YYYY-MM-DD` date suffix. Leading `#`s are optional so that a
/// hand-edited heading survives a round trip.
pub static RELEASE_HEADING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#*\s*v?(\d{1,2}\.\d{1,2}\.\d{1,2})(?:\s*-\s*(\d{4}-\d{2}-\d{2}))?\s*$")
        .expect("Failed to compile release heading regex")
});

/// The synthetic unreleased heading.
pub static UNRELEASED_HEADING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^#*\s*unreleased\s*$").expect("Failed to compile unreleased heading regex")
});
