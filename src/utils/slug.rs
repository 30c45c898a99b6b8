//! URL slug derivation for tour names.

use regex::Regex;
use std::sync::LazyLock;

/// Runs of anything that is not a lowercase letter or digit.
static NON_ALNUM_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Lowercases `name` and collapses every run of non-alphanumeric characters
/// into a single `-`, trimming leading and trailing separators.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("The Forest Hiker"), "the-forest-hiker");
/// assert_eq!(slugify("  Sea & Sun!  "), "sea-sun");
/// ```
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    NON_ALNUM_REGEX
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}
