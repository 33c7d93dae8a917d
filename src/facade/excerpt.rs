//! Excerpt derivation.
//!
//! The excerpt is the first `limit` characters of the raw content with markup
//! tags stripped, followed by "..." when the content was cut.

use once_cell::sync::Lazy;
use regex::Regex;

static MARKUP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("markup tag pattern is valid"));

/// Derive an excerpt from post content.
pub fn derive_excerpt(content: &str, limit: usize) -> String {
    let truncated = content.chars().count() > limit;
    let head: String = content.chars().take(limit).collect();
    let mut excerpt = MARKUP_TAG.replace_all(&head, "").into_owned();
    if truncated {
        excerpt.push_str("...");
    }
    excerpt
}
