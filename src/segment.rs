use crate::config::DelimiterStyle;
use regex::Regex;
use std::sync::LazyLock;

static ARROWS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">{3}").expect("arrow delimiter regex must compile"));
static UNDERSCORES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{4,}").expect("underscore delimiter regex must compile"));
static HYPHENS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{5,}").expect("hyphen delimiter regex must compile"));

/// Splits a raw upload into entry blocks on the configured delimiter.
///
/// Blocks are trimmed; empty and whitespace-only blocks are discarded. A
/// text with no delimiter at all comes back as a single block — the field
/// extractor tolerates whatever is inside. Never panics, pure in its inputs.
pub fn segment(text: &str, style: DelimiterStyle) -> Vec<String> {
    let delimiter = match style {
        DelimiterStyle::Arrows => &*ARROWS_RE,
        DelimiterStyle::Underscores => &*UNDERSCORES_RE,
        DelimiterStyle::Hyphens => &*HYPHENS_RE,
    };

    delimiter
        .split(text)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(ToString::to_string)
        .collect()
}
