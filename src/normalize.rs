use regex::Regex;
use std::sync::LazyLock;

static PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]+").expect("punctuation regex must compile"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex must compile"));
static PAREN_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("paren suffix regex must compile"));

/// Canonical comparison form: diacritics folded, punctuation collapsed to
/// single spaces, whitespace collapsed, trimmed, upper-cased.
///
/// Used for keys and matching only; stored/displayed text stays verbatim.
/// Idempotent: a normalized string passes through unchanged.
pub fn normalize(value: &str) -> String {
    let folded: String = value.chars().map(fold_diacritic).collect();
    let depunctuated = PUNCTUATION_RE.replace_all(&folded, " ");
    let collapsed = WHITESPACE_RE.replace_all(&depunctuated, " ");
    collapsed.trim().to_uppercase()
}

/// Program names recur with parenthesized variant markers ("Show (A)",
/// "Show (B)"); those suffixes are dropped before normalizing so the
/// variants group under one identity.
pub fn normalize_program_name(value: &str) -> String {
    let stripped = PAREN_SUFFIX_RE.replace_all(value, " ");
    normalize(&stripped)
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'Á' | 'À' | 'Ä' | 'Â' => 'A',
        'É' | 'È' | 'Ë' | 'Ê' => 'E',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
        'Ñ' => 'N',
        other => other,
    }
}
