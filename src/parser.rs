use crate::config::ParserConfig;
use crate::dates::resolve_date_or_now;
use crate::extract::{RawFields, extract_fields};
use crate::model::{Record, RecordStatus};
use crate::normalize::normalize;
use crate::segment::segment;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

static TAG_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s,.:;]+").expect("tag split regex must compile"));

/// Sentinel tag when the title yields no qualifying keyword.
const FALLBACK_TAG: &str = "General";

#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub records: Vec<Record>,
    pub entries_segmented: usize,
    pub dropped_invalid: usize,
}

/// Parses a raw upload into records: segment on the configured delimiter,
/// extract labeled fields per block, build a record per entry.
///
/// Malformed entries never error — every missing field defaults. Incomplete
/// records (unspecified writer/advisor/topic) are excluded only when the
/// profile says `drop_invalid`; the default is to retain them and let display
/// layers filter via `Record::is_complete`.
pub fn parse_entries(text: &str, config: &ParserConfig, status: RecordStatus) -> ParseOutcome {
    let blocks = segment(text, config.delimiter);
    let mut outcome = ParseOutcome {
        entries_segmented: blocks.len(),
        ..ParseOutcome::default()
    };

    for (ordinal, block) in blocks.iter().enumerate() {
        let fields = extract_fields(block, config);
        let record = build_record(&fields, block, status, config, ordinal);

        if config.drop_invalid && !record.is_complete() {
            debug!(title = %record.title, writer = %record.writer, "dropping incomplete record");
            outcome.dropped_invalid += 1;
            continue;
        }

        outcome.records.push(record);
    }

    outcome
}

/// Assembles one record from extracted fields, applying every fallback: the
/// program and title literals, today's noon for an unreadable date, and the
/// sentinel tag.
pub fn build_record(
    fields: &RawFields,
    raw_block: &str,
    status: RecordStatus,
    config: &ParserConfig,
    ordinal: usize,
) -> Record {
    let date_added = resolve_date_or_now(&fields.date_raw, &config.month_aliases);

    let title = if fields.topic.trim().is_empty() {
        config.fallback_title.clone()
    } else {
        fields.topic.trim().to_string()
    };

    let program = if fields.program.trim().is_empty() {
        config.default_program.clone()
    } else {
        fields.program.trim().to_string()
    };

    Record {
        id: record_id(raw_block, ordinal),
        program,
        date_added,
        writer: fields.writer.trim().to_string(),
        advisor: fields.advisor.trim().to_string(),
        tags: derive_tags(&title, config),
        title,
        status,
        raw_content: raw_block.to_string(),
        word_count: raw_block.split_whitespace().count(),
    }
}

/// Keyword tags: title tokens longer than three characters that are not
/// Spanish stopwords, capped by the profile, sentinel `General` when empty.
fn derive_tags(title: &str, config: &ParserConfig) -> Vec<String> {
    let stopwords: HashSet<String> = config.stopwords.iter().map(|w| normalize(w)).collect();

    let mut tags: Vec<String> = Vec::new();
    for token in TAG_SPLIT_RE.split(title) {
        if token.chars().count() <= 3 {
            continue;
        }
        if stopwords.contains(&normalize(token)) {
            continue;
        }
        tags.push(token.to_string());
        if tags.len() == config.max_tags {
            break;
        }
    }

    if tags.is_empty() {
        tags.push(FALLBACK_TAG.to_string());
    }

    tags
}

/// Opaque id: digest of the block text and its position in the batch. Unique
/// within a batch, reproducible for the same upload, and never used as the
/// merge identity.
fn record_id(raw_block: &str, ordinal: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_block.as_bytes());
    hasher.update(ordinal.to_le_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)[..16].to_string()
}
