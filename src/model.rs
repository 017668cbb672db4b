use crate::normalize::normalize;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle flag, set by the caller at parse time; parsing itself never
/// decides it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Active,
    Archived,
}

/// One parsed broadcast-script entry.
///
/// The JSON field names are the persisted contract for collection files and
/// for the remote sync feed, hence the camelCase rename.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Opaque identifier assigned at creation; stable across edits, never
    /// used as the merge identity (uploads know nothing of prior ids).
    pub id: String,
    pub program: String,
    /// Pinned to 12:00 UTC of the resolved calendar day.
    pub date_added: DateTime<Utc>,
    pub writer: String,
    pub advisor: String,
    pub title: String,
    /// Keywords derived from the title for search; never empty.
    pub tags: Vec<String>,
    pub status: RecordStatus,
    /// Original entry block, verbatim, for audit and unmodeled fields.
    pub raw_content: String,
    pub word_count: usize,
}

impl Record {
    /// Completeness check: false when writer or advisor is missing or carries
    /// the "NO ESPECIFICADO" placeholder, or when the title is missing. The
    /// substring `PECIFICADO` also catches OCR-truncated variants.
    ///
    /// Whether incomplete records are dropped at parse time or merely hidden
    /// by display layers is the caller's policy (`ParserConfig::drop_invalid`).
    pub fn is_complete(&self) -> bool {
        !person_unspecified(&self.writer)
            && !person_unspecified(&self.advisor)
            && !title_unspecified(&self.title)
    }

    /// Display line composed from the credited people; derived, not stored.
    pub fn summary(&self) -> String {
        format!("Escritor: {} | Asesor: {}", self.writer, self.advisor)
    }

    pub fn year(&self) -> i32 {
        self.date_added.year()
    }
}

fn person_unspecified(name: &str) -> bool {
    let folded = normalize(name);
    folded.is_empty() || folded.contains("PECIFICADO")
}

fn title_unspecified(title: &str) -> bool {
    let folded = normalize(title);
    folded.is_empty()
        || folded.contains("PECIFICADO")
        || folded == "SIN TEMA"
        || folded == "SIN TITULO"
}

/// On-disk shape of one program's collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCollection {
    pub schema_version: u32,
    pub program: String,
    pub records: Vec<Record>,
}

impl StoredCollection {
    pub const SCHEMA_VERSION: u32 = 1;
}

/// Counters for one import/sync run against one collection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub program: String,
    pub entries_segmented: usize,
    pub records_parsed: usize,
    pub dropped_invalid: usize,
    pub inserted: usize,
    pub overwritten: usize,
    pub total: usize,
}
