use crate::config::{CatalogConfig, ProgramEntry};
use crate::model::Record;
use crate::normalize::{normalize, normalize_program_name};
use std::collections::BTreeMap;
use tracing::debug;

/// Bucket key for unmatched records when the caller opts to keep them.
pub const UNMATCHED_BUCKET: &str = "OTRO";

/// What to do with records whose program matches nothing in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedPolicy {
    /// Drop them from the distribution and count them ignored.
    #[default]
    Skip,
    /// Collect them under the generic `OTRO` bucket.
    Bucket,
}

/// Maps a free-form program name onto the catalog, in order of precedence:
/// normalized equality, normalized containment either direction (both sides
/// longer than three characters, so short fragments cannot latch on), then
/// initials — `B.D.B` matches `BUENOS DÍAS BAYAMO`.
pub fn match_program<'a>(raw_name: &str, catalog: &'a CatalogConfig) -> Option<&'a ProgramEntry> {
    let folded = normalize_program_name(raw_name);
    if folded.is_empty() {
        return None;
    }

    for entry in &catalog.programs {
        if normalize_program_name(&entry.name) == folded {
            return Some(entry);
        }
    }

    if folded.chars().count() > 3 {
        for entry in &catalog.programs {
            let entry_folded = normalize_program_name(&entry.name);
            if entry_folded.chars().count() > 3
                && (entry_folded.contains(&folded) || folded.contains(&entry_folded))
            {
                return Some(entry);
            }
        }
    }

    let compact: String = folded.split_whitespace().collect();
    for entry in &catalog.programs {
        if initials(&entry.name) == compact {
            return Some(entry);
        }
    }

    None
}

fn initials(name: &str) -> String {
    normalize(name)
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect()
}

/// Result of grouping a bulk batch by catalog program.
#[derive(Debug, Clone, Default)]
pub struct Distribution {
    /// Program key (or `OTRO`) -> canonical program name and its records.
    pub groups: BTreeMap<String, DistributionGroup>,
    pub ignored: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DistributionGroup {
    pub program: String,
    pub records: Vec<Record>,
}

/// Groups parsed records by matched catalog program, rewriting each record's
/// program to the canonical catalog name. Unmatched records follow `policy`.
pub fn distribute(
    records: Vec<Record>,
    catalog: &CatalogConfig,
    policy: UnmatchedPolicy,
) -> Distribution {
    let mut distribution = Distribution::default();

    for mut record in records {
        match match_program(&record.program, catalog) {
            Some(entry) => {
                record.program = entry.name.clone();
                distribution
                    .groups
                    .entry(entry.key.clone())
                    .or_insert_with(|| DistributionGroup {
                        program: entry.name.clone(),
                        ..DistributionGroup::default()
                    })
                    .records
                    .push(record);
            }
            None => match policy {
                UnmatchedPolicy::Skip => {
                    debug!(program = %record.program, "no catalog match; record ignored");
                    distribution.ignored += 1;
                }
                UnmatchedPolicy::Bucket => {
                    distribution
                        .groups
                        .entry(UNMATCHED_BUCKET.to_lowercase())
                        .or_insert_with(|| DistributionGroup {
                            program: UNMATCHED_BUCKET.to_string(),
                            ..DistributionGroup::default()
                        })
                        .records
                        .push(record);
                }
            },
        }
    }

    distribution
}
