use crate::model::Record;
use crate::normalize::normalize;
use std::collections::{HashMap, HashSet};

/// Derives the identity key recognizing "the same record" across uploads:
/// calendar day, normalized title, normalized writer. The assigned `id` is
/// deliberately absent — incoming batches know nothing of prior ids.
///
/// Pure in the three inputs: records differing only in `id`, `status`, tags,
/// or raw text produce the same key.
pub fn derive_key(record: &Record) -> String {
    format!(
        "{}|{}|{}",
        record.date_added.date_naive(),
        normalize(&record.title),
        normalize(&record.writer)
    )
}

/// Upserts `incoming` into `existing` by derived key. The incoming batch is
/// authoritative: on a key collision its record replaces the stored one
/// (last-write-wins, uploads are corrections), keeping only the stored `id`
/// so manual edits that reference ids survive re-uploads. Unmatched incoming
/// records are appended.
///
/// Output order: records whose key only exists in `existing`, in their
/// original order, followed by every key the incoming batch touches, in the
/// batch's first-occurrence order. Duplicate keys inside `incoming` collapse
/// to the last occurrence at the first occurrence's position.
pub fn merge_records(existing: &[Record], incoming: &[Record]) -> Vec<Record> {
    let mut batch: Vec<Record> = Vec::with_capacity(incoming.len());
    let mut batch_index: HashMap<String, usize> = HashMap::with_capacity(incoming.len());

    for record in incoming {
        let key = derive_key(record);
        if let Some(&slot) = batch_index.get(&key) {
            batch[slot] = record.clone();
        } else {
            batch_index.insert(key, batch.len());
            batch.push(record.clone());
        }
    }

    let mut existing_ids: HashMap<String, &str> = HashMap::with_capacity(existing.len());
    for record in existing {
        existing_ids.entry(derive_key(record)).or_insert(&record.id);
    }

    let mut merged: Vec<Record> = existing
        .iter()
        .filter(|record| !batch_index.contains_key(&derive_key(record)))
        .cloned()
        .collect();

    for mut record in batch {
        if let Some(&id) = existing_ids.get(&derive_key(&record)) {
            record.id = id.to_string();
        }
        merged.push(record);
    }

    merged
}

/// Counts how a merge would land without performing it; used for run reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeStats {
    pub inserted: usize,
    pub overwritten: usize,
}

pub fn merge_stats(existing: &[Record], incoming: &[Record]) -> MergeStats {
    let existing_keys: HashSet<String> = existing.iter().map(derive_key).collect();
    let incoming_keys: HashSet<String> = incoming.iter().map(derive_key).collect();

    MergeStats {
        inserted: incoming_keys.difference(&existing_keys).count(),
        overwritten: incoming_keys.intersection(&existing_keys).count(),
    }
}
