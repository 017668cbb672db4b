use crate::config::sanitize_for_path;
use crate::model::{Record, StoredCollection};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File path of one program's collection. Exposed as a pure function so
/// callers choose collections explicitly instead of relying on an ambient
/// storage key.
pub fn collection_path(data_dir: &Path, program_key: &str) -> PathBuf {
    data_dir.join(format!("{}.json", sanitize_for_path(program_key)))
}

/// A missing file is an empty collection; a present-but-corrupt file is an
/// error, never silently discarded data.
pub fn load_collection(path: &Path) -> Result<Vec<Record>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read collection file {}", path.display()))?;
    let stored: StoredCollection = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse collection file {}", path.display()))?;
    Ok(stored.records)
}

pub fn save_collection(path: &Path, program: &str, records: &[Record]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create collection directory {}", parent.display()))?;
    }

    let stored = StoredCollection {
        schema_version: StoredCollection::SCHEMA_VERSION,
        program: program.to_string(),
        records: records.to_vec(),
    };
    let serialized = serde_json::to_string_pretty(&stored)?;
    std::fs::write(path, serialized)
        .with_context(|| format!("failed to write collection file {}", path.display()))?;
    Ok(())
}

/// All collection files under the data dir, sorted for stable reporting.
pub fn list_collections(data_dir: &Path) -> Result<Vec<PathBuf>> {
    if !data_dir.exists() {
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(data_dir) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("json")
        {
            paths.push(entry.path().to_path_buf());
        }
    }

    paths.sort();
    Ok(paths)
}
