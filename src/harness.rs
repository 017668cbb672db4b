use crate::model::RecordStatus;
use crate::pipeline::{ImportOptions, import_file};
use crate::store::list_collections;
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct HarnessOptions {
    pub file: PathBuf,
    pub program: String,
    pub data_dir: PathBuf,
    pub profile_path: Option<PathBuf>,
}

/// Stability counters from importing the same upload twice into a clean
/// data dir. A healthy parser/merge pair inserts everything once and then
/// only overwrites: `second_run_inserted` must be zero.
#[derive(Debug, Clone, Serialize)]
pub struct HarnessReport {
    pub first_run_inserted: usize,
    pub first_run_overwritten: usize,
    pub second_run_inserted: usize,
    pub second_run_overwritten: usize,
    pub total_records: usize,
    pub collection_files: usize,
}

pub fn run_harness(options: &HarnessOptions) -> Result<HarnessReport> {
    if options.data_dir.exists() {
        std::fs::remove_dir_all(&options.data_dir)?;
    }

    let import_options = ImportOptions {
        file: options.file.clone(),
        program: options.program.clone(),
        data_dir: options.data_dir.clone(),
        profile_path: options.profile_path.clone(),
        status: RecordStatus::Active,
        dry_run: false,
    };

    let first = import_file(&import_options)?;
    let second = import_file(&import_options)?;

    let collection_files = list_collections(&options.data_dir)?.len();

    Ok(HarnessReport {
        first_run_inserted: first.inserted,
        first_run_overwritten: first.overwritten,
        second_run_inserted: second.inserted,
        second_run_overwritten: second.overwritten,
        total_records: second.total,
        collection_files,
    })
}
