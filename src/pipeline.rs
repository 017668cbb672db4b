use crate::catalog::{UnmatchedPolicy, distribute};
use crate::config::Profile;
use crate::fetch::fetch_remote_records;
use crate::merge::{merge_records, merge_stats};
use crate::model::{ImportReport, Record, RecordStatus};
use crate::parser::parse_entries;
use crate::query::{record_matches, records_from_year};
use crate::report::{CatalogReport, build_report};
use crate::store::{collection_path, list_collections, load_collection, save_collection};
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub file: PathBuf,
    pub program: String,
    pub data_dir: PathBuf,
    pub profile_path: Option<PathBuf>,
    pub status: RecordStatus,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct DistributeOptions {
    pub file: PathBuf,
    pub data_dir: PathBuf,
    pub profile_path: Option<PathBuf>,
    pub status: RecordStatus,
    pub unmatched_policy: UnmatchedPolicy,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub program: String,
    pub data_dir: PathBuf,
    pub profile_path: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub data_dir: PathBuf,
    pub program: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub data_dir: PathBuf,
    pub program: Option<String>,
    pub query: String,
    /// Restrict matches to one calendar year ("what ran a year ago").
    pub year: Option<i32>,
}

/// Parses one upload file into a single program's collection and merges it
/// with whatever that collection already holds.
pub fn import_file(options: &ImportOptions) -> Result<ImportReport> {
    let profile = Profile::load_or_default(options.profile_path.as_deref())?;
    let text = std::fs::read_to_string(&options.file)
        .with_context(|| format!("failed to read upload file {}", options.file.display()))?;

    let outcome = parse_entries(&text, &profile.parser, options.status);
    info!(
        program = %options.program,
        entries = outcome.entries_segmented,
        parsed = outcome.records.len(),
        dropped = outcome.dropped_invalid,
        "upload parsed"
    );

    let report = merge_into_collection(
        &options.data_dir,
        &options.program,
        &options.program,
        outcome.records,
        options.dry_run,
    )?;

    Ok(ImportReport {
        entries_segmented: outcome.entries_segmented,
        dropped_invalid: outcome.dropped_invalid,
        ..report
    })
}

/// Bulk flow: parses one upload carrying many programs, groups records by
/// catalog match, and merges each group into its own collection.
pub fn distribute_file(options: &DistributeOptions) -> Result<Vec<ImportReport>> {
    let profile = Profile::load_or_default(options.profile_path.as_deref())?;
    if profile.catalog.programs.is_empty() && options.unmatched_policy == UnmatchedPolicy::Skip {
        bail!("distribution needs a [catalog] with programs; every record would be ignored");
    }

    let text = std::fs::read_to_string(&options.file)
        .with_context(|| format!("failed to read upload file {}", options.file.display()))?;

    let outcome = parse_entries(&text, &profile.parser, options.status);
    let parsed = outcome.records.len();
    let distribution = distribute(outcome.records, &profile.catalog, options.unmatched_policy);

    info!(
        entries = outcome.entries_segmented,
        parsed,
        dropped = outcome.dropped_invalid,
        groups = distribution.groups.len(),
        ignored = distribution.ignored,
        "bulk upload distributed"
    );

    let mut reports = Vec::new();
    for (key, group) in distribution.groups {
        let report = merge_into_collection(
            &options.data_dir,
            &key,
            &group.program,
            group.records,
            options.dry_run,
        )?;
        reports.push(report);
    }

    Ok(reports)
}

/// Merges a pre-structured remote batch into one program's collection. The
/// remote feed bypasses the parser; its records land straight in the
/// reconciler.
pub fn sync_remote(options: &SyncOptions) -> Result<ImportReport> {
    let profile = Profile::load_or_default(options.profile_path.as_deref())?;
    let mut remote = profile.remote.clone();
    if let Some(endpoint) = &options.endpoint {
        remote.endpoint = Some(endpoint.clone());
    }

    let incoming = fetch_remote_records(&remote)?;
    merge_into_collection(
        &options.data_dir,
        &options.program,
        &options.program,
        incoming,
        options.dry_run,
    )
}

fn merge_into_collection(
    data_dir: &Path,
    program_key: &str,
    program: &str,
    incoming: Vec<Record>,
    dry_run: bool,
) -> Result<ImportReport> {
    let path = collection_path(data_dir, program_key);
    let existing = load_collection(&path)?;

    let stats = merge_stats(&existing, &incoming);
    let merged = merge_records(&existing, &incoming);

    let report = ImportReport {
        program: program.to_string(),
        records_parsed: incoming.len(),
        inserted: stats.inserted,
        overwritten: stats.overwritten,
        total: merged.len(),
        ..ImportReport::default()
    };

    info!(
        program,
        inserted = report.inserted,
        overwritten = report.overwritten,
        total = report.total,
        "collection merge complete"
    );

    if dry_run {
        info!(program, "dry run enabled; collection not persisted");
    } else {
        save_collection(&path, program, &merged)?;
        info!(file = %path.display(), "collection written");
    }

    Ok(report)
}

/// Builds the aggregate report over one program or the whole data dir.
pub fn report_catalog(options: &ReportOptions) -> Result<CatalogReport> {
    let collections = load_named_collections(&options.data_dir, options.program.as_deref())?;
    let borrowed: Vec<(&str, &[Record])> = collections
        .iter()
        .map(|(name, records)| (name.as_str(), records.as_slice()))
        .collect();
    Ok(build_report(borrowed))
}

/// Runs a search across one program's collection, or all of them.
pub fn search_catalog(options: &SearchOptions) -> Result<Vec<Record>> {
    let collections = load_named_collections(&options.data_dir, options.program.as_deref())?;

    let mut found = Vec::new();
    for (_, records) in &collections {
        let candidates = match options.year {
            Some(year) => records_from_year(records, year),
            None => records.iter().collect(),
        };
        found.extend(
            candidates
                .into_iter()
                .filter(|record| record_matches(record, &options.query))
                .cloned(),
        );
    }

    info!(query = %options.query, matches = found.len(), "search complete");
    Ok(found)
}

fn load_named_collections(
    data_dir: &Path,
    program: Option<&str>,
) -> Result<Vec<(String, Vec<Record>)>> {
    if let Some(program) = program {
        let path = collection_path(data_dir, program);
        let records = load_collection(&path)?;
        return Ok(vec![(program.to_string(), records)]);
    }

    let mut collections = Vec::new();
    for path in list_collections(data_dir)? {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        let records = load_collection(&path)?;
        collections.push((name, records));
    }

    Ok(collections)
}
