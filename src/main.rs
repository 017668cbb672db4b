use anyhow::Result;
use clap::{Parser, Subcommand};
use guionero::catalog::UnmatchedPolicy;
use guionero::harness::{HarnessOptions, run_harness};
use guionero::model::RecordStatus;
use guionero::pipeline::{
    DistributeOptions, ImportOptions, ReportOptions, SearchOptions, SyncOptions, distribute_file,
    import_file, report_catalog, search_catalog, sync_remote,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "guionero", about = "Radio script catalog manager")]
struct Cli {
    #[arg(long, default_value = "data/collections")]
    data_dir: PathBuf,

    /// Optional TOML profile (parser, catalog, remote sections).
    #[arg(long)]
    profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a text upload into one program's collection.
    Import {
        file: PathBuf,
        #[arg(long)]
        program: String,
        #[arg(long, default_value_t = false)]
        archived: bool,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Parse a bulk upload and distribute records across the catalog.
    Distribute {
        file: PathBuf,
        /// Keep unmatched records in the OTRO bucket instead of ignoring them.
        #[arg(long, default_value_t = false)]
        bucket_unmatched: bool,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Merge a remote JSON batch into one program's collection.
    Sync {
        #[arg(long)]
        program: String,
        /// Overrides the profile's remote endpoint.
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Search stored records by program, topic, people, tags, or date.
    Search {
        query: String,
        #[arg(long)]
        program: Option<String>,
        /// Restrict matches to one calendar year.
        #[arg(long)]
        year: Option<i32>,
    },
    /// Aggregate counts over one program or the whole catalog.
    Report {
        #[arg(long)]
        program: Option<String>,
    },
    /// Check that a profile file parses and validates.
    Validate {
        profile_file: PathBuf,
    },
    /// Import the same file twice and report merge stability counters.
    Harness {
        file: PathBuf,
        #[arg(long, default_value = "harness")]
        program: String,
    },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Import {
            file,
            program,
            archived,
            dry_run,
        } => {
            let report = import_file(&ImportOptions {
                file,
                program,
                data_dir: cli.data_dir,
                profile_path: cli.profile,
                status: status_for(archived),
                dry_run,
            })?;

            info!(
                program = %report.program,
                entries = report.entries_segmented,
                parsed = report.records_parsed,
                dropped = report.dropped_invalid,
                inserted = report.inserted,
                overwritten = report.overwritten,
                total = report.total,
                "import summary"
            );
        }
        Commands::Distribute {
            file,
            bucket_unmatched,
            dry_run,
        } => {
            let reports = distribute_file(&DistributeOptions {
                file,
                data_dir: cli.data_dir,
                profile_path: cli.profile,
                status: RecordStatus::Active,
                unmatched_policy: if bucket_unmatched {
                    UnmatchedPolicy::Bucket
                } else {
                    UnmatchedPolicy::Skip
                },
                dry_run,
            })?;

            for report in reports {
                info!(
                    program = %report.program,
                    inserted = report.inserted,
                    overwritten = report.overwritten,
                    total = report.total,
                    "distribution summary"
                );
            }
        }
        Commands::Sync {
            program,
            endpoint,
            dry_run,
        } => {
            let report = sync_remote(&SyncOptions {
                program,
                data_dir: cli.data_dir,
                profile_path: cli.profile,
                endpoint,
                dry_run,
            })?;

            info!(
                program = %report.program,
                fetched = report.records_parsed,
                inserted = report.inserted,
                overwritten = report.overwritten,
                total = report.total,
                "sync summary"
            );
        }
        Commands::Search {
            query,
            program,
            year,
        } => {
            let found = search_catalog(&SearchOptions {
                data_dir: cli.data_dir,
                program,
                query,
                year,
            })?;

            println!("{}", serde_json::to_string_pretty(&found)?);
        }
        Commands::Report { program } => {
            let report = report_catalog(&ReportOptions {
                data_dir: cli.data_dir,
                program,
            })?;

            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Validate { profile_file } => {
            let profile = guionero::config::load_profile_file(&profile_file)?;
            println!(
                "OK: {} catalog programs ({})",
                profile.catalog.programs.len(),
                profile_file.display()
            );
        }
        Commands::Harness { file, program } => {
            let report = run_harness(&HarnessOptions {
                file,
                program,
                data_dir: cli.data_dir,
                profile_path: cli.profile,
            })?;

            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn status_for(archived: bool) -> RecordStatus {
    if archived {
        RecordStatus::Archived
    } else {
        RecordStatus::Active
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}
