use anyhow::Result;
use chrono::{NaiveDate, TimeZone, Utc};
use guionero::catalog::UnmatchedPolicy;
use guionero::harness::{HarnessOptions, run_harness};
use guionero::model::{Record, RecordStatus};
use guionero::pipeline::{
    DistributeOptions, ImportOptions, ReportOptions, SearchOptions, SyncOptions, distribute_file,
    import_file, report_catalog, search_catalog, sync_remote,
};
use guionero::store::{collection_path, load_collection};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const UPLOAD: &str = "Programa: RCM NOTICIAS\n\
Fecha: 5 de enero de 2024\n\
Escritor: Ana Pérez\n\
Asesor: es Juan Gómez, jefe de redacción\n\
Tema: Cambio climático en la región\n\
------\n\
Programa: RCM NOTICIAS\n\
Fecha: 6 de enero de 2024\n\
Escribe: Luis Soto\n\
Asesora: María Rodríguez\n\
Tema: Historia de la ciudad\n";

const BULK_UPLOAD: &str = "Programa: B.D.B\n\
Fecha: 5 de enero de 2024\n\
Escritor: Ana Pérez\n\
Asesor: Juan Gómez\n\
Tema: Amanecer en la ciudad\n\
>>>\n\
Programa: rcm noticias\n\
Fecha: 6 de enero de 2024\n\
Escritor: Luis Soto\n\
Asesora: María Rodríguez\n\
Tema: Historia de la ciudad\n\
>>>\n\
Programa: PROGRAMA FANTASMA\n\
Fecha: 7 de enero de 2024\n\
Escritor: Rosa Lugo\n\
Asesor: Pedro Páez\n\
Tema: Sin destino\n";

struct FixtureEnv {
    root: PathBuf,
    data_dir: PathBuf,
}

fn setup_fixture_env() -> Result<FixtureEnv> {
    let temp = tempdir()?;
    let root = temp.keep();
    let data_dir = root.join("collections");
    Ok(FixtureEnv { root, data_dir })
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

fn import_options(env: &FixtureEnv, upload: &Path) -> ImportOptions {
    ImportOptions {
        file: upload.to_path_buf(),
        program: "noticias".to_string(),
        data_dir: env.data_dir.clone(),
        profile_path: None,
        status: RecordStatus::Active,
        dry_run: false,
    }
}

#[test]
fn import_merges_reupload_without_duplicates() -> Result<()> {
    let env = setup_fixture_env()?;
    let upload = env.root.join("noticias.txt");
    write_file(&upload, UPLOAD)?;

    let first = import_file(&import_options(&env, &upload))?;
    assert_eq!(first.entries_segmented, 2);
    assert_eq!(first.records_parsed, 2);
    assert_eq!(first.inserted, 2);
    assert_eq!(first.overwritten, 0);
    assert_eq!(first.total, 2);

    let second = import_file(&import_options(&env, &upload))?;
    assert_eq!(second.inserted, 0);
    assert_eq!(second.overwritten, 2);
    assert_eq!(second.total, 2);

    Ok(())
}

#[test]
fn reupload_preserves_stored_ids() -> Result<()> {
    let env = setup_fixture_env()?;
    let upload = env.root.join("noticias.txt");
    write_file(&upload, UPLOAD)?;

    import_file(&import_options(&env, &upload))?;
    let path = collection_path(&env.data_dir, "noticias");
    let mut first_ids: Vec<String> = load_collection(&path)?
        .into_iter()
        .map(|r| r.id)
        .collect();
    first_ids.sort();

    import_file(&import_options(&env, &upload))?;
    let mut second_ids: Vec<String> = load_collection(&path)?
        .into_iter()
        .map(|r| r.id)
        .collect();
    second_ids.sort();

    assert_eq!(first_ids, second_ids);
    Ok(())
}

#[test]
fn collection_file_uses_the_documented_shape() -> Result<()> {
    let env = setup_fixture_env()?;
    let upload = env.root.join("noticias.txt");
    write_file(&upload, UPLOAD)?;
    import_file(&import_options(&env, &upload))?;

    let content = fs::read_to_string(collection_path(&env.data_dir, "noticias"))?;
    assert!(content.contains("\"schemaVersion\": 1"));
    assert!(content.contains("\"dateAdded\""));
    assert!(content.contains("\"rawContent\""));
    assert!(content.contains("\"status\": \"active\""));

    Ok(())
}

#[test]
fn distribution_groups_bulk_uploads_per_program() -> Result<()> {
    let env = setup_fixture_env()?;
    let upload = env.root.join("bulk.txt");
    write_file(&upload, BULK_UPLOAD)?;

    let profile = env.root.join("profile.toml");
    write_file(
        &profile,
        "[parser]\n\
         delimiter = \"arrows\"\n\n\
         [[catalog.programs]]\n\
         key = \"bdias\"\n\
         name = \"BUENOS DÍAS BAYAMO\"\n\n\
         [[catalog.programs]]\n\
         key = \"noticias\"\n\
         name = \"RCM NOTICIAS\"\n",
    )?;

    let reports = distribute_file(&DistributeOptions {
        file: upload,
        data_dir: env.data_dir.clone(),
        profile_path: Some(profile),
        status: RecordStatus::Active,
        unmatched_policy: UnmatchedPolicy::Skip,
        dry_run: false,
    })?;

    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.inserted == 1));

    let bdias = load_collection(&collection_path(&env.data_dir, "bdias"))?;
    assert_eq!(bdias.len(), 1);
    // The free-form name is rewritten to the canonical catalog name.
    assert_eq!(bdias[0].program, "BUENOS DÍAS BAYAMO");

    let noticias = load_collection(&collection_path(&env.data_dir, "noticias"))?;
    assert_eq!(noticias[0].program, "RCM NOTICIAS");

    // The unknown program was skipped entirely.
    assert!(!collection_path(&env.data_dir, "otro").exists());

    Ok(())
}

#[test]
fn sync_merges_remote_batch_into_collection() -> Result<()> {
    let env = setup_fixture_env()?;

    let remote_records = vec![
        remote_record("r-1", "Nuevo reportaje", "Ana Pérez", "2024-04-01"),
        remote_record("r-2", "Entrevista especial", "Luis Soto", "2024-04-02"),
    ];
    let remote_path = env.root.join("remote.json");
    write_file(&remote_path, &serde_json::to_string_pretty(&remote_records)?)?;

    let profile = env.root.join("profile.toml");
    write_file(
        &profile,
        &format!(
            "[remote]\nmode = \"file\"\nfile_path = {:?}\n",
            remote_path.display().to_string()
        ),
    )?;

    let options = SyncOptions {
        program: "noticias".to_string(),
        data_dir: env.data_dir.clone(),
        profile_path: Some(profile),
        endpoint: None,
        dry_run: false,
    };

    let first = sync_remote(&options)?;
    assert_eq!(first.inserted, 2);
    assert_eq!(first.total, 2);

    let second = sync_remote(&options)?;
    assert_eq!(second.inserted, 0);
    assert_eq!(second.overwritten, 2);
    assert_eq!(second.total, 2);

    Ok(())
}

#[test]
fn report_aggregates_across_collections() -> Result<()> {
    let env = setup_fixture_env()?;
    let upload = env.root.join("noticias.txt");
    write_file(&upload, UPLOAD)?;
    import_file(&import_options(&env, &upload))?;

    let report = report_catalog(&ReportOptions {
        data_dir: env.data_dir.clone(),
        program: None,
    })?;

    assert_eq!(report.total_records, 2);
    assert_eq!(report.complete_records, 2);
    assert_eq!(report.by_year.get(&2024), Some(&2));
    assert!(!report.top_tags.is_empty());

    Ok(())
}

#[test]
fn search_is_accent_insensitive() -> Result<()> {
    let env = setup_fixture_env()?;
    let upload = env.root.join("noticias.txt");
    write_file(&upload, UPLOAD)?;
    import_file(&import_options(&env, &upload))?;

    let found = search_catalog(&SearchOptions {
        data_dir: env.data_dir.clone(),
        program: Some("noticias".to_string()),
        query: "climatico".to_string(),
        year: None,
    })?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Cambio climático en la región");

    let by_writer = search_catalog(&SearchOptions {
        data_dir: env.data_dir.clone(),
        program: None,
        query: "maria rodriguez".to_string(),
        year: None,
    })?;
    assert_eq!(by_writer.len(), 1);

    let wrong_year = search_catalog(&SearchOptions {
        data_dir: env.data_dir.clone(),
        program: None,
        query: String::new(),
        year: Some(2023),
    })?;
    assert!(wrong_year.is_empty());

    let right_year = search_catalog(&SearchOptions {
        data_dir: env.data_dir,
        program: None,
        query: String::new(),
        year: Some(2024),
    })?;
    assert_eq!(right_year.len(), 2);

    Ok(())
}

#[test]
fn harness_reports_stability_counters() -> Result<()> {
    let env = setup_fixture_env()?;
    let upload = env.root.join("noticias.txt");
    write_file(&upload, UPLOAD)?;

    let report = run_harness(&HarnessOptions {
        file: upload,
        program: "noticias".to_string(),
        data_dir: env.data_dir.clone(),
        profile_path: None,
    })?;

    assert_eq!(report.first_run_inserted, 2);
    assert_eq!(report.second_run_inserted, 0);
    assert_eq!(report.second_run_overwritten, 2);
    assert_eq!(report.total_records, 2);
    assert_eq!(report.collection_files, 1);

    Ok(())
}

fn remote_record(id: &str, title: &str, writer: &str, day: &str) -> Record {
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .expect("test date must parse")
        .and_hms_opt(12, 0, 0)
        .expect("noon must exist");

    Record {
        id: id.to_string(),
        program: "RCM NOTICIAS".to_string(),
        date_added: Utc.from_utc_datetime(&date),
        writer: writer.to_string(),
        advisor: "Juan Gómez".to_string(),
        title: title.to_string(),
        tags: vec!["General".to_string()],
        status: RecordStatus::Active,
        raw_content: format!("Tema: {title}"),
        word_count: 2,
    }
}
