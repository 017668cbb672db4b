use chrono::{NaiveDate, TimeZone, Utc};
use guionero::catalog::{UnmatchedPolicy, distribute, match_program};
use guionero::config::{CatalogConfig, ProgramEntry};
use guionero::merge::{derive_key, merge_records};
use guionero::model::{Record, RecordStatus};
use guionero::query::{records_from_year, search_records};

fn record(id: &str, title: &str, writer: &str, day: &str) -> Record {
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

fn catalog() -> CatalogConfig {
    CatalogConfig {
        programs: vec![
            ProgramEntry {
                key: "bdias".to_string(),
                name: "BUENOS DÍAS BAYAMO".to_string(),
            },
            ProgramEntry {
                key: "noticias".to_string(),
                name: "RCM NOTICIAS".to_string(),
            },
            ProgramEntry {
                key: "son".to_string(),
                name: "AL SON DE LA RADIO".to_string(),
            },
        ],
    }
}

#[test]
fn key_ignores_id_status_and_accents() {
    let a = record("id-1", "Cambio climático", "Ana Pérez", "2024-01-05");
    let mut b = record("id-2", "cambio CLIMATICO", "ana perez", "2024-01-05");
    b.status = RecordStatus::Archived;
    b.word_count = 99;

    assert_eq!(derive_key(&a), derive_key(&b));
    assert_eq!(derive_key(&a), "2024-01-05|CAMBIO CLIMATICO|ANA PEREZ");
}

#[test]
fn key_distinguishes_day_title_and_writer() {
    let base = record("x", "Tema A", "Ana", "2024-01-05");
    assert_ne!(
        derive_key(&base),
        derive_key(&record("x", "Tema A", "Ana", "2024-01-06"))
    );
    assert_ne!(
        derive_key(&base),
        derive_key(&record("x", "Tema B", "Ana", "2024-01-05"))
    );
    assert_ne!(
        derive_key(&base),
        derive_key(&record("x", "Tema A", "Luis", "2024-01-05"))
    );
}

#[test]
fn incoming_overwrites_existing_on_key_collision() {
    let existing = vec![record("old-1", "Tema A", "Ana", "2024-01-05")];
    let incoming = vec![
        record("new-1", "tema a", "ANA", "2024-01-05"),
        record("new-2", "Tema C", "Luis", "2024-01-06"),
    ];

    let merged = merge_records(&existing, &incoming);
    assert_eq!(merged.len(), 2);

    // Incoming field values win; the stored id survives the overwrite.
    assert_eq!(merged[0].title, "tema a");
    assert_eq!(merged[0].id, "old-1");
    assert_eq!(merged[1].title, "Tema C");
    assert_eq!(merged[1].id, "new-2");
}

#[test]
fn merge_is_idempotent() {
    let existing = vec![
        record("e-1", "Tema A", "Ana", "2024-01-05"),
        record("e-2", "Tema B", "Luis", "2024-02-01"),
    ];
    let incoming = vec![
        record("i-1", "Tema B", "Luis", "2024-02-01"),
        record("i-2", "Tema D", "Rosa", "2024-03-09"),
    ];

    let once = merge_records(&existing, &incoming);
    let twice = merge_records(&once, &incoming);
    assert_eq!(once, twice);
}

#[test]
fn merge_order_keeps_untouched_existing_first() {
    let existing = vec![
        record("e-1", "Tema A", "Ana", "2024-01-05"),
        record("e-2", "Tema B", "Luis", "2024-01-06"),
        record("e-3", "Tema C", "Rosa", "2024-01-07"),
    ];
    // Touches Tema B (overwrite) and adds two new records.
    let incoming = vec![
        record("i-1", "Tema Nuevo", "Pepe", "2024-02-01"),
        record("i-2", "Tema B", "Luis", "2024-01-06"),
        record("i-3", "Tema Final", "Mara", "2024-02-02"),
    ];

    let merged = merge_records(&existing, &incoming);
    let titles: Vec<&str> = merged.iter().map(|r| r.title.as_str()).collect();

    // Existing-only keys in original order, then incoming keys in batch order.
    assert_eq!(
        titles,
        vec!["Tema A", "Tema C", "Tema Nuevo", "Tema B", "Tema Final"]
    );
}

#[test]
fn duplicate_keys_inside_incoming_collapse_to_last() {
    let incoming = vec![
        record("i-1", "Tema A", "Ana", "2024-01-05"),
        record("i-2", "tema a", "ana", "2024-01-05"),
    ];

    let merged = merge_records(&[], &incoming);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].id, "i-2");
    assert_eq!(merged[0].title, "tema a");
}

#[test]
fn empty_batches_merge_cleanly() {
    let existing = vec![record("e-1", "Tema A", "Ana", "2024-01-05")];
    assert_eq!(merge_records(&existing, &[]), existing);
    assert_eq!(merge_records(&[], &existing), existing);
    assert!(merge_records(&[], &[]).is_empty());
}

#[test]
fn program_matches_by_normalized_equality() {
    let catalog = catalog();
    let matched = match_program("rcm noticias", &catalog).expect("exact match");
    assert_eq!(matched.key, "noticias");

    let accented = match_program("buenos dias bayamo", &catalog).expect("accent-folded match");
    assert_eq!(accented.key, "bdias");
}

#[test]
fn program_matches_by_containment_above_length_gate() {
    let catalog = catalog();
    let matched = match_program("NOTICIAS", &catalog).expect("containment match");
    assert_eq!(matched.key, "noticias");

    // Three characters or fewer never containment-match.
    assert!(match_program("SON", &catalog).is_none());
}

#[test]
fn program_matches_by_initials() {
    let catalog = catalog();
    let matched = match_program("B.D.B", &catalog).expect("initials match");
    assert_eq!(matched.name, "BUENOS DÍAS BAYAMO");
}

#[test]
fn parenthesized_variants_group_to_one_program() {
    let catalog = catalog();
    let matched = match_program("Al Son de la Radio (B)", &catalog).expect("variant match");
    assert_eq!(matched.key, "son");
}

#[test]
fn unmatched_programs_follow_caller_policy() {
    let catalog = catalog();
    let records = vec![
        record("r-1", "Tema A", "Ana", "2024-01-05"),
        {
            let mut unknown = record("r-2", "Tema B", "Luis", "2024-01-06");
            unknown.program = "PROGRAMA FANTASMA".to_string();
            unknown
        },
    ];

    let skipped = distribute(records.clone(), &catalog, UnmatchedPolicy::Skip);
    assert_eq!(skipped.ignored, 1);
    assert_eq!(skipped.groups.len(), 1);

    let bucketed = distribute(records, &catalog, UnmatchedPolicy::Bucket);
    assert_eq!(bucketed.ignored, 0);
    let otro = bucketed.groups.get("otro").expect("otro bucket");
    assert_eq!(otro.records.len(), 1);
    assert_eq!(otro.program, "OTRO");
}

#[test]
fn search_covers_people_tags_and_dates() {
    let mut records = vec![
        record("r-1", "Cambio climático", "Ana Pérez", "2024-01-05"),
        record("r-2", "Historia local", "Luis Soto", "2023-06-10"),
    ];
    records[0].tags = vec!["Cambio".to_string(), "climático".to_string()];

    assert_eq!(search_records(&records, "climatico").len(), 1);
    assert_eq!(search_records(&records, "luis").len(), 1);
    assert_eq!(search_records(&records, "2023-06").len(), 1);
    assert_eq!(search_records(&records, "").len(), 2);
    assert!(search_records(&records, "inexistente").is_empty());
}

#[test]
fn year_shelf_filters_and_sorts_newest_first() {
    let records = vec![
        record("r-1", "Tema A", "Ana", "2023-02-01"),
        record("r-2", "Tema B", "Luis", "2023-11-20"),
        record("r-3", "Tema C", "Rosa", "2024-01-05"),
    ];

    let shelf = records_from_year(&records, 2023);
    let titles: Vec<&str> = shelf.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Tema B", "Tema A"]);
}

#[test]
fn distribution_rewrites_to_canonical_name() {
    let catalog = catalog();
    let mut r = record("r-1", "Tema A", "Ana", "2024-01-05");
    r.program = "rcm noticias".to_string();

    let distribution = distribute(vec![r], &catalog, UnmatchedPolicy::Skip);
    let group = distribution.groups.get("noticias").expect("noticias group");
    assert_eq!(group.records[0].program, "RCM NOTICIAS");
}
