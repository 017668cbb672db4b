use crate::config::ParserConfig;
use crate::normalize::normalize;
use regex::Regex;
use std::sync::LazyLock;

/// Raw labeled fields pulled from one entry block. Absent fields stay empty;
/// validity decisions belong to the record builder, not here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFields {
    pub program: String,
    pub date_raw: String,
    pub writer: String,
    pub advisor: String,
    pub topic: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Program,
    Date,
    Writer,
    Advisor,
    Topic,
    /// Recognized label that terminates the previous span but maps to no
    /// structured field (e.g. `Emisión:`, `Archivo:`).
    Boundary,
}

/// Label word followed by a colon. `ASESORA` must precede `ASESOR` so the
/// longer synonym wins the alternation.
static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(PROGRAMA|FECHA|ESCRITOR|ESCRIBE|ASESORA|ASESOR|TEMA|EMISI[OÓ]N|ARCHIVO)\s*:",
    )
    .expect("label regex must compile")
});

static BULLETIN_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("bulletin prefix regex must compile"));

/// Capitalized two-to-three-word name following the connectives `por`/`es`,
/// the usual shape of narrative advisor credits ("es Juan Gómez, jefe de...").
static ADVISOR_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:por|es)\s+([A-ZÁÉÍÓÚÑÜ][a-záéíóúñü]+(?:\s+[A-ZÁÉÍÓÚÑÜ][a-záéíóúñü]+){1,2})",
    )
    .expect("advisor name regex must compile")
});

const ADVISOR_CONNECTORS: [&str; 9] = [
    "es",
    "la",
    "el",
    "por",
    "de",
    "sra",
    "sr",
    "compañera",
    "compañero",
];

/// Extracts the labeled fields from one entry block.
///
/// Field boundaries come from label positions, not line breaks: a field's
/// value runs from just after its colon to the start of the next recognized
/// label, so a `Tema:` spilling over several physical lines stays whole. The
/// scan is a two-state machine over label tokens — seeking a label, then
/// accumulating the span of the current field.
pub fn extract_fields(block: &str, config: &ParserConfig) -> RawFields {
    let mut fields = RawFields::default();
    let mut current: Option<(FieldKind, usize)> = None;

    for label in LABEL_RE.find_iter(block) {
        if let Some((kind, value_start)) = current.take() {
            assign(&mut fields, kind, &block[value_start..label.start()]);
        }

        let kind = classify_label(&block[label.start()..label.end()]);
        current = Some((kind, label.end()));
    }

    if let Some((kind, value_start)) = current {
        assign(&mut fields, kind, &block[value_start..]);
    }

    fields.program = clean_program(&fields.program, config);
    fields.advisor = clean_advisor(&fields.advisor);

    if fields.program.is_empty() || normalize(&fields.program).contains("PECIFICADO") {
        if let Some(inferred) = infer_program(block, config) {
            fields.program = inferred;
        }
    }

    fields
}

fn classify_label(matched: &str) -> FieldKind {
    let folded = normalize(matched);
    match folded.as_str() {
        "PROGRAMA" => FieldKind::Program,
        "FECHA" => FieldKind::Date,
        "ESCRITOR" | "ESCRIBE" => FieldKind::Writer,
        "ASESOR" | "ASESORA" => FieldKind::Advisor,
        "TEMA" => FieldKind::Topic,
        _ => FieldKind::Boundary,
    }
}

fn assign(fields: &mut RawFields, kind: FieldKind, raw_value: &str) {
    let value = raw_value.trim();
    if value.is_empty() {
        return;
    }

    // First occurrence wins; repeated labels in garbled blocks are noise.
    let slot = match kind {
        FieldKind::Program => &mut fields.program,
        FieldKind::Date => &mut fields.date_raw,
        FieldKind::Writer => &mut fields.writer,
        FieldKind::Advisor => &mut fields.advisor,
        FieldKind::Topic => &mut fields.topic,
        FieldKind::Boundary => return,
    };
    if slot.is_empty() {
        *slot = value.to_string();
    }
}

/// Strips bulletin numbering ("1. ") and configured prefixes ("PROG.") from
/// the raw program field.
fn clean_program(raw: &str, config: &ParserConfig) -> String {
    let mut value = BULLETIN_PREFIX_RE.replace(raw.trim(), "").to_string();

    for prefix in &config.program_prefixes {
        let matches_prefix = value
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
        if matches_prefix && value.len() > prefix.len() {
            value = value[prefix.len()..].trim_start().to_string();
            break;
        }
    }

    value.trim().to_string()
}

/// The advisor field often carries narrative beyond the name. Try the
/// capitalized-name capture after `por`/`es` first; failing that, truncate at
/// the first comma or period and peel leading connector words.
fn clean_advisor(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return String::new();
    }

    if let Some(caps) = ADVISOR_NAME_RE.captures(value)
        && let Some(name) = caps.get(1)
    {
        return name.as_str().trim().to_string();
    }

    let truncated = value
        .split([',', '.'])
        .next()
        .unwrap_or(value)
        .trim()
        .to_string();

    let mut words: Vec<&str> = truncated.split_whitespace().collect();
    while let Some(first) = words.first() {
        let folded = normalize(first);
        if ADVISOR_CONNECTORS.iter().any(|c| normalize(c) == folded) {
            words.remove(0);
        } else {
            break;
        }
    }

    words.join(" ")
}

/// Known abbreviation appearing in the header line resolves a missing
/// program ("B.D.B — boletín 3" -> "BUENOS DÍAS BAYAMO").
fn infer_program(block: &str, config: &ParserConfig) -> Option<String> {
    let header = block.lines().find(|line| !line.trim().is_empty())?;
    let folded_header = normalize(header);

    for (abbreviation, full_name) in &config.program_abbreviations {
        let folded = normalize(abbreviation);
        if !folded.is_empty() && folded_header.contains(&folded) {
            return Some(full_name.clone());
        }
    }

    None
}
