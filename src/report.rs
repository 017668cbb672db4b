use crate::model::Record;
use crate::normalize::normalize;
use serde::Serialize;
use std::collections::BTreeMap;

const TOP_TAG_LIMIT: usize = 10;

/// Aggregate view over one or many collections, printed as pretty JSON by
/// the CLI `report` command.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CatalogReport {
    pub total_records: usize,
    pub complete_records: usize,
    pub incomplete_records: usize,
    pub by_program: BTreeMap<String, usize>,
    pub by_year: BTreeMap<i32, usize>,
    pub top_tags: Vec<TagCount>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

pub fn build_report<'a, I>(collections: I) -> CatalogReport
where
    I: IntoIterator<Item = (&'a str, &'a [Record])>,
{
    let mut report = CatalogReport::default();
    let mut tag_counts: BTreeMap<String, usize> = BTreeMap::new();

    for (program, records) in collections {
        for record in records {
            report.total_records += 1;
            if record.is_complete() {
                report.complete_records += 1;
            } else {
                report.incomplete_records += 1;
            }

            *report.by_program.entry(program.to_string()).or_default() += 1;
            *report.by_year.entry(record.year()).or_default() += 1;

            for tag in &record.tags {
                *tag_counts.entry(normalize(tag)).or_default() += 1;
            }
        }
    }

    let mut ranked: Vec<TagCount> = tag_counts
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    ranked.truncate(TOP_TAG_LIMIT);
    report.top_tags = ranked;

    report
}
