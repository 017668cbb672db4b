use crate::model::Record;
use crate::normalize::normalize;

/// Accent- and case-insensitive substring match over title, tags, program,
/// writer, advisor, and the `YYYY-MM-DD` rendering of the date. An empty
/// query matches everything.
pub fn record_matches(record: &Record, query: &str) -> bool {
    let folded_query = normalize(query);
    if folded_query.is_empty() {
        return true;
    }

    normalize(&record.title).contains(&folded_query)
        || normalize(&record.program).contains(&folded_query)
        || normalize(&record.writer).contains(&folded_query)
        || normalize(&record.advisor).contains(&folded_query)
        || record
            .tags
            .iter()
            .any(|tag| normalize(tag).contains(&folded_query))
        || normalize(&record.date_added.date_naive().to_string()).contains(&folded_query)
}

pub fn search_records<'a>(records: &'a [Record], query: &str) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| record_matches(record, query))
        .collect()
}

/// Records whose resolved day falls in the given year, newest first — the
/// "one year ago" shelf is `records_from_year(records, current_year - 1)`.
pub fn records_from_year(records: &[Record], year: i32) -> Vec<&Record> {
    let mut matched: Vec<&Record> = records
        .iter()
        .filter(|record| record.year() == year)
        .collect();
    matched.sort_by(|a, b| b.date_added.cmp(&a.date_added));
    matched
}
