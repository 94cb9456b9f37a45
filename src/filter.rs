use crate::model::PosterRecord;

/// Trim and lowercase text for matching.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// The text a query is matched against: title, description and tags joined
/// by single spaces.
pub fn searchable_text(record: &PosterRecord) -> String {
    format!(
        "{} {} {}",
        record.title.as_deref().unwrap_or(""),
        record.description.as_deref().unwrap_or(""),
        record.tags.join(" ")
    )
}

pub fn matches(record: &PosterRecord, normalized_query: &str) -> bool {
    normalize(&searchable_text(record)).contains(normalized_query)
}

/// Records whose searchable text contains the query, case-insensitively, in
/// their original order. A blank query keeps everything.
pub fn filter<'a>(records: &'a [PosterRecord], query: &str) -> Vec<&'a PosterRecord> {
    let query = normalize(query);
    if query.is_empty() {
        return records.iter().collect();
    }
    records.iter().filter(|r| matches(r, &query)).collect()
}
