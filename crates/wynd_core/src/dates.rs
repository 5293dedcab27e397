use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::types::ArticleRecord;

/// Best-effort parse of a display date (`2026.01.15`, `2026.01.15.`,
/// `2026-1-5`, with or without internal spacing).
///
/// Unparseable or empty input maps to the Unix epoch so that under a
/// descending sort those records sink to the end.
pub fn parse_display_date(value: &str) -> DateTime<Utc> {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return DateTime::UNIX_EPOCH;
    }
    let cleaned = compact.trim_end_matches('.').replace('.', "-");
    match NaiveDate::parse_from_str(&cleaned, "%Y-%m-%d") {
        Ok(date) => Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
        Err(_) => DateTime::UNIX_EPOCH,
    }
}

/// Renders a date in the store's ko-KR display form, e.g. `2026.01.15.`.
pub fn to_display(date: NaiveDate) -> String {
    date.format("%Y.%m.%d.").to_string()
}

/// Today's date in display form, used when a source exposes no date at all.
pub fn today_display() -> String {
    to_display(Local::now().date_naive())
}

/// Stable descending sort by parsed display date; ties keep input order.
pub fn sort_by_date_desc(records: &mut [ArticleRecord]) {
    records.sort_by_key(|record| std::cmp::Reverse(parse_display_date(&record.date)));
}
