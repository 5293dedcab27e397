use std::collections::HashSet;

use tracing::{info, warn};

use crate::types::ArticleRecord;
use crate::urls::RuleBook;

/// Combines freshly extracted records with the previously persisted set.
///
/// Existing records win on URL collision. The one exception is the repair
/// pass: an existing record persisted with a degraded URL (the source's root
/// page, or anything failing its detail shape) is replaced by a fresh record
/// carrying the same title and a valid URL. Sources occasionally publish link
/// markup without a resolvable detail URL, so earlier runs may have had to
/// store the root as a placeholder; this lets a later run heal the record
/// without a manual migration.
///
/// The combined set is then re-validated and deduplicated by URL, first
/// occurrence wins (repaired existing records before appended fresh ones).
pub fn merge(
    existing: &[ArticleRecord],
    fresh: &[ArticleRecord],
    rules: &RuleBook,
) -> Vec<ArticleRecord> {
    let repaired: Vec<ArticleRecord> = existing
        .iter()
        .map(|record| {
            if !rules.is_valid(&record.url) {
                if let Some(candidate) = fresh
                    .iter()
                    .find(|f| f.title == record.title && rules.is_valid(&f.url))
                {
                    info!(
                        title = %record.title,
                        from = %record.url,
                        to = %candidate.url,
                        "repaired stale article url"
                    );
                    return candidate.clone();
                }
            }
            record.clone()
        })
        .collect();

    let known: HashSet<&str> = repaired.iter().map(|r| r.url.as_str()).collect();
    let appended: Vec<ArticleRecord> = fresh
        .iter()
        .filter(|record| !known.contains(record.url.as_str()))
        .cloned()
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();
    for record in repaired.into_iter().chain(appended) {
        if rules.is_known_root(&record.url) {
            warn!(title = %record.title, "dropping record pointing at a source root page");
            continue;
        }
        if !rules.is_valid(&record.url) {
            warn!(title = %record.title, url = %record.url, "dropping record with invalid url");
            continue;
        }
        if seen.insert(record.url.clone()) {
            merged.push(record);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::urls::UrlRule;

    fn rules() -> RuleBook {
        RuleBook::new(vec![
            UrlRule::new("https://the-edit.co.kr/").with_shape(r"/\d+$")
        ])
    }

    fn record(title: &str, url: &str) -> ArticleRecord {
        ArticleRecord {
            title: title.to_string(),
            url: url.to_string(),
            description: title.to_string(),
            thumbnail: String::new(),
            author: "디에디트".to_string(),
            date: "2026.01.15".to_string(),
            category: Some("TECH".to_string()),
        }
    }

    #[test]
    fn fresh_records_are_appended_once() {
        let existing = vec![record("a", "https://the-edit.co.kr/1")];
        let fresh = vec![
            record("b", "https://the-edit.co.kr/2"),
            record("b", "https://the-edit.co.kr/2"),
        ];
        let merged = merge(&existing, &fresh, &rules());
        let urls: Vec<_> = merged.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, ["https://the-edit.co.kr/1", "https://the-edit.co.kr/2"]);
    }

    #[test]
    fn existing_wins_on_collision() {
        let mut updated = record("a", "https://the-edit.co.kr/1");
        updated.description = "rewritten elsewhere".to_string();
        let existing = vec![record("a", "https://the-edit.co.kr/1")];
        let merged = merge(&existing, &[updated], &rules());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].description, "a");
    }

    #[test]
    fn merge_is_idempotent_over_unchanged_extraction() {
        let existing = vec![record("a", "https://the-edit.co.kr/1")];
        let fresh = vec![
            record("a", "https://the-edit.co.kr/1"),
            record("b", "https://the-edit.co.kr/2"),
        ];
        let once = merge(&existing, &fresh, &rules());
        let twice = merge(&once, &fresh, &rules());
        assert_eq!(once, twice);
    }

    #[test]
    fn urls_are_unique_after_merge() {
        let existing = vec![
            record("a", "https://the-edit.co.kr/1"),
            record("b", "https://the-edit.co.kr/2"),
        ];
        let fresh = vec![
            record("a2", "https://the-edit.co.kr/1"),
            record("c", "https://the-edit.co.kr/3"),
        ];
        let merged = merge(&existing, &fresh, &rules());
        let mut urls: Vec<_> = merged.iter().map(|r| r.url.as_str()).collect();
        let total = urls.len();
        urls.sort();
        urls.dedup();
        assert_eq!(urls.len(), total);
    }

    #[test]
    fn root_placeholder_is_repaired_by_title() {
        let existing = vec![record("X", "https://the-edit.co.kr/")];
        let fresh = vec![record("X", "https://the-edit.co.kr/1234")];
        let merged = merge(&existing, &fresh, &rules());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].url, "https://the-edit.co.kr/1234");
    }

    #[test]
    fn unrepairable_placeholder_is_dropped() {
        let existing = vec![record("X", "https://the-edit.co.kr/")];
        let fresh = vec![record("Y", "https://the-edit.co.kr/77")];
        let merged = merge(&existing, &fresh, &rules());
        let urls: Vec<_> = merged.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, ["https://the-edit.co.kr/77"]);
    }

    #[test]
    fn shape_violations_are_repaired_too() {
        let existing = vec![record("X", "https://the-edit.co.kr/post-draft")];
        let fresh = vec![record("X", "https://the-edit.co.kr/99")];
        let merged = merge(&existing, &fresh, &rules());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].url, "https://the-edit.co.kr/99");
    }
}
