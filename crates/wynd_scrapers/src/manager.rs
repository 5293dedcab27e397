use std::path::PathBuf;

use tracing::{error, info, warn};
use wynd_core::dates::sort_by_date_desc;
use wynd_core::merge::merge;
use wynd_core::urls::RuleBook;
use wynd_core::{ArticleRecord, Result};
use wynd_site::write_gallery;
use wynd_storage::ArticleStore;

use crate::fetcher::Fetcher;
use crate::sources::{all_sources, Source};

/// Store cap; only the most recent records survive a run.
pub const DEFAULT_LIMIT: usize = 100;

pub struct PipelineOptions {
    pub limit: usize,
    /// Gallery page destination; `None` skips rendering.
    pub page_path: Option<PathBuf>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            page_path: None,
        }
    }
}

/// Drives one full aggregation pass over every configured source.
pub struct SourceManager {
    sources: Vec<Box<dyn Source>>,
}

impl SourceManager {
    pub fn new() -> Self {
        Self {
            sources: all_sources(),
        }
    }

    pub fn with_sources(sources: Vec<Box<dyn Source>>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &[Box<dyn Source>] {
        &self.sources
    }

    pub fn rule_book(&self) -> RuleBook {
        RuleBook::new(
            self.sources
                .iter()
                .map(|source| source.url_rule().clone())
                .collect(),
        )
    }

    /// One pipeline run: collect each source in order (a failing source is
    /// logged and skipped, the rest still run), merge against the persisted
    /// set, sort newest-first, cap, persist, render.
    ///
    /// A store read failure degrades to an empty existing set; a store write
    /// failure is fatal and leaves the previous file untouched.
    pub async fn run(
        &self,
        fetcher: &Fetcher,
        store: &dyn ArticleStore,
        options: &PipelineOptions,
    ) -> Result<Vec<ArticleRecord>> {
        let existing = match store.load() {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "could not read existing store, starting fresh");
                Vec::new()
            }
        };
        info!(
            existing = existing.len(),
            sources = self.sources.len(),
            "aggregation run started"
        );

        let mut fresh = Vec::new();
        for source in &self.sources {
            match source.collect(fetcher).await {
                Ok(records) => {
                    info!(source = source.name(), count = records.len(), "source collected");
                    fresh.extend(records);
                }
                Err(e) => {
                    error!(source = source.name(), error = %e, "source failed, continuing with the rest");
                }
            }
        }

        let rules = self.rule_book();
        let mut merged = merge(&existing, &fresh, &rules);
        sort_by_date_desc(&mut merged);
        merged.truncate(options.limit);

        store.save(&merged)?;
        if let Some(page_path) = &options.page_path {
            write_gallery(page_path, &merged, &rules)?;
        }

        info!(count = merged.len(), "aggregation run finished");
        Ok(merged)
    }
}

impl Default for SourceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use wynd_core::urls::UrlRule;
    use wynd_core::Error;
    use wynd_storage::MemoryStore;

    struct FixedSource {
        records: Vec<ArticleRecord>,
        rule: UrlRule,
        fail: bool,
    }

    impl FixedSource {
        fn new(records: Vec<ArticleRecord>) -> Self {
            Self {
                records,
                rule: UrlRule::new("https://the-edit.co.kr/").with_shape(r"/\d+$"),
                fail: false,
            }
        }

        fn failing() -> Self {
            let mut source = Self::new(Vec::new());
            source.fail = true;
            source
        }
    }

    #[async_trait]
    impl Source for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        fn url_rule(&self) -> &UrlRule {
            &self.rule
        }

        async fn collect(&self, _fetcher: &Fetcher) -> Result<Vec<ArticleRecord>> {
            if self.fail {
                return Err(Error::Scraping("listing page unreachable".to_string()));
            }
            Ok(self.records.clone())
        }
    }

    fn record(title: &str, id: u32, date: &str) -> ArticleRecord {
        ArticleRecord {
            title: title.to_string(),
            url: format!("https://the-edit.co.kr/{id}"),
            description: title.to_string(),
            thumbnail: String::new(),
            author: "디에디트".to_string(),
            date: date.to_string(),
            category: Some("TECH".to_string()),
        }
    }

    fn fetcher() -> Fetcher {
        Fetcher::new(Duration::ZERO).unwrap()
    }

    #[tokio::test]
    async fn run_merges_sorts_and_persists() {
        let store = MemoryStore::with_records(vec![record("기존", 1, "2026.01.01")]);
        let manager = SourceManager::with_sources(vec![Box::new(FixedSource::new(vec![
            record("새글", 2, "2026.02.01"),
            record("기존", 1, "2026.01.01"),
        ]))]);
        let merged = manager
            .run(&fetcher(), &store, &PipelineOptions::default())
            .await
            .unwrap();
        let titles: Vec<_> = merged.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["새글", "기존"]);
        assert_eq!(store.load().unwrap(), merged);
    }

    #[tokio::test]
    async fn failing_source_does_not_break_the_run() {
        let store = MemoryStore::new();
        let manager = SourceManager::with_sources(vec![
            Box::new(FixedSource::failing()),
            Box::new(FixedSource::new(vec![record("생존", 3, "2026.01.05")])),
        ]);
        let merged = manager
            .run(&fetcher(), &store, &PipelineOptions::default())
            .await
            .unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "생존");
    }

    #[tokio::test]
    async fn store_keeps_last_known_good_records_when_every_source_fails() {
        let store = MemoryStore::with_records(vec![record("기존", 1, "2026.01.01")]);
        let manager = SourceManager::with_sources(vec![Box::new(FixedSource::failing())]);
        let merged = manager
            .run(&fetcher(), &store, &PipelineOptions::default())
            .await
            .unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(store.load().unwrap()[0].title, "기존");
    }

    #[tokio::test]
    async fn cap_keeps_the_hundred_most_recent() {
        let records: Vec<ArticleRecord> = (0u32..150)
            .map(|i| record(&format!("기사 {i}"), 1000 + i, &format!("2026.01.{:02}", i % 28 + 1)))
            .collect();
        let store = MemoryStore::new();
        let manager =
            SourceManager::with_sources(vec![Box::new(FixedSource::new(records.clone()))]);
        let merged = manager
            .run(&fetcher(), &store, &PipelineOptions::default())
            .await
            .unwrap();
        assert_eq!(merged.len(), DEFAULT_LIMIT);
        // The kept records are exactly the 100 most recent by parsed date.
        let mut all_dates: Vec<_> = records
            .iter()
            .map(|r| wynd_core::dates::parse_display_date(&r.date))
            .collect();
        all_dates.sort_by_key(|d| std::cmp::Reverse(*d));
        let kept_dates: Vec<_> = merged
            .iter()
            .map(|r| wynd_core::dates::parse_display_date(&r.date))
            .collect();
        assert_eq!(kept_dates, all_dates[..DEFAULT_LIMIT]);
    }

    #[tokio::test]
    async fn repair_happens_against_the_persisted_set() {
        let store = MemoryStore::with_records(vec![ArticleRecord {
            url: "https://the-edit.co.kr/".to_string(),
            ..record("X", 0, "2026.01.01")
        }]);
        let manager = SourceManager::with_sources(vec![Box::new(FixedSource::new(vec![record(
            "X",
            1234,
            "2026.01.01",
        )]))]);
        let merged = manager
            .run(&fetcher(), &store, &PipelineOptions::default())
            .await
            .unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].url, "https://the-edit.co.kr/1234");
    }

    #[tokio::test]
    async fn gallery_page_is_rendered_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("ai-articles.html");
        let store = MemoryStore::new();
        let manager = SourceManager::with_sources(vec![Box::new(FixedSource::new(vec![
            record("AI 기사", 7, "2026.01.05"),
        ]))]);
        let options = PipelineOptions {
            page_path: Some(page.clone()),
            ..Default::default()
        };
        manager.run(&fetcher(), &store, &options).await.unwrap();
        let html = std::fs::read_to_string(&page).unwrap();
        assert!(html.contains("AI 기사"));
    }
}
