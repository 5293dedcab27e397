use std::fs;
use std::path::Path;

use tracing::info;
use wynd_core::ArticleRecord;

/// Hand-authored articles the landing page always carries, independent of
/// scraping. They have no detail URL; the renderer disables their links.
pub fn default_articles() -> Vec<ArticleRecord> {
    let entries = [
        (
            "미니멀리즘과 브루탈리즘의 조화",
            "현대 웹 디자인 트렌드에서 두 가지 상반된 스타일이 어떻게 융합되는지 살펴봅니다.",
            "2026.01.13",
            "design",
            "ui",
        ),
        (
            "브랜드 스토리텔링의 디지털 전환",
            "디지털 시대에 브랜드가 고객과 소통하는 방식의 변화와 새로운 마케팅 전략을 분석합니다.",
            "2026.01.12",
            "marketing",
            "brand-marketing",
        ),
        (
            "사용자 경험을 향상시키는 인터랙션 디자인",
            "직관적이고 매력적인 UI 인터랙션을 만드는 디자인 원칙과 최신 트렌드를 소개합니다.",
            "2026.01.10",
            "ui",
            "ui",
        ),
        (
            "데이터 기반 UX 디자인 방법론",
            "사용자 데이터를 분석하여 더 나은 사용자 경험을 설계하는 실전 가이드입니다.",
            "2026.01.09",
            "ux",
            "ux",
        ),
        (
            "디지털 브랜드 아이덴티티 구축 전략",
            "온라인에서 브랜드를 차별화하고 강력한 아이덴티티를 만드는 디자인 접근법을 다룹니다.",
            "2026.01.08",
            "brand",
            "brand-design",
        ),
    ];
    entries
        .into_iter()
        .map(|(title, description, date, author, category)| ArticleRecord {
            title: title.to_string(),
            url: String::new(),
            description: description.to_string(),
            thumbnail: String::new(),
            author: author.to_string(),
            date: date.to_string(),
            category: Some(category.to_string()),
        })
        .collect()
}

/// The landing page's article state: the fixed default list plus whatever the
/// scraping pipeline last persisted. Filtering and search run over this set
/// in memory; no server round-trip.
pub struct ContentSet {
    defaults: Vec<ArticleRecord>,
    scraped: Vec<ArticleRecord>,
}

impl ContentSet {
    pub fn new(scraped: Vec<ArticleRecord>) -> Self {
        Self {
            defaults: default_articles(),
            scraped,
        }
    }

    /// Reads the persisted store. A missing, unreadable, or malformed store
    /// degrades to the default articles alone; scraping problems never reach
    /// the visitor.
    pub fn load(path: &Path) -> Self {
        let scraped = fs::read_to_string(path)
            .ok()
            .and_then(|data| serde_json::from_str(&data).ok())
            .unwrap_or_default();
        let set = Self::new(scraped);
        info!(count = set.scraped.len(), "loaded scraped articles");
        set
    }

    /// Scraped (AI-tagged) records only.
    pub fn ai(&self) -> &[ArticleRecord] {
        &self.scraped
    }

    /// Defaults followed by scraped records.
    pub fn all(&self) -> Vec<&ArticleRecord> {
        self.defaults.iter().chain(self.scraped.iter()).collect()
    }

    /// Category tab behavior: `"ai"` shows the scraped set, `"all"` shows
    /// everything, any other tag matches records labeled with it.
    pub fn by_category(&self, category: &str) -> Vec<&ArticleRecord> {
        match category {
            "ai" => self.scraped.iter().collect(),
            "all" => self.all(),
            tag => self
                .all()
                .into_iter()
                .filter(|record| record.category_label() == tag)
                .collect(),
        }
    }

    /// Case-insensitive substring search over title, description, author and
    /// category. An empty term returns everything.
    pub fn search(&self, term: &str) -> Vec<&ArticleRecord> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.all();
        }
        self.all()
            .into_iter()
            .filter(|record| {
                record.title.to_lowercase().contains(&needle)
                    || record.description.to_lowercase().contains(&needle)
                    || record.author.to_lowercase().contains(&needle)
                    || record.category_label().to_lowercase().contains(&needle)
            })
            .collect()
    }
}
