use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{Duration, Local};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info};
use wynd_core::dates::{to_display, today_display};
use wynd_core::filter::{matches_keywords, AI_KEYWORDS};
use wynd_core::text::{clip_description, decode_entities, strip_tags};
use wynd_core::urls::UrlRule;
use wynd_core::{ArticleRecord, Result};

use super::Source;
use crate::fetcher::Fetcher;
use crate::rules::window;

const ROOT: &str = "https://eopla.net/";
const FALLBACK_AUTHOR: &str = "이오플래닛";
const EXTRA_PAGES: std::ops::RangeInclusive<u32> = 2..=3;

lazy_static! {
    static ref LINK_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"(?i)<a[^>]*href="(https://eopla\.net/[^"]+)"[^>]*>"#).unwrap(),
        Regex::new(r#"(?i)href="(/[^"]+)"[^>]*>"#).unwrap(),
    ];

    // Static title fallbacks; href-anchored variants are built per link.
    static ref TITLE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?is)<h[1-6][^>]*>([^<]{10,200})</h[1-6]>").unwrap(),
        Regex::new(r#"(?is)<div[^>]*class="[^"]*title[^"]*"[^>]*>([^<]{10,200})</div>"#).unwrap(),
        Regex::new(r#"(?is)<span[^>]*class="[^"]*title[^"]*"[^>]*>([^<]{10,200})</span>"#).unwrap(),
        Regex::new(r"(?is)<a[^>]*>([^<]{10,200})</a>").unwrap(),
    ];

    // Relative phrasing ("N일 전") sits between the absolute shapes and the
    // markup-based shapes, matching the priority the listing markup needs.
    static ref DATE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(\d{4}\.\s*\d{1,2}\.\s*\d{1,2})").unwrap(),
        Regex::new(r"(\d{4}-\d{2}-\d{2})").unwrap(),
        Regex::new(r"(\d{1,2}\s*(?:일|시간|분)\s*전)").unwrap(),
        Regex::new(r"(?i)<time[^>]*>([^<]+)</time>").unwrap(),
        Regex::new(r#"(?i)datetime="([^"]+)""#).unwrap(),
    ];
}

const RELATIVE_INDEX: usize = 2;

lazy_static! {
    static ref AUTHOR_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"(?i)<div[^>]*class="[^"]*author[^"]*"[^>]*>([^<]+)</div>"#).unwrap(),
        Regex::new(r#"(?i)<span[^>]*class="[^"]*author[^"]*"[^>]*>([^<]+)</span>"#).unwrap(),
        Regex::new(r#"(?i)<p[^>]*class="[^"]*author[^"]*"[^>]*>([^<]+)</p>"#).unwrap(),
        Regex::new(r"@([A-Za-z0-9가-힣_]+)").unwrap(),
    ];

    static ref DESC_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"(?i)<p[^>]*class="[^"]*description[^"]*"[^>]*>([^<]+)</p>"#).unwrap(),
        Regex::new(r#"(?i)<div[^>]*class="[^"]*excerpt[^"]*"[^>]*>([^<]+)</div>"#).unwrap(),
        Regex::new(r"(?is)<p[^>]*>([^<]{20,150})</p>").unwrap(),
    ];

    static ref IMG_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"(?i)<img[^>]*(?:data-src|data-lazy-src|src)="([^"]+\.(?:jpg|jpeg|png|webp|gif))"[^>]*>"#).unwrap(),
        Regex::new(r#"(?i)background-image:\s*url\(["']?([^"')]+\.(?:jpg|jpeg|png|webp|gif))["']?\)"#).unwrap(),
        Regex::new(r#"(?i)<img[^>]*src="([^"]+)"[^>]*>"#).unwrap(),
        Regex::new(r#"(?i)url\(["']?([^"')]+\.(?:jpg|jpeg|png|webp|gif))["']?\)"#).unwrap(),
    ];

    static ref IMAGE_EXT: Regex = Regex::new(r"(?i)\.(jpg|jpeg|png|webp|gif)").unwrap();
}

const THUMBNAIL_EXCLUDE: [&str; 6] = ["data:", "logo", "icon", "profile_eo", "favicon", "avatar"];

/// The community blog. Card markup is loose, so every field is recovered from
/// a context window around each plausible link.
pub struct Eopla {
    rule: UrlRule,
}

impl Eopla {
    pub fn new() -> Self {
        Self {
            rule: UrlRule::new(ROOT)
                .with_shape(r"(/\d+$)|(/@)|(/[A-Za-z0-9-]+$)")
                .with_deny(&["#", "javascript:", "mailto:", "/login", "/signup", "/search"]),
        }
    }

    /// Extracts candidate records from a listing page.
    pub fn extract(&self, html: &str) -> Vec<ArticleRecord> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut records = Vec::new();

        for pattern in LINK_PATTERNS.iter() {
            for caps in pattern.captures_iter(html) {
                let anchor_at = caps.get(0).unwrap().start();
                let url = normalize_url(caps.get(1).unwrap().as_str());
                if !self.rule.is_valid_detail(&url) || seen.contains(&url) {
                    continue;
                }

                let context = window(html, anchor_at, 1000, 1500);
                let Some(title) = extract_title(context, &url) else {
                    continue;
                };
                if !matches_keywords(&title, AI_KEYWORDS) {
                    continue;
                }
                seen.insert(url.clone());

                let date = extract_date(context).unwrap_or_else(today_display);
                let author = extract_author(context);
                let description = extract_description(context, &title);
                let thumbnail = extract_thumbnail(window(html, anchor_at, 1500, 1500));

                records.push(ArticleRecord {
                    title,
                    url,
                    description,
                    thumbnail,
                    author,
                    date,
                    category: None,
                });
            }
        }
        records
    }
}

impl Default for Eopla {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for Eopla {
    fn name(&self) -> &str {
        "eopla"
    }

    fn url_rule(&self) -> &UrlRule {
        &self.rule
    }

    async fn collect(&self, fetcher: &Fetcher) -> Result<Vec<ArticleRecord>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut records = Vec::new();

        let html = fetcher.fetch_text(ROOT).await?;
        for record in self.extract(&html) {
            if seen.insert(record.url.clone()) {
                records.push(record);
            }
        }

        // Later listing pages are best-effort; records already gathered stay.
        for page in EXTRA_PAGES {
            let page_url = format!("{ROOT}?page={page}");
            match fetcher.fetch_text(&page_url).await {
                Ok(html) => {
                    for record in self.extract(&html) {
                        if seen.insert(record.url.clone()) {
                            records.push(record);
                        }
                    }
                }
                Err(e) => error!(page, error = %e, "failed to fetch extra eopla listing page"),
            }
        }

        info!(count = records.len(), "extracted AI articles from eopla");
        Ok(records)
    }
}

fn normalize_url(raw: &str) -> String {
    if raw.starts_with('/') {
        format!("https://eopla.net{raw}")
    } else if !raw.starts_with("http") {
        format!("https://eopla.net/{raw}")
    } else {
        raw.to_string()
    }
}

fn extract_title(context: &str, url: &str) -> Option<String> {
    let escaped = regex::escape(url);
    let anchored = [
        format!(r#"(?is)href="{escaped}"[^>]*>.{{0,200}}?([^<]{{10,200}})</a>"#),
        format!(r#"(?is)href="{escaped}"[^>]*>.{{0,500}}?<h[1-6][^>]*>([^<]+)</h[1-6]>"#),
    ];
    let candidates = anchored
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .filter_map(|pattern| capture(&pattern, context))
        .chain(
            TITLE_PATTERNS
                .iter()
                .filter_map(|pattern| capture(pattern, context)),
        );

    for candidate in candidates {
        let title = strip_tags(&candidate).trim().to_string();
        let len = title.chars().count();
        if len > 5 && len < 200 && !title.contains("http") {
            return Some(title);
        }
    }
    None
}

fn extract_date(context: &str) -> Option<String> {
    for (index, pattern) in DATE_PATTERNS.iter().enumerate() {
        let Some(raw) = capture(pattern, context) else {
            continue;
        };
        if index == RELATIVE_INDEX {
            return Some(resolve_relative(&raw));
        }
        return Some(
            raw.chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .replace('-', "."),
        );
    }
    None
}

/// Resolves "N일/시간/분 전" against the current clock.
fn resolve_relative(raw: &str) -> String {
    let amount: i64 = raw
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap_or(0);
    let now = Local::now();
    let resolved = if raw.contains('일') {
        now - Duration::days(amount)
    } else if raw.contains("시간") {
        now - Duration::hours(amount)
    } else {
        now - Duration::minutes(amount)
    };
    to_display(resolved.date_naive())
}

fn extract_author(context: &str) -> String {
    for pattern in AUTHOR_PATTERNS.iter() {
        if let Some(author) = capture(pattern, context) {
            let len = author.chars().count();
            if len > 1 && len < 50 {
                return author;
            }
        }
    }
    FALLBACK_AUTHOR.to_string()
}

fn extract_description(context: &str, title: &str) -> String {
    for pattern in DESC_PATTERNS.iter() {
        if let Some(description) = capture(pattern, context) {
            let len = description.chars().count();
            if len > 20 && len < 200 {
                return clip_description(&description);
            }
        }
    }
    title.to_string()
}

fn extract_thumbnail(context: &str) -> String {
    for pattern in IMG_PATTERNS.iter() {
        for caps in pattern.captures_iter(context) {
            let Some(m) = caps.get(1) else { continue };
            let raw = m.as_str();
            if THUMBNAIL_EXCLUDE.iter().any(|needle| raw.contains(needle)) {
                continue;
            }
            let image = absolutize(raw);
            if IMAGE_EXT.is_match(&image) {
                return decode_entities(&image);
            }
        }
    }
    String::new()
}

fn absolutize(path: &str) -> String {
    if path.starts_with("http") {
        path.to_string()
    } else if path.starts_with('/') {
        format!("https://eopla.net{path}")
    } else {
        format!("https://eopla.net/{path}")
    }
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}
