use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::info;
use wynd_core::dates::today_display;
use wynd_core::filter::{matches_keywords, AI_KEYWORDS};
use wynd_core::text::clip_description;
use wynd_core::urls::UrlRule;
use wynd_core::{ArticleRecord, Result};

use super::Source;
use crate::fetcher::Fetcher;
use crate::rules::{first_capture, window};

const ROOT: &str = "https://the-edit.co.kr/";
const FALLBACK_AUTHOR: &str = "디에디트";

lazy_static! {
    // Anchor variants in priority order: absolute with text, protocol-relative
    // with text, bare href trailed by a card heading.
    static ref LINK_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"(?i)<a[^>]*href="(https://the-edit\.co\.kr/\d+)"[^>]*>([^<]+)</a>"#).unwrap(),
        Regex::new(r#"(?i)<a[^>]*href="(//the-edit\.co\.kr/\d+)"[^>]*>([^<]+)</a>"#).unwrap(),
        Regex::new(r#"(?is)href="(https://the-edit\.co\.kr/\d+)"[^>]*>.{0,500}?<h[23][^>]*>([^<]+)</h[23]>"#).unwrap(),
    ];

    static ref DETAIL_SHAPE: Regex = Regex::new(r"/\d+$").unwrap();

    // Thumbnail sources: lazy-loaded <img> inside the card anchor, a
    // wp-content upload path near the href, a CSS background image.
    static ref IMAGE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"(?is)<a[^>]*href="(https://the-edit\.co\.kr/\d+)"[^>]*>.*?<img[^>]*(?:data-lazy-src|data-src|src)="([^"]+)""#).unwrap(),
        Regex::new(r#"(?is)href="(https://the-edit\.co\.kr/\d+)"[^>]*>.*?wp-content/uploads/([^"'\s]+\.(?:jpg|jpeg|png|webp))"#).unwrap(),
        Regex::new(r#"(?is)href="(https://the-edit\.co\.kr/\d+)"[^>]*>.*?background-image:\s*url\(["']?([^"')]+\.(?:jpg|jpeg|png|webp))["']?\)"#).unwrap(),
    ];

    static ref DATE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(\d{4}\.\s*\d{1,2}\.\s*\d{1,2})").unwrap(),
        Regex::new(r"(\d{4}-\d{2}-\d{2})").unwrap(),
        Regex::new(r"(?i)<time[^>]*>([^<]+)</time>").unwrap(),
        Regex::new(r#"(?i)datetime="([^"]+)""#).unwrap(),
    ];

    static ref AUTHOR_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"(?i)<p[^>]*class="[^"]*author[^"]*"[^>]*>([^<]+)</p>"#).unwrap(),
        Regex::new(r#"(?i)<span[^>]*class="[^"]*author[^"]*"[^>]*>([^<]+)</span>"#).unwrap(),
        Regex::new(r"(?i)by\s+([^<\n]+)").unwrap(),
    ];

    static ref EXCERPT_PATTERN: Regex =
        Regex::new(r#"(?i)<p[^>]*class="[^"]*excerpt[^"]*"[^>]*>([^<]+)</p>"#).unwrap();
    static ref NEARBY_IMAGE: Regex =
        Regex::new(r#"(?i)<img[^>]*(?:data-lazy-src|data-src|src)="([^"]+\.(?:jpg|jpeg|png|webp))"[^>]*>"#).unwrap();
    static ref UPLOADS_IMAGE: Regex =
        Regex::new(r#"(?i)wp-content/uploads/[^"'\s]+\.(?:jpg|jpeg|png|webp)"#).unwrap();
    static ref IMAGE_EXT: Regex = Regex::new(r"(?i)\.(jpg|jpeg|png|webp)").unwrap();
}

/// The magazine site. Detail pages live at `https://the-edit.co.kr/<id>`;
/// the keyword filter runs inline on anchor titles.
pub struct TheEdit {
    rule: UrlRule,
}

impl TheEdit {
    pub fn new() -> Self {
        Self {
            rule: UrlRule::new(ROOT).with_shape(r"/\d+$"),
        }
    }

    /// Extracts candidate records from a listing page.
    pub fn extract(&self, html: &str) -> Vec<ArticleRecord> {
        let images = image_map(html);
        let mut seen: HashSet<String> = HashSet::new();
        let mut records = Vec::new();

        for pattern in LINK_PATTERNS.iter() {
            for caps in pattern.captures_iter(html) {
                let anchor_at = caps.get(0).unwrap().start();
                let url = normalize_url(caps.get(1).unwrap().as_str());
                let title = caps
                    .get(2)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default();

                if title.is_empty() || !DETAIL_SHAPE.is_match(&url) {
                    continue;
                }
                if !matches_keywords(&title, AI_KEYWORDS) || seen.contains(&url) {
                    continue;
                }
                seen.insert(url.clone());

                let context = window(html, anchor_at, 1000, 1000);
                let date = extract_date(context).unwrap_or_else(today_display);
                let author = extract_author(context);
                let description = extract_description(html, anchor_at, &url, &title);
                let thumbnail = images
                    .get(&url)
                    .cloned()
                    .or_else(|| nearby_image(html, anchor_at))
                    .unwrap_or_default();

                records.push(ArticleRecord {
                    title,
                    url,
                    description,
                    thumbnail,
                    author,
                    date,
                    category: Some("TECH".to_string()),
                });
            }
        }
        records
    }
}

impl Default for TheEdit {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for TheEdit {
    fn name(&self) -> &str {
        "The Edit"
    }

    fn url_rule(&self) -> &UrlRule {
        &self.rule
    }

    async fn collect(&self, fetcher: &Fetcher) -> Result<Vec<ArticleRecord>> {
        let html = fetcher.fetch_text(ROOT).await?;
        let records = self.extract(&html);
        info!(count = records.len(), "extracted AI articles from The Edit");
        Ok(records)
    }
}

fn normalize_url(raw: &str) -> String {
    if let Some(rest) = raw.strip_prefix("//") {
        format!("https://{rest}")
    } else if raw.starts_with('/') {
        format!("https://the-edit.co.kr{raw}")
    } else {
        raw.to_string()
    }
}

fn extract_date(context: &str) -> Option<String> {
    first_capture(&DATE_PATTERNS, context).map(|raw| {
        raw.chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .replace('-', ".")
    })
}

fn extract_author(context: &str) -> String {
    first_capture(&AUTHOR_PATTERNS, context).unwrap_or_else(|| FALLBACK_AUTHOR.to_string())
}

fn extract_description(html: &str, anchor_at: usize, url: &str, title: &str) -> String {
    let forward = window(html, anchor_at, 0, 1500);
    let escaped = regex::escape(url);
    let adjacent = [
        format!(r#"(?i)href="{escaped}"[^>]*>[^<]+</a>\s*<p[^>]*>([^<]+)</p>"#),
        format!(r#"(?i)href="{escaped}"[^>]*>[^<]+</a>\s*<div[^>]*>([^<]+)</div>"#),
    ];
    let description = adjacent
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .find_map(|pattern| {
            pattern
                .captures(forward)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
        })
        .or_else(|| {
            EXCERPT_PATTERN
                .captures(forward)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
        });

    match description {
        Some(text) if !text.is_empty() => clip_description(&text),
        _ => title.to_string(),
    }
}

fn nearby_image(html: &str, anchor_at: usize) -> Option<String> {
    let near = window(html, anchor_at, 500, 500);
    if let Some(caps) = NEARBY_IMAGE.captures(near) {
        return caps.get(1).map(|m| absolutize(m.as_str()));
    }
    let wide = window(html, anchor_at, 1000, 1000);
    UPLOADS_IMAGE
        .find(wide)
        .map(|m| format!("https://the-edit.co.kr/{}", m.as_str()))
}

fn image_map(html: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for pattern in IMAGE_PATTERNS.iter() {
        for caps in pattern.captures_iter(html) {
            let (Some(url), Some(raw)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let raw = raw.as_str();
            if raw.starts_with("data:") || raw.contains("placeholder") || raw.contains("logo") {
                continue;
            }
            let image = absolutize(raw);
            if IMAGE_EXT.is_match(&image) && !map.contains_key(url.as_str()) {
                map.insert(url.as_str().to_string(), image);
            }
        }
    }
    map
}

fn absolutize(path: &str) -> String {
    if path.starts_with("http") {
        path.to_string()
    } else if path.starts_with('/') {
        format!("https://the-edit.co.kr{path}")
    } else if path.contains("wp-content") {
        format!("https://the-edit.co.kr/{path}")
    } else {
        format!("https://the-edit.co.kr/wp-content/uploads/{path}")
    }
}
