use async_trait::async_trait;
use chrono::{DateTime, Local};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::info;
use wynd_core::dates::{to_display, today_display};
use wynd_core::filter::{matches_keywords, AI_KEYWORDS};
use wynd_core::text::{clip_description, decode_entities, strip_tags, DESCRIPTION_MAX_CHARS};
use wynd_core::urls::UrlRule;
use wynd_core::{ArticleRecord, Result};

use super::Source;
use crate::fetcher::Fetcher;

const FEED_URL: &str = "https://cdn.aitimes.com/rss/gn_rss_allArticle.xml";
const ROOT: &str = "https://www.aitimes.com/";
const FEED_AUTHOR: &str = "AI타임스";
const MAX_ITEMS: usize = 50;
// Feeds that ship whole article bodies get cut back to the summary length
// with a pointer at the original; only the excerpt is ever republished.
const SUMMARY_HARD_LIMIT: usize = 500;
const SEE_ORIGINAL: &str = "... (원문 보기)";

lazy_static! {
    static ref ITEM: Regex = Regex::new(r"(?is)<item[^>]*>(.*?)</item>").unwrap();
    static ref TITLE_CDATA: Regex =
        Regex::new(r"(?is)<title[^>]*><!\[CDATA\[(.*?)\]\]></title>").unwrap();
    static ref TITLE_PLAIN: Regex = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();
    static ref LINK_PLAIN: Regex = Regex::new(r"(?is)<link[^>]*>(.*?)</link>").unwrap();
    static ref LINK_CDATA: Regex =
        Regex::new(r"(?is)<link[^>]*><!\[CDATA\[(.*?)\]\]></link>").unwrap();
    static ref DESC_CDATA: Regex =
        Regex::new(r"(?is)<description[^>]*><!\[CDATA\[(.*?)\]\]></description>").unwrap();
    static ref DESC_PLAIN: Regex =
        Regex::new(r"(?is)<description[^>]*>(.*?)</description>").unwrap();
    static ref PUB_DATE: Regex = Regex::new(r"(?is)<pubDate[^>]*>(.*?)</pubDate>").unwrap();
    static ref DC_DATE: Regex = Regex::new(r"(?is)<dc:date[^>]*>(.*?)</dc:date>").unwrap();
    static ref ENCLOSURE: Regex = Regex::new(r#"(?i)<enclosure[^>]*url="([^"]*)""#).unwrap();
    static ref MEDIA_CONTENT: Regex = Regex::new(r#"(?i)<media:content[^>]*url="([^"]*)""#).unwrap();
    static ref IMAGE_TAG: Regex = Regex::new(r#"(?i)<image[^>]*url="([^"]*)""#).unwrap();
    static ref IMG_TAG: Regex = Regex::new(r#"(?i)<img[^>]*src="([^"]*)""#).unwrap();
}

/// The news feed. Items arrive as RSS/XML rather than listing markup, and the
/// keyword filter runs as an explicit post-filter over title and summary.
pub struct AiTimes {
    rule: UrlRule,
}

impl AiTimes {
    pub fn new() -> Self {
        // Feed links have no single detail shape; only the root is rejected.
        Self {
            rule: UrlRule::new(ROOT),
        }
    }

    /// Parses `<item>` blocks, stopping after [`MAX_ITEMS`] regardless of
    /// document length.
    pub fn extract(&self, xml: &str) -> Vec<ArticleRecord> {
        let mut items = Vec::new();
        for caps in ITEM.captures_iter(xml) {
            if items.len() >= MAX_ITEMS {
                break;
            }
            let body = caps.get(1).unwrap().as_str();

            let title = capture(&TITLE_CDATA, body)
                .or_else(|| capture(&TITLE_PLAIN, body))
                .map(|raw| decode_entities(&raw))
                .unwrap_or_default();
            let link = capture(&LINK_PLAIN, body)
                .or_else(|| capture(&LINK_CDATA, body))
                .unwrap_or_default();
            if title.is_empty() || link.is_empty() {
                continue;
            }

            items.push(ArticleRecord {
                description: summary(body, &title),
                date: pub_date(body).unwrap_or_else(today_display),
                thumbnail: thumbnail(body),
                author: FEED_AUTHOR.to_string(),
                title,
                url: link,
                category: None,
            });
        }
        items
    }
}

impl Default for AiTimes {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for AiTimes {
    fn name(&self) -> &str {
        "AI타임스"
    }

    fn url_rule(&self) -> &UrlRule {
        &self.rule
    }

    async fn collect(&self, fetcher: &Fetcher) -> Result<Vec<ArticleRecord>> {
        let xml = fetcher.fetch_feed(FEED_URL).await?;
        let records = filter_ai(self.extract(&xml));
        info!(count = records.len(), "extracted AI articles from the AI타임스 feed");
        Ok(records)
    }
}

/// Keeps items whose title or summary mentions a configured keyword.
fn filter_ai(records: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
    records
        .into_iter()
        .filter(|record| {
            matches_keywords(&record.title, AI_KEYWORDS)
                || matches_keywords(&record.description, AI_KEYWORDS)
        })
        .collect()
}

fn summary(body: &str, title: &str) -> String {
    let raw = capture(&DESC_CDATA, body)
        .or_else(|| capture(&DESC_PLAIN, body))
        .unwrap_or_default();
    let text = decode_entities(&strip_tags(&raw)).trim().to_string();
    if text.is_empty() {
        return format!("{title} - AI 관련 기사");
    }
    if text.chars().count() > SUMMARY_HARD_LIMIT {
        let head: String = text.chars().take(DESCRIPTION_MAX_CHARS).collect();
        return format!("{head}{SEE_ORIGINAL}");
    }
    clip_description(&text)
}

fn pub_date(body: &str) -> Option<String> {
    let raw = capture(&PUB_DATE, body).or_else(|| capture(&DC_DATE, body))?;
    match DateTime::parse_from_rfc2822(&raw) {
        Ok(parsed) => Some(to_display(parsed.with_timezone(&Local).date_naive())),
        Err(_) => Some(raw.chars().take(10).collect()),
    }
}

fn thumbnail(body: &str) -> String {
    capture(&ENCLOSURE, body)
        .or_else(|| capture(&MEDIA_CONTENT, body))
        .or_else(|| capture(&IMAGE_TAG, body))
        .or_else(|| capture(&IMG_TAG, body))
        .unwrap_or_default()
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, link: &str, description: &str, extras: &str) -> String {
        format!(
            "<item><title><![CDATA[{title}]]></title><link>{link}</link>\
             <description><![CDATA[{description}]]></description>{extras}</item>"
        )
    }

    #[test]
    fn parses_cdata_items_with_entities() {
        let xml = format!(
            "<rss><channel>{}</channel></rss>",
            item(
                "AI 반도체 투자 &amp; 전망",
                "https://www.aitimes.com/news/articleView.html?idxno=101",
                "<p>올해 국내 &quot;AI&quot; 반도체 시장을&nbsp;정리했다.</p>",
                "<pubDate>Tue, 04 Aug 2026 09:30:00 +0900</pubDate>\
                 <enclosure url=\"https://cdn.aitimes.com/img/101.jpg\" length=\"1\" type=\"image/jpeg\" />",
            )
        );
        let records = AiTimes::new().extract(&xml);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.title, "AI 반도체 투자 & 전망");
        assert_eq!(record.url, "https://www.aitimes.com/news/articleView.html?idxno=101");
        assert_eq!(record.description, "올해 국내 \"AI\" 반도체 시장을 정리했다.");
        assert_eq!(record.thumbnail, "https://cdn.aitimes.com/img/101.jpg");
        assert_eq!(record.author, FEED_AUTHOR);
    }

    #[test]
    fn rfc2822_dates_become_display_dates() {
        let xml = item(
            "AI 뉴스",
            "https://www.aitimes.com/1",
            "요약",
            "<pubDate>Mon, 02 Feb 2026 21:00:00 +0900</pubDate>",
        );
        let records = AiTimes::new().extract(&xml);
        assert_eq!(records[0].date, "2026.02.02.");
    }

    #[test]
    fn unparseable_dates_keep_a_raw_prefix() {
        let xml = item(
            "AI 뉴스",
            "https://www.aitimes.com/1",
            "요약",
            "<pubDate>2026-02-02T21:00:00+09:00</pubDate>",
        );
        let records = AiTimes::new().extract(&xml);
        assert_eq!(records[0].date, "2026-02-02");
    }

    #[test]
    fn missing_title_or_link_drops_the_item() {
        let xml = concat!(
            "<item><title>무제</title></item>",
            "<item><link>https://www.aitimes.com/2</link></item>",
            "<item><title>AI 단신</title><link>https://www.aitimes.com/3</link></item>",
        );
        let records = AiTimes::new().extract(xml);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://www.aitimes.com/3");
    }

    #[test]
    fn extraction_stops_at_fifty_items() {
        let xml: String = (0..80)
            .map(|i| {
                item(
                    &format!("AI 기사 {i}"),
                    &format!("https://www.aitimes.com/{i}"),
                    "요약",
                    "",
                )
            })
            .collect();
        assert_eq!(AiTimes::new().extract(&xml).len(), MAX_ITEMS);
    }

    #[test]
    fn body_length_summaries_point_at_the_original() {
        let body = "기".repeat(600);
        let xml = item("AI 심층 기획", "https://www.aitimes.com/9", &body, "");
        let records = AiTimes::new().extract(&xml);
        let description = &records[0].description;
        assert!(description.ends_with(SEE_ORIGINAL));
        assert_eq!(
            description.chars().count(),
            DESCRIPTION_MAX_CHARS + SEE_ORIGINAL.chars().count()
        );
    }

    #[test]
    fn medium_summaries_get_the_plain_ellipsis() {
        let body = "사".repeat(200);
        let xml = item("AI 브리핑", "https://www.aitimes.com/10", &body, "");
        let records = AiTimes::new().extract(&xml);
        let description = &records[0].description;
        assert!(description.ends_with("..."));
        assert_eq!(description.chars().count(), DESCRIPTION_MAX_CHARS + 3);
    }

    #[test]
    fn empty_descriptions_fall_back_to_a_title_line() {
        let xml = "<item><title>AI 속보</title><link>https://www.aitimes.com/11</link></item>";
        let records = AiTimes::new().extract(xml);
        assert_eq!(records[0].description, "AI 속보 - AI 관련 기사");
    }

    #[test]
    fn keyword_post_filter_drops_unrelated_items() {
        let related = item("인공지능 정책 브리핑", "https://www.aitimes.com/20", "요약", "");
        let unrelated = item("오늘의 날씨", "https://www.aitimes.com/21", "맑음", "");
        let records = AiTimes::new().extract(&format!("{related}{unrelated}"));
        let kept = filter_ai(records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, "https://www.aitimes.com/20");
    }

    #[test]
    fn thumbnail_priority_prefers_enclosure() {
        let extras = "<media:content url=\"https://cdn.aitimes.com/media.jpg\" />\
                      <enclosure url=\"https://cdn.aitimes.com/enclosure.jpg\" />";
        let xml = item("AI 뉴스", "https://www.aitimes.com/30", "요약", extras);
        let records = AiTimes::new().extract(&xml);
        assert_eq!(records[0].thumbnail, "https://cdn.aitimes.com/enclosure.jpg");
    }
}
