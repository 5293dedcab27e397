use std::fs;
use std::path::Path;

use tracing::{info, warn};
use wynd_core::text::escape_html;
use wynd_core::urls::RuleBook;
use wynd_core::{ArticleRecord, Result};

const PAGE_TEMPLATE: &str = r#"<!doctype html>
<html lang="ko">
<head>
  <meta charset="UTF-8" />
  <link rel="icon" type="image/svg+xml" href="/vite.svg" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>WYND23 - AI Articles</title>
  <link rel="stylesheet" href="/page-style.css" />
  <style>
    .work-page { max-width: 1200px; margin: 0 auto; width: 100%; padding: 200px 40px 80px; }
    .work-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(320px, 1fr)); gap: 40px; margin-top: 60px; }
    .work-item { background: #fff; border-radius: 12px; overflow: hidden; cursor: pointer; text-decoration: none; display: block; color: inherit; border: 1px solid rgba(0, 0, 0, 0.1); }
    .work-item:hover { transform: translateY(-8px); box-shadow: 0 20px 40px rgba(0, 0, 0, 0.1); }
    .work-thumbnail { width: 100%; height: 200px; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); position: relative; overflow: hidden; }
    .work-thumbnail img { width: 100%; height: 100%; object-fit: cover; }
    .work-info { padding: 24px; }
    .work-type { font-size: 11px; font-weight: 600; text-transform: uppercase; letter-spacing: 1px; color: #666; margin-bottom: 8px; }
    .work-name { font-size: 20px; font-weight: 700; color: #000; margin-bottom: 12px; line-height: 1.4; }
    .work-description { font-size: 14px; color: #666; line-height: 1.6; margin-bottom: 12px; }
    .work-meta { display: flex; justify-content: space-between; align-items: center; font-size: 12px; color: #999; padding-top: 12px; border-top: 1px solid rgba(0, 0, 0, 0.1); }
    .work-author { font-weight: 500; }
    @media (max-width: 768px) {
      .work-page { padding: 200px 24px 60px; }
      .work-grid { grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); gap: 30px; }
    }
  </style>
</head>
<body class="white-page work-page">
  <canvas id="page-canvas"></canvas>

  <header id="fixed-header" class="fixed-header visible">
    <div class="header-logo" id="header-logo">WYND23</div>
    <nav class="header-nav">
      <a href="work.html" class="header-nav-item active">WORK</a>
      <a href="about.html" class="header-nav-item">ABOUT</a>
      <a href="contact.html" class="header-nav-item">CONTACT</a>
    </nav>
  </header>

  <div class="page-container white-theme">
    <div class="work-page">
      <div class="work-hero">
        <h1 class="work-main-title">AI Articles</h1>
        <p class="work-subtitle">디에디트와 이오플래닛에서 수집한 AI 관련 기사입니다. 클릭 시 원본 기사로 이동합니다.</p>
      </div>

      <div class="work-grid">
{{cards}}
      </div>
    </div>
  </div>

  <script type="module" src="/page-script.js"></script>
</body>
</html>
"#;

/// Renders the record list as a static card-grid page. Every interpolated
/// field is HTML-escaped; scraped text must never become markup. Records
/// whose URL fails validation get a disabled `#` link instead of pointing
/// visitors at a listing page.
pub fn render_gallery(records: &[ArticleRecord], rules: &RuleBook) -> String {
    let cards: String = records
        .iter()
        .map(|record| render_card(record, rules))
        .collect();
    PAGE_TEMPLATE.replace("{{cards}}", &cards)
}

fn render_card(record: &ArticleRecord, rules: &RuleBook) -> String {
    let title = escape_html(&record.title);
    let description = escape_html(&record.description);
    let author = escape_html(&record.author);
    let date = escape_html(&record.date);

    let (href, link_attrs) = if rules.is_valid(&record.url) {
        (
            escape_html(&record.url),
            r#" target="_blank" rel="noopener noreferrer""#,
        )
    } else {
        warn!(title = %record.title, url = %record.url, "rendering card with disabled link");
        ("#".to_string(), r#" onclick="return false;""#)
    };

    let thumbnail = if record.thumbnail.is_empty() {
        r#"            <div class="work-thumbnail"></div>"#.to_string()
    } else {
        format!(
            r#"            <div class="work-thumbnail">
              <img src="{src}" alt="{title}" />
            </div>"#,
            src = escape_html(&record.thumbnail),
            title = title,
        )
    };

    format!(
        r#"          <a href="{href}"{link_attrs} class="work-item">
{thumbnail}
            <div class="work-info">
              <div class="work-type">Article</div>
              <h3 class="work-name">{title}</h3>
              <p class="work-description">{description}</p>
              <div class="work-meta">
                <span class="work-author">by {author}</span>
                <span class="work-date">{date}</span>
              </div>
            </div>
          </a>
"#
    )
}

/// Renders and writes the gallery page, overwriting any previous copy.
pub fn write_gallery(path: &Path, records: &[ArticleRecord], rules: &RuleBook) -> Result<()> {
    let html = render_gallery(records, rules);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, html)?;
    info!(count = records.len(), path = %path.display(), "gallery page written");
    Ok(())
}
