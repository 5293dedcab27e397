use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use tracing::{debug, warn};
use url::Url;
use wynd_core::Result;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_FEED: &str = "application/rss+xml, application/xml, text/xml, */*";
const ACCEPT_LANG: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";

/// Spaces out successive requests. The first request goes straight through,
/// every later one waits the configured delay first.
pub struct Pacer {
    delay: Duration,
    armed: AtomicBool,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            armed: AtomicBool::new(false),
        }
    }

    pub async fn pause(&self) {
        if self.armed.swap(true, Ordering::Relaxed) && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Browser-mimicking HTTP client. Reads the whole body as text, keeps the
/// client's default redirect handling, adds no retry and no timeout; callers
/// that need resilience catch the error and move on.
pub struct Fetcher {
    client: reqwest::Client,
    pacer: Pacer,
    dump_dir: Option<PathBuf>,
}

impl Fetcher {
    pub fn new(delay: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANG));
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            pacer: Pacer::new(delay),
            dump_dir: None,
        })
    }

    /// Saves every fetched body under `dir` for offline inspection.
    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = Some(dir.into());
        self
    }

    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        self.request(url, None).await
    }

    pub async fn fetch_feed(&self, url: &str) -> Result<String> {
        self.request(url, Some(ACCEPT_FEED)).await
    }

    async fn request(&self, url: &str, accept: Option<&str>) -> Result<String> {
        self.pacer.pause().await;
        debug!(url, "GET");
        let mut request = self.client.get(url);
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }
        let body = request.send().await?.text().await?;
        debug!(url, bytes = body.len(), "body received");
        if self.dump_dir.is_some() {
            self.dump(url, &body);
        }
        Ok(body)
    }

    fn dump(&self, url: &str, body: &str) {
        let Some(dir) = &self.dump_dir else { return };
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "page".to_string());
        let path = dir.join(format!("{host}-raw.html"));
        if let Err(e) = std::fs::create_dir_all(dir).and_then(|_| std::fs::write(&path, body)) {
            warn!(path = %path.display(), error = %e, "could not dump raw body");
        }
    }
}
