use regex::Regex;
use url::Url;

/// Per-source URL acceptance rule: the configured root/home URL, an optional
/// detail-page shape, and substrings that always disqualify a link.
#[derive(Debug, Clone)]
pub struct UrlRule {
    root: String,
    host: Option<String>,
    detail_shape: Option<Regex>,
    deny: Vec<&'static str>,
}

impl UrlRule {
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        let host = Url::parse(&root)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string));
        Self {
            root,
            host,
            detail_shape: None,
            deny: Vec::new(),
        }
    }

    /// Requires detail URLs to match `pattern`, which must be a valid regex.
    pub fn with_shape(mut self, pattern: &str) -> Self {
        self.detail_shape = Some(Regex::new(pattern).unwrap());
        self
    }

    pub fn with_deny(mut self, deny: &[&'static str]) -> Self {
        self.deny = deny.to_vec();
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// True when `url` is the root/home page, trailing slash or not.
    pub fn is_root(&self, url: &str) -> bool {
        url.trim_end_matches('/') == self.root.trim_end_matches('/')
    }

    /// True when this rule's source owns `url` (same host).
    pub fn applies_to(&self, url: &str) -> bool {
        match (&self.host, Url::parse(url)) {
            (Some(host), Ok(parsed)) => parsed.host_str() == Some(host.as_str()),
            _ => false,
        }
    }

    /// True when `url` points at an article detail page of this source.
    pub fn is_valid_detail(&self, url: &str) -> bool {
        if url.is_empty() || self.is_root(url) {
            return false;
        }
        if self.deny.iter().any(|needle| url.contains(needle)) {
            return false;
        }
        match &self.detail_shape {
            Some(shape) => shape.is_match(url),
            None => true,
        }
    }
}

/// The URL rules of every configured source. A mixed record set is validated
/// record-by-record against the rule of the source each URL belongs to; URLs
/// no configured source claims pass through untouched.
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    rules: Vec<UrlRule>,
}

impl RuleBook {
    pub fn new(rules: Vec<UrlRule>) -> Self {
        Self { rules }
    }

    pub fn is_known_root(&self, url: &str) -> bool {
        self.rules.iter().any(|rule| rule.is_root(url))
    }

    pub fn is_valid(&self, url: &str) -> bool {
        if url.is_empty() || self.is_known_root(url) {
            return false;
        }
        match self.rules.iter().find(|rule| rule.applies_to(url)) {
            Some(rule) => rule.is_valid_detail(url),
            None => true,
        }
    }
}
