use serde::{Deserialize, Serialize};

/// A single aggregated article as persisted in the JSON store.
///
/// `url` is the record's identity: the store never holds two records with the
/// same detail-page URL, and a record without a resolvable detail URL is not
/// persisted at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub description: String,
    #[serde(default)]
    pub thumbnail: String,
    pub author: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ArticleRecord {
    /// Category tag for client-side filtering, `"all"` when untagged.
    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or("all")
    }
}
