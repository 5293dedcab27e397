use async_trait::async_trait;
use wynd_core::urls::UrlRule;
use wynd_core::{ArticleRecord, Result};

use crate::fetcher::Fetcher;

pub mod aitimes;
pub mod eopla;
pub mod the_edit;

pub use aitimes::AiTimes;
pub use eopla::Eopla;
pub use the_edit::TheEdit;

/// One configured external site or feed with its own extraction rule set.
#[async_trait]
pub trait Source: Send + Sync {
    /// Display name of the source.
    fn name(&self) -> &str;

    /// URL acceptance rule for records belonging to this source.
    fn url_rule(&self) -> &UrlRule;

    /// Fetches the source's listing page(s) and extracts candidate records.
    /// Requests within one source run sequentially through the shared pacer.
    async fn collect(&self, fetcher: &Fetcher) -> Result<Vec<ArticleRecord>>;
}

/// Every source the pipeline aggregates, in fetch order.
pub fn all_sources() -> Vec<Box<dyn Source>> {
    vec![
        Box::new(TheEdit::new()),
        Box::new(Eopla::new()),
        Box::new(AiTimes::new()),
    ]
}
