pub mod fetcher;
pub mod manager;
pub mod rules;
pub mod sources;

pub use fetcher::Fetcher;
pub use manager::{PipelineOptions, SourceManager};
pub use sources::Source;
