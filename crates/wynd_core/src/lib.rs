pub mod dates;
pub mod error;
pub mod filter;
pub mod merge;
pub mod text;
pub mod types;
pub mod urls;

pub use error::Error;
pub use types::ArticleRecord;

pub type Result<T> = std::result::Result<T, Error>;
