pub mod store;

pub use store::{ArticleStore, JsonStore, MemoryStore};
