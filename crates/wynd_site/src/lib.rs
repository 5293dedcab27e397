pub mod content;
pub mod gallery;

pub use content::ContentSet;
pub use gallery::{render_gallery, write_gallery};
