use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};
use wynd_core::{ArticleRecord, Result};

/// Durable home of the aggregated article list. Every run rewrites the whole
/// list; there is no partial update.
pub trait ArticleStore: Send + Sync {
    fn load(&self) -> Result<Vec<ArticleRecord>>;
    fn save(&self, records: &[ArticleRecord]) -> Result<()>;
}

/// Pretty-printed JSON array on disk, with an optional second copy kept in
/// sync for tooling that expects the file at the repository root.
pub struct JsonStore {
    path: PathBuf,
    mirror: Option<PathBuf>,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mirror: None,
        }
    }

    pub fn with_mirror(mut self, mirror: impl Into<PathBuf>) -> Self {
        self.mirror = Some(mirror.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_pretty(path: &Path, json: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, json)?;
        Ok(())
    }
}

impl ArticleStore for JsonStore {
    fn load(&self) -> Result<Vec<ArticleRecord>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no existing store, starting empty");
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn save(&self, records: &[ArticleRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        Self::write_pretty(&self.path, &json)?;
        if let Some(mirror) = &self.mirror {
            Self::write_pretty(mirror, &json)?;
        }
        info!(count = records.len(), path = %self.path.display(), "article store saved");
        Ok(())
    }
}

/// In-memory store for pipeline tests.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ArticleRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ArticleRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

impl ArticleStore for MemoryStore {
    fn load(&self) -> Result<Vec<ArticleRecord>> {
        Ok(self.records.lock().unwrap().clone())
    }

    fn save(&self, records: &[ArticleRecord]) -> Result<()> {
        *self.records.lock().unwrap() = records.to_vec();
        Ok(())
    }
}
