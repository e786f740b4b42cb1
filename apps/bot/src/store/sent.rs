use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dates;
use crate::errors::AppError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SentFile {
    #[serde(default)]
    urls: BTreeSet<String>,
    #[serde(default)]
    last_updated: String,
}

/// URLs already posted to the main chat.
#[derive(Debug)]
pub struct SentStore {
    path: PathBuf,
    urls: BTreeSet<String>,
}

impl SentStore {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file: SentFile = super::load_json(&path);
        Self {
            path,
            urls: file.urls,
        }
    }

    /// Matches with or without the query string and trailing slash.
    /// An empty URL is never considered sent.
    pub fn contains(&self, url: &str) -> bool {
        if url.is_empty() {
            return false;
        }
        let original = url.trim_end_matches('/');
        let normalized = url.split('?').next().unwrap_or(url).trim_end_matches('/');
        self.urls.contains(normalized) || self.urls.contains(original)
    }

    pub fn mark(&mut self, url: &str) -> Result<(), AppError> {
        self.urls.insert(url.to_string());
        self.persist()
    }

    /// Forgets everything and deletes the file.
    pub fn clear(&mut self) -> Result<(), AppError> {
        self.urls.clear();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        info!("Sent list cleared");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    fn persist(&self) -> Result<(), AppError> {
        super::save_json(
            &self.path,
            &SentFile {
                urls: self.urls.clone(),
                last_updated: dates::now_iso(),
            },
        )
    }
}
