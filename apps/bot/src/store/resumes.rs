use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::errors::AppError;

const PREFIX: &str = "resume_";

/// Resume texts kept as `resume_<user_id>.txt` files.
#[derive(Debug)]
pub struct ResumeStore {
    dir: PathBuf,
    resumes: HashMap<i64, String>,
}

impl ResumeStore {
    /// Reads every `resume_<id>[_...].txt` in `dir`, creating the directory
    /// when missing. Unreadable files are skipped.
    pub fn load_all(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        let mut resumes = HashMap::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            let Some(user_id) = user_id_from_file_name(&path) else {
                continue;
            };
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    resumes.insert(user_id, text);
                }
                Err(e) => warn!("Skipping resume file {}: {e}", path.display()),
            }
        }

        info!("Loaded {} resumes from {}", resumes.len(), dir.display());
        Ok(Self { dir, resumes })
    }

    pub fn get(&self, user_id: i64) -> Option<&str> {
        self.resumes.get(&user_id).map(String::as_str)
    }

    pub fn save(&mut self, user_id: i64, text: &str) -> Result<(), AppError> {
        std::fs::write(self.text_path(user_id), text)?;
        self.resumes.insert(user_id, text.to_string());
        Ok(())
    }

    /// Returns whether the user had a resume.
    pub fn remove(&mut self, user_id: i64) -> Result<bool, AppError> {
        if self.resumes.remove(&user_id).is_none() {
            return Ok(false);
        }
        let path = self.text_path(user_id);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(true)
    }

    /// Where an uploaded original is kept next to the extracted text.
    pub fn upload_path(&self, user_id: i64, file_name: &str) -> PathBuf {
        let name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("resume");
        self.dir.join(format!("{PREFIX}{user_id}_{name}"))
    }

    fn text_path(&self, user_id: i64) -> PathBuf {
        self.dir.join(format!("{PREFIX}{user_id}.txt"))
    }
}

fn user_id_from_file_name(path: &Path) -> Option<i64> {
    let stem = path.file_stem()?.to_str()?;
    let rest = stem.strip_prefix(PREFIX)?;
    rest.split('_').next()?.parse().ok()
}
