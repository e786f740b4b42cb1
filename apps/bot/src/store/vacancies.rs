use std::path::Path;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::Vacancy;

/// The finder's output file. A missing file is an empty list.
pub fn load(path: &Path) -> Vec<Vacancy> {
    if !path.exists() {
        warn!("{} not found", path.display());
        return Vec::new();
    }
    super::load_json(path)
}

pub fn save(path: &Path, vacancies: &[Vacancy]) -> Result<(), AppError> {
    super::save_json(path, vacancies)?;
    info!("Saved {} postings to {}", vacancies.len(), path.display());
    Ok(())
}

pub fn find_by_id(path: &Path, id: &str) -> Option<Vacancy> {
    load(path).into_iter().find(|v| v.id() == id)
}
