//! Flat JSON files on local disk. Every change rewrites the whole file.
//! Missing or corrupt files load as empty state with a warning.

pub mod fresh;
pub mod resumes;
pub mod sent;
pub mod users;
pub mod vacancies;

use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::errors::AppError;

pub use fresh::{FreshStore, UserSentFresh};
pub use resumes::ResumeStore;
pub use sent::SentStore;
pub use users::UserStore;

pub(crate) fn load_json<T: DeserializeOwned + Default>(path: &Path) -> T {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
        Err(e) => {
            warn!("Could not read {}: {e}", path.display());
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Could not parse {}: {e}", path.display());
            T::default()
        }
    }
}

/// Pretty-printed, written to a sibling temp file and renamed into place.
pub(crate) fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), AppError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.write_all(b"\n")?;
    tmp.persist(path).map_err(|e| AppError::Io(e.error))?;
    Ok(())
}
