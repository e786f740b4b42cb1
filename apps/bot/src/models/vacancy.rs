use serde::{Deserialize, Serialize};

/// Placeholder used by every source when a field is unknown.
pub const NOT_SPECIFIED: &str = "Не указано";

/// Raw salary bounds as reported by hh.ru.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub from: Option<u64>,
    pub to: Option<u64>,
    pub currency: Option<String>,
}

/// A single scraped job posting. The URL is its identity.
///
/// The JSON shape matches the files written by earlier runs, so every
/// field is optional on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vacancy {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub salary_data: Option<SalaryRange>,
    /// hh.ru experience id (`noExperience`, `between1And3`, ...).
    pub experience: Option<String>,
    pub experience_name: String,
    pub url: String,
    pub source: String,
    pub published: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Vacancy {
    pub fn id(&self) -> String {
        vacancy_id(&self.url)
    }

    pub fn is_hh(&self) -> bool {
        self.url.contains("hh.ru")
    }
}

/// Short id used in callback data (Telegram caps it at 64 bytes).
/// hh.ru postings keep their numeric id, everything else gets an md5 prefix.
pub fn vacancy_id(url: &str) -> String {
    if let Some(hh_id) = hh_vacancy_id(url) {
        return hh_id.to_string();
    }
    let digest = format!("{:x}", md5::compute(url.as_bytes()));
    digest[..16].to_string()
}

/// Numeric id from an `hh.ru/vacancy/<id>` URL, query string stripped.
pub fn hh_vacancy_id(url: &str) -> Option<&str> {
    if !url.contains("hh.ru/vacancy/") {
        return None;
    }
    url.rsplit("/vacancy/")
        .next()
        .and_then(|tail| tail.split('?').next())
        .filter(|id| !id.is_empty())
}
