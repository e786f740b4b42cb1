//! Today's postings found by the background scan, and which of them each
//! user has already received.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dates;
use crate::errors::AppError;
use crate::models::Vacancy;

#[derive(Debug, Default, Serialize, Deserialize)]
struct FreshFile {
    #[serde(default)]
    vacancies: Vec<Vacancy>,
    #[serde(default)]
    last_updated: String,
}

#[derive(Debug)]
pub struct FreshStore {
    path: PathBuf,
    vacancies: Vec<Vacancy>,
}

impl FreshStore {
    /// Postings from earlier days are dropped on load.
    pub fn load(path: impl Into<PathBuf>, today: NaiveDate) -> Self {
        let path = path.into();
        let file: FreshFile = super::load_json(&path);
        let vacancies = only_today(file.vacancies, today);
        info!("Loaded {} fresh postings for today", vacancies.len());
        Self { path, vacancies }
    }

    pub fn vacancies(&self) -> &[Vacancy] {
        &self.vacancies
    }

    pub fn replace(&mut self, vacancies: Vec<Vacancy>, today: NaiveDate) -> Result<(), AppError> {
        self.vacancies = only_today(vacancies, today);
        super::save_json(
            &self.path,
            &FreshFile {
                vacancies: self.vacancies.clone(),
                last_updated: dates::now_iso(),
            },
        )
    }

    /// Today's postings the user has not received yet, in scan order.
    pub fn unsent_for(&self, already_sent: &BTreeSet<String>, today: NaiveDate) -> Vec<Vacancy> {
        self.vacancies
            .iter()
            .filter(|v| !already_sent.contains(&v.url) && dates::is_from_today(&v.published, today))
            .cloned()
            .collect()
    }
}

fn only_today(vacancies: Vec<Vacancy>, today: NaiveDate) -> Vec<Vacancy> {
    vacancies
        .into_iter()
        .filter(|v| dates::is_from_today(&v.published, today))
        .collect()
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UserSentFile {
    #[serde(default)]
    user_sent: BTreeMap<i64, BTreeSet<String>>,
    #[serde(default)]
    last_updated: String,
}

#[derive(Debug)]
pub struct UserSentFresh {
    path: PathBuf,
    user_sent: BTreeMap<i64, BTreeSet<String>>,
}

impl UserSentFresh {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file: UserSentFile = super::load_json(&path);
        Self {
            path,
            user_sent: file.user_sent,
        }
    }

    pub fn sent_to(&self, user_id: i64) -> BTreeSet<String> {
        self.user_sent.get(&user_id).cloned().unwrap_or_default()
    }

    pub fn record<I>(&mut self, user_id: i64, urls: I) -> Result<(), AppError>
    where
        I: IntoIterator<Item = String>,
    {
        self.user_sent.entry(user_id).or_default().extend(urls);
        super::save_json(
            &self.path,
            &UserSentFile {
                user_sent: self.user_sent.clone(),
                last_updated: dates::now_iso(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn posting(url: &str, published: &str) -> Vacancy {
        Vacancy {
            url: url.to_string(),
            published: published.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_only_todays_postings_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.json");
        let today = day("2026-03-02");

        let mut store = FreshStore::load(&path, today);
        store
            .replace(
                vec![
                    posting("https://hh.ru/vacancy/1", "2026-03-02T09:00:00+0300"),
                    posting("https://hh.ru/vacancy/2", "2026-03-01T23:00:00+0300"),
                    posting("https://hh.ru/vacancy/3", ""),
                ],
                today,
            )
            .unwrap();
        assert_eq!(store.vacancies().len(), 1);

        let next_day = FreshStore::load(&path, day("2026-03-03"));
        assert!(next_day.vacancies().is_empty());
    }

    #[test]
    fn test_unsent_for_skips_delivered_urls() {
        let dir = tempfile::tempdir().unwrap();
        let today = day("2026-03-02");
        let mut store = FreshStore::load(dir.path().join("fresh.json"), today);
        store
            .replace(
                vec![
                    posting("https://hh.ru/vacancy/1", "2026-03-02T09:00:00+0300"),
                    posting("https://hh.ru/vacancy/2", "2026-03-02T10:00:00+0300"),
                ],
                today,
            )
            .unwrap();

        let mut sent = UserSentFresh::load(dir.path().join("user_sent.json"));
        sent.record(5, vec!["https://hh.ru/vacancy/1".to_string()]).unwrap();

        let left = store.unsent_for(&sent.sent_to(5), today);
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].url, "https://hh.ru/vacancy/2");
        assert_eq!(store.unsent_for(&sent.sent_to(6), today).len(), 2);

        let reloaded = UserSentFresh::load(dir.path().join("user_sent.json"));
        assert!(reloaded.sent_to(5).contains("https://hh.ru/vacancy/1"));
    }
}
