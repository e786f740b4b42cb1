//! Salary and experience thresholds applied to scraped postings.
//!
//! A posting survives when it satisfies every configured threshold.
//! Salaries that are simply absent pass only when both thresholds are set,
//! so experience can still vouch for them.

pub mod experience;
pub mod salary;

use tracing::info;

use crate::config::FinderSettings;
use crate::models::{Vacancy, NOT_SPECIFIED};

pub use salary::{format_salary, parse_min_salary};

/// Why postings were dropped during the last `apply` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterStats {
    pub rejected_by_salary: usize,
    pub rejected_by_experience: usize,
    pub rejected_by_both: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VacancyFilter {
    pub min_salary: Option<u64>,
    pub min_experience_years: Option<u64>,
}

impl From<&FinderSettings> for VacancyFilter {
    fn from(settings: &FinderSettings) -> Self {
        Self {
            min_salary: settings.min_salary,
            min_experience_years: settings.min_experience_years,
        }
    }
}

impl VacancyFilter {
    pub fn is_active(&self) -> bool {
        self.min_salary.is_some() || self.min_experience_years.is_some()
    }

    fn allow_no_salary(&self) -> bool {
        self.min_salary.is_some() && self.min_experience_years.is_some()
    }

    pub fn matches_salary(&self, vacancy: &Vacancy, allow_no_salary: bool) -> bool {
        let Some(min) = self.min_salary else {
            return true;
        };

        if let Some(raw) = &vacancy.salary_data {
            if let Some(from) = raw.from {
                return from >= min;
            }
            if raw.to.is_some() {
                // an upper bound alone says nothing about the floor
                return false;
            }
        }

        let text = vacancy.salary.trim();
        let stated = !text.is_empty() && text != NOT_SPECIFIED;
        if stated {
            if let Some(parsed) = parse_min_salary(text) {
                return parsed >= min;
            }
        }

        if vacancy.salary_data.is_none() && !stated {
            return allow_no_salary;
        }
        false
    }

    /// hh.ru id first, then the experience label, then the description.
    pub fn matches_experience(&self, vacancy: &Vacancy) -> bool {
        let Some(min) = self.min_experience_years else {
            return false;
        };

        let from_id = vacancy
            .experience
            .as_deref()
            .and_then(experience::years_from_hh_id);
        let from_label = experience::parse_years(&vacancy.experience_name);
        let from_description = vacancy
            .description
            .as_deref()
            .and_then(experience::parse_years);

        [from_id, from_label, from_description]
            .into_iter()
            .flatten()
            .any(|years| years >= min)
    }

    pub fn apply(&self, vacancies: Vec<Vacancy>) -> (Vec<Vacancy>, FilterStats) {
        let mut stats = FilterStats::default();
        if !self.is_active() {
            return (vacancies, stats);
        }

        let allow_no_salary = self.allow_no_salary();
        let total = vacancies.len();
        let mut kept = Vec::with_capacity(total);

        for vacancy in vacancies {
            let salary_ok =
                self.min_salary.is_none() || self.matches_salary(&vacancy, allow_no_salary);
            let experience_ok =
                self.min_experience_years.is_none() || self.matches_experience(&vacancy);

            if !salary_ok {
                stats.rejected_by_salary += 1;
            }
            if !experience_ok {
                stats.rejected_by_experience += 1;
            }

            match (salary_ok, experience_ok) {
                (true, true) => kept.push(vacancy),
                (false, false) => stats.rejected_by_both += 1,
                _ => {}
            }
        }

        let rejected = total - kept.len();
        if rejected > 0 {
            info!(
                "Filtered out {rejected} of {total} postings (salary: {}, experience: {}, both: {})",
                stats.rejected_by_salary, stats.rejected_by_experience, stats.rejected_by_both
            );
        }

        (kept, stats)
    }
}
