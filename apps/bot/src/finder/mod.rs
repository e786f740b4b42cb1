//! Vacancy finder: collects product-management postings from hh.ru and
//! career.habr.com (optionally employer career sites and Avito), removes
//! duplicate URLs, applies the salary/experience filter and caps the result.

pub mod classify;
pub mod employers;
pub mod habr;
pub mod hh;

use std::collections::HashSet;
use std::fmt::Write as _;
use std::time::Duration;

use reqwest::Client;
use scraper::{ElementRef, Selector};
use tracing::info;

use crate::config::FinderSettings;
use crate::errors::AppError;
use crate::filter::VacancyFilter;
use crate::models::Vacancy;

use self::habr::HabrClient;
use self::hh::HhClient;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fixed delays between requests to the same site and between sources.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    pub between_pages: Duration,
    pub between_sources: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            between_pages: Duration::from_millis(500),
            between_sources: Duration::from_secs(1),
        }
    }
}

impl Pacing {
    pub fn none() -> Self {
        Self {
            between_pages: Duration::ZERO,
            between_sources: Duration::ZERO,
        }
    }
}

/// Browser-like HTTP client shared by every scraper.
pub fn http_client() -> Result<Client, AppError> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

pub struct VacancyFinder {
    hh: HhClient,
    habr: HabrClient,
    html: Client,
    settings: FinderSettings,
    pacing: Pacing,
    extra_sources: bool,
}

impl VacancyFinder {
    pub fn new(hh: HhClient, habr: HabrClient, html: Client, settings: FinderSettings) -> Self {
        if let Some(min) = settings.min_salary {
            info!("Salary filter: from {min}");
        }
        if let Some(years) = settings.min_experience_years {
            info!("Experience filter: from {years} years");
        }
        info!("Result cap: {}", settings.max_vacancies);

        Self {
            hh,
            habr,
            html,
            settings,
            pacing: Pacing::default(),
            extra_sources: false,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Also query employer career sites and Avito.
    pub fn with_extra_sources(mut self, enabled: bool) -> Self {
        self.extra_sources = enabled;
        self
    }

    pub async fn find_all(&self) -> Vec<Vacancy> {
        info!(
            "Searching product manager postings on hh.ru and career.habr.com (cap {})",
            self.settings.max_vacancies
        );
        let mut all = self
            .hh
            .search_product_managers(self.settings.max_vacancies, self.pacing.between_pages)
            .await;

        tokio::time::sleep(self.pacing.between_sources).await;
        all.extend(self.habr.search_product_managers(self.settings.max_vacancies).await);

        if self.extra_sources {
            for site in &employers::EMPLOYERS {
                tokio::time::sleep(self.pacing.between_sources).await;
                all.extend(employers::search_employer(&self.hh, &self.html, site).await);
            }
            tokio::time::sleep(self.pacing.between_sources).await;
            all.extend(employers::search_avito(&self.html).await);
        }

        info!("Collected {} postings in total", all.len());
        let unique = dedup_by_url(all);

        let filter = VacancyFilter::from(&self.settings);
        let (mut kept, _) = filter.apply(unique);
        if filter.is_active() {
            let hh_count = kept.iter().filter(|v| v.source == "hh.ru").count();
            let habr_count = kept.iter().filter(|v| v.source == "habr.com").count();
            info!(
                "{} postings passed the filter (hh.ru: {hh_count}, career.habr.com: {habr_count})",
                kept.len()
            );
        }

        kept.truncate(self.settings.max_vacancies);
        info!("Returning {} postings", kept.len());
        kept
    }

    /// hh.ru then Habr results for a user's own position, unfiltered.
    pub async fn search_for_position(&self, position: &str) -> Vec<Vacancy> {
        let mut found = self.hh.search_position(position).await;
        found.extend(self.habr.search_position(position).await);
        found
    }

    pub fn hh(&self) -> &HhClient {
        &self.hh
    }
}

/// Keeps the first posting for every URL, preserving order.
pub fn dedup_by_url(vacancies: Vec<Vacancy>) -> Vec<Vacancy> {
    let before = vacancies.len();
    let mut seen = HashSet::new();
    let unique: Vec<Vacancy> = vacancies
        .into_iter()
        .filter(|v| seen.insert(v.url.clone()))
        .collect();
    if unique.len() < before {
        info!("{} postings left after removing duplicates", unique.len());
    }
    unique
}

/// Numbered console listing of the finder's result.
pub fn render_listing(vacancies: &[Vacancy]) -> String {
    if vacancies.is_empty() {
        return "\n❌ Вакансии не найдены\n".to_string();
    }

    let rule = "-".repeat(80);
    let mut out = format!("\n✅ Найдено {} вакансий:\n\n{}\n", vacancies.len(), "=".repeat(80));
    for (i, v) in vacancies.iter().enumerate() {
        let _ = writeln!(out, "\n{}. {}", i + 1, v.title);
        let _ = writeln!(out, "   Компания: {}", v.company);
        let _ = writeln!(out, "   Локация: {}", v.location);
        let _ = writeln!(out, "   Зарплата: {}", v.salary);
        let _ = writeln!(out, "   Источник: {}", v.source);
        let _ = writeln!(out, "   Ссылка: {}", v.url);
        let _ = writeln!(out, "{rule}");
    }
    out
}

pub(crate) fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::Extraction(format!("invalid selector '{css}': {e:?}")))
}

/// Element text with runs of whitespace collapsed.
pub(crate) fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn absolute_url(base: &str, href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{base}{href}")
    }
}
