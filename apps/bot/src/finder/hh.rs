//! hh.ru REST client: vacancy search, vacancy details and the
//! resume/negotiation endpoints used to relay an application.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::filter::format_salary;
use crate::finder::classify::is_product_manager_title;
use crate::models::vacancy::hh_vacancy_id;
use crate::models::{SalaryRange, Vacancy};

const HH_API_URL: &str = "https://api.hh.ru";
const PRODUCT_QUERY: &str = "Product Manager OR Продакт менеджер OR Product Owner OR Продакт оунер";
const PAGE_SIZE: usize = 100;
const MAX_PAGES: usize = 20;
const DESCRIPTION_LIMIT: usize = 2000;

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchPage {
    pub items: Vec<HhItem>,
    pub pages: usize,
    pub found: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HhItem {
    pub name: String,
    pub employer: Option<Named>,
    pub area: Option<Named>,
    pub salary: Option<SalaryRange>,
    pub experience: Option<HhExperience>,
    pub alternate_url: String,
    pub published_at: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Named {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HhExperience {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl HhItem {
    pub fn employer_name(&self) -> &str {
        self.employer
            .as_ref()
            .and_then(|e| e.name.as_deref())
            .unwrap_or_default()
    }

    pub fn into_vacancy(self, source: &str) -> Vacancy {
        let company = self.employer_name().to_string();
        let location = self
            .area
            .and_then(|a| a.name)
            .unwrap_or_default();
        let (experience, experience_name) = match self.experience {
            Some(e) => (e.id, e.name.unwrap_or_default()),
            None => (None, String::new()),
        };
        Vacancy {
            title: self.name,
            company,
            location,
            salary: format_salary(self.salary.as_ref()),
            salary_data: self.salary,
            experience,
            experience_name,
            url: self.alternate_url,
            source: source.to_string(),
            published: self.published_at,
            description: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VacancyDetails {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ResumeList {
    #[serde(default)]
    items: Vec<ResumeRef>,
}

#[derive(Debug, Deserialize)]
struct ResumeRef {
    id: String,
}

#[derive(Debug, Serialize)]
struct NegotiationRequest<'a> {
    vacancy_id: &'a str,
    resume_id: &'a str,
    message: &'a str,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct HhClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl HhClient {
    pub fn new(client: Client, access_token: Option<String>) -> Self {
        Self {
            client,
            base_url: HH_API_URL.to_string(),
            access_token,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn can_apply(&self) -> bool {
        self.access_token.is_some()
    }

    /// One page of `GET /vacancies`. Non-success statuses become `Upstream`.
    pub async fn search(&self, params: &[(&str, String)]) -> Result<SearchPage, AppError> {
        let response = self
            .client
            .get(format!("{}/vacancies", self.base_url))
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream {
                service: "hh.ru",
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json().await?)
    }

    /// Paginated product-management search over Moscow and Saint Petersburg.
    /// Collects up to `max(200, max_vacancies * 5)` postings so that the
    /// filter pass still has enough left.
    pub async fn search_product_managers(&self, max_vacancies: usize, pause: Duration) -> Vec<Vacancy> {
        let target = (max_vacancies * 5).max(200);
        let max_pages = (target / PAGE_SIZE + 1).min(MAX_PAGES);
        let mut vacancies = Vec::new();

        info!("Searching hh.ru: up to {max_pages} pages of {PAGE_SIZE}");

        for page in 0..max_pages {
            let params = [
                ("text", PRODUCT_QUERY.to_string()),
                ("area", "1".to_string()),
                ("area", "2".to_string()),
                ("per_page", PAGE_SIZE.to_string()),
                ("page", page.to_string()),
            ];

            let result = match self.search(&params).await {
                Ok(result) => result,
                Err(e) => {
                    warn!("hh.ru page {} failed: {e}", page + 1);
                    break;
                }
            };

            if result.items.is_empty() {
                debug!("hh.ru page {} is empty, stopping", page + 1);
                break;
            }

            let before = vacancies.len();
            vacancies.extend(
                result
                    .items
                    .into_iter()
                    .filter(|item| is_product_manager_title(&item.name))
                    .map(|item| item.into_vacancy("hh.ru")),
            );
            debug!(
                "hh.ru page {}: {} matching postings (total {})",
                page + 1,
                vacancies.len() - before,
                vacancies.len()
            );

            if vacancies.len() >= target {
                break;
            }
            if page + 1 >= result.pages {
                debug!("hh.ru results exhausted ({} found)", result.found);
                break;
            }
            if page + 1 < max_pages {
                tokio::time::sleep(pause).await;
            }
        }

        info!("Collected {} postings from hh.ru", vacancies.len());
        vacancies
    }

    /// Moscow postings for a free-text position from the last day, newest first.
    pub async fn search_position(&self, position: &str) -> Vec<Vacancy> {
        let params = [
            ("text", position.to_string()),
            ("area", "1".to_string()),
            ("per_page", "50".to_string()),
            ("page", "0".to_string()),
            ("order_by", "publication_time".to_string()),
            ("period", "1".to_string()),
        ];
        match self.search(&params).await {
            Ok(page) => page
                .items
                .into_iter()
                .map(|item| item.into_vacancy("hh.ru"))
                .collect(),
            Err(e) => {
                warn!("hh.ru search for '{position}' failed: {e}");
                Vec::new()
            }
        }
    }

    /// Plain-text description of an hh.ru posting, capped at 2000 characters.
    /// Returns `None` for other sources and on any failure.
    pub async fn vacancy_description(&self, url: &str) -> Option<String> {
        let id = hh_vacancy_id(url)?;
        let response = match self
            .client
            .get(format!("{}/vacancies/{id}", self.base_url))
            .send()
            .await
        {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!("hh.ru details for {id} returned {}", r.status());
                return None;
            }
            Err(e) => {
                warn!("hh.ru details for {id} failed: {e}");
                return None;
            }
        };

        match response.json::<VacancyDetails>().await {
            Ok(details) => Some(strip_html(&details.description, DESCRIPTION_LIMIT)),
            Err(e) => {
                warn!("hh.ru details for {id} could not be decoded: {e}");
                None
            }
        }
    }

    /// Sends an application for `vacancy_id` using the first resume on the
    /// account behind `HH_ACCESS_TOKEN`.
    pub async fn apply(&self, vacancy_id: &str, message: &str) -> Result<(), AppError> {
        let token = self
            .access_token
            .as_deref()
            .ok_or_else(|| AppError::Config("HH_ACCESS_TOKEN is not set".to_string()))?;

        let response = self
            .client
            .get(format!("{}/resumes", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream {
                service: "hh.ru",
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let resumes: ResumeList = response.json().await?;
        let resume_id = resumes
            .items
            .first()
            .map(|r| r.id.clone())
            .ok_or_else(|| AppError::NotFound("no resumes on the hh.ru account".to_string()))?;

        let response = self
            .client
            .post(format!("{}/negotiations", self.base_url))
            .bearer_auth(token)
            .json(&NegotiationRequest {
                vacancy_id,
                resume_id: &resume_id,
                message,
            })
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 200 || status.as_u16() == 201 {
            info!("Application sent for hh.ru vacancy {vacancy_id}");
            Ok(())
        } else {
            Err(AppError::Upstream {
                service: "hh.ru",
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            })
        }
    }
}

/// Drops tags, decodes entities and keeps at most `limit` characters.
pub fn strip_html(html: &str, limit: usize) -> String {
    let text = HTML_TAG.replace_all(html, "");
    html_escape::decode_html_entities(&text)
        .chars()
        .take(limit)
        .collect()
}
