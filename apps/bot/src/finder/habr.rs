//! career.habr.com listing scraper. Markup-dependent: if the card classes
//! change, searches quietly return nothing.

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use crate::dates;
use crate::errors::AppError;
use crate::finder::classify::is_product_manager_title;
use crate::finder::{absolute_url, element_text, selector};
use crate::models::{Vacancy, NOT_SPECIFIED};

const HABR_URL: &str = "https://career.habr.com";
const PRODUCT_QUERY: &str = "Product Manager Продакт менеджер";
const POSITION_CARD_LIMIT: usize = 20;

/// Fields of one `div.vacancy-card`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabrCard {
    pub title: String,
    pub href: String,
    pub company: Option<String>,
    pub meta: Option<String>,
    pub salary: Option<String>,
}

/// Parses at most `limit` cards; cards without a title link are skipped.
pub fn parse_cards(html: &str, limit: usize) -> Result<Vec<HabrCard>, AppError> {
    let document = Html::parse_document(html);
    let card_sel = selector("div.vacancy-card")?;
    let title_sel = selector("a.vacancy-card__title-link")?;
    let company_sel = selector("div.vacancy-card__company-title")?;
    let meta_sel = selector("div.vacancy-card__meta")?;
    let salary_sel = selector("div.vacancy-card__salary")?;

    let first_text = |card: &ElementRef, sel: &Selector| {
        card.select(sel)
            .next()
            .map(|e| element_text(&e))
            .filter(|t| !t.is_empty())
    };

    Ok(document
        .select(&card_sel)
        .take(limit)
        .filter_map(|card| {
            let link = card.select(&title_sel).next()?;
            Some(HabrCard {
                title: element_text(&link),
                href: link.value().attr("href").unwrap_or_default().to_string(),
                company: first_text(&card, &company_sel),
                meta: first_text(&card, &meta_sel),
                salary: first_text(&card, &salary_sel),
            })
        })
        .collect())
}

#[derive(Clone)]
pub struct HabrClient {
    client: Client,
    base_url: String,
}

impl HabrClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: HABR_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_listing(&self, query: &str) -> Result<String, AppError> {
        let response = self
            .client
            .get(format!("{}/vacancies", self.base_url))
            .query(&[("q", query), ("type", "all")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream {
                service: "career.habr.com",
                status: status.as_u16(),
                message: String::new(),
            });
        }
        Ok(response.text().await?)
    }

    /// Product-management cards from the general listing. Company, location
    /// and salary are not read here; only titles are classified.
    pub async fn search_product_managers(&self, max_vacancies: usize) -> Vec<Vacancy> {
        let card_limit = (max_vacancies * 5).max(50);
        let keep_limit = (max_vacancies * 3).max(30);

        let cards = match self.fetch_listing(PRODUCT_QUERY).await {
            Ok(html) => parse_cards(&html, card_limit),
            Err(e) => Err(e),
        };
        let cards = match cards {
            Ok(cards) => cards,
            Err(e) => {
                warn!("career.habr.com search failed: {e}");
                return Vec::new();
            }
        };

        let published = dates::now_iso();
        let vacancies: Vec<Vacancy> = cards
            .into_iter()
            .filter(|card| is_product_manager_title(&card.title))
            .take(keep_limit)
            .map(|card| Vacancy {
                title: card.title,
                company: NOT_SPECIFIED.to_string(),
                location: NOT_SPECIFIED.to_string(),
                salary: NOT_SPECIFIED.to_string(),
                url: absolute_url(&self.base_url, &card.href),
                source: "habr.com".to_string(),
                published: published.clone(),
                ..Default::default()
            })
            .collect();

        info!("Collected {} postings from career.habr.com", vacancies.len());
        vacancies
    }

    /// First cards for a free-text position, with whatever details the card shows.
    pub async fn search_position(&self, position: &str) -> Vec<Vacancy> {
        let cards = match self.fetch_listing(position).await {
            Ok(html) => parse_cards(&html, POSITION_CARD_LIMIT),
            Err(e) => Err(e),
        };
        match cards {
            Ok(cards) => cards
                .into_iter()
                .filter(|card| !card.title.is_empty() && !card.href.is_empty())
                .map(|card| Vacancy {
                    url: absolute_url(&self.base_url, &card.href),
                    title: card.title,
                    company: card.company.unwrap_or_default(),
                    location: card.meta.unwrap_or_default(),
                    salary: card.salary.unwrap_or_else(|| NOT_SPECIFIED.to_string()),
                    source: "career.habr.com".to_string(),
                    ..Default::default()
                })
                .collect(),
            Err(e) => {
                warn!("career.habr.com search for '{position}' failed: {e}");
                Vec::new()
            }
        }
    }
}
