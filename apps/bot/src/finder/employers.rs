//! Employer-specific sources: hh.ru searches narrowed to one company, with a
//! best-effort scrape of the company's own careers pages as a fallback, plus
//! the Avito job listing.

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::dates;
use crate::errors::AppError;
use crate::finder::classify::is_product_manager_title;
use crate::finder::hh::HhClient;
use crate::finder::{absolute_url, element_text, selector};
use crate::models::{Vacancy, NOT_SPECIFIED};

const EMPLOYER_LIMIT: usize = 5;
const AVITO_URL: &str = "https://www.avito.ru";
const AVITO_LIMIT: usize = 10;

/// One hh.ru query: free text plus an optional employer id.
#[derive(Debug, Clone, Copy)]
pub struct EmployerQuery {
    pub text: &'static str,
    pub employer_id: Option<&'static str>,
}

#[derive(Debug, Clone, Copy)]
pub struct EmployerSite {
    pub label: &'static str,
    pub hh_source: &'static str,
    pub hh_queries: &'static [EmployerQuery],
    /// Lower-case fragments one of which must appear in the hh.ru employer name.
    pub name_markers: &'static [&'static str],
    pub career_urls: &'static [&'static str],
    /// Appended to each careers URL before fetching.
    pub career_query: &'static str,
    pub link_host: &'static str,
    pub selectors: &'static [&'static str],
    pub company: &'static str,
    pub source: &'static str,
}

pub const SBER: EmployerSite = EmployerSite {
    label: "Сбер",
    hh_source: "hh.ru (Сбер)",
    hh_queries: &[
        EmployerQuery { text: "Product Manager Сбер", employer_id: None },
        EmployerQuery { text: "Продакт менеджер Сбербанк", employer_id: None },
        EmployerQuery { text: "Product Manager", employer_id: Some("3529") },
    ],
    name_markers: &["сбер", "sber", "сбербанк"],
    career_urls: &[
        "https://career.sber.ru/vacancies",
        "https://sberbank.ru/careers/vacancies",
        "https://www.sberbank.ru/careers/vacancies",
    ],
    career_query: "?query=Product Manager",
    link_host: "https://career.sber.ru",
    selectors: &["div.vacancy-item", "div.vacancy-card", "a.vacancy-link", "div[data-vacancy]"],
    company: "Сбер",
    source: "career.sber.ru",
};

pub const TINKOFF: EmployerSite = EmployerSite {
    label: "Т-Банк",
    hh_source: "hh.ru (Т-Банк)",
    hh_queries: &[
        EmployerQuery { text: "Product Manager Tinkoff", employer_id: None },
        EmployerQuery { text: "Продакт менеджер Тинькофф", employer_id: None },
        EmployerQuery { text: "Product Manager", employer_id: Some("78638") },
    ],
    name_markers: &["tinkoff", "тинькофф", "t-банк"],
    career_urls: &[
        "https://www.tinkoff.ru/career/vacancies/",
        "https://jobs.tinkoff.ru/",
        "https://www.tinkoff.ru/career/",
    ],
    career_query: "",
    link_host: "https://www.tinkoff.ru",
    selectors: &["div.vacancy", "div.vacancy-card", "a.vacancy-link", "div.job-item"],
    company: "Т-Банк (Tinkoff)",
    source: "tinkoff.ru",
};

pub const AVIASALES: EmployerSite = EmployerSite {
    label: "Aviasales",
    hh_source: "hh.ru (Aviasales)",
    hh_queries: &[
        EmployerQuery { text: "Product Manager Aviasales", employer_id: None },
        EmployerQuery { text: "Продакт менеджер Авиасейлс", employer_id: None },
        EmployerQuery { text: "Product Manager", employer_id: Some("1455") },
    ],
    name_markers: &["aviasales", "авиасейлс"],
    career_urls: &[
        "https://careers.aviasales.ru/",
        "https://www.aviasales.ru/jobs",
        "https://aviasales.ru/careers",
    ],
    career_query: "",
    link_host: "https://careers.aviasales.ru",
    selectors: &[
        "div.vacancy",
        "div.vacancy-card",
        "a.vacancy-link",
        "div.job-item",
        "div.position",
    ],
    company: "Aviasales",
    source: "aviasales.ru",
};

pub const EMPLOYERS: [EmployerSite; 3] = [SBER, TINKOFF, AVIASALES];

/// hh.ru first; the careers pages are only scraped when hh.ru found nothing.
pub async fn search_employer(hh: &HhClient, html: &Client, site: &EmployerSite) -> Vec<Vacancy> {
    info!("Searching {} postings", site.label);
    let found = search_employer_on_hh(hh, site).await;
    if !found.is_empty() {
        return found;
    }

    for base_url in site.career_urls {
        let url = format!("{base_url}{}", site.career_query);
        let body = match fetch_page(html, &url).await {
            Ok(body) => body,
            Err(e) => {
                debug!("{} careers page {url} unavailable: {e}", site.label);
                continue;
            }
        };
        match parse_career_page(&body, base_url, site) {
            Ok(found) if !found.is_empty() => return found,
            Ok(_) => {}
            Err(e) => warn!("{} careers page could not be parsed: {e}", site.label),
        }
    }
    Vec::new()
}

async fn search_employer_on_hh(hh: &HhClient, site: &EmployerSite) -> Vec<Vacancy> {
    let mut vacancies = Vec::new();
    for query in site.hh_queries {
        let mut params = vec![("text", query.text.to_string()), ("per_page", "10".to_string())];
        if let Some(id) = query.employer_id {
            params.push(("employer_id", id.to_string()));
        }

        let page = match hh.search(&params).await {
            Ok(page) => page,
            Err(e) => {
                warn!("hh.ru search for {} failed: {e}", site.label);
                continue;
            }
        };

        for item in page.items {
            let employer = item.employer_name().to_lowercase();
            if is_product_manager_title(&item.name)
                && site.name_markers.iter().any(|m| employer.contains(m))
            {
                vacancies.push(item.into_vacancy(site.hh_source));
                if vacancies.len() >= EMPLOYER_LIMIT {
                    break;
                }
            }
        }
        if !vacancies.is_empty() {
            break;
        }
    }
    vacancies
}

/// Tries each candidate selector in turn and keeps the first that yields
/// product-management titles.
pub fn parse_career_page(
    html: &str,
    base_url: &str,
    site: &EmployerSite,
) -> Result<Vec<Vacancy>, AppError> {
    let document = Html::parse_document(html);
    let titled = selector(
        "h2[class*='title'], h2[class*='name'], h3[class*='title'], h3[class*='name'], \
         a[class*='title'], a[class*='name'], span[class*='title'], span[class*='name']",
    )?;
    let heading = selector("h2, h3, a")?;
    let link = selector("a[href]")?;
    let published = dates::now_iso();

    for css in site.selectors {
        let items = selector(css)?;
        let mut vacancies = Vec::new();

        for item in document.select(&items) {
            let Some(title) = title_of(&item, &titled, &heading) else {
                continue;
            };
            if !is_product_manager_title(&title) {
                continue;
            }

            let href = item
                .select(&link)
                .next()
                .and_then(|a| a.value().attr("href"))
                .unwrap_or(base_url);
            let url = if href.starts_with("http") {
                href.to_string()
            } else if href.starts_with('/') {
                format!("{}{href}", site.link_host)
            } else {
                format!("{base_url}/{href}")
            };

            vacancies.push(Vacancy {
                title,
                company: site.company.to_string(),
                location: "Москва".to_string(),
                salary: NOT_SPECIFIED.to_string(),
                url,
                source: site.source.to_string(),
                published: published.clone(),
                ..Default::default()
            });
            if vacancies.len() >= EMPLOYER_LIMIT {
                break;
            }
        }

        if !vacancies.is_empty() {
            return Ok(vacancies);
        }
    }
    Ok(Vec::new())
}

fn title_of(item: &ElementRef, titled: &Selector, heading: &Selector) -> Option<String> {
    item.select(titled)
        .next()
        .or_else(|| item.select(heading).next())
        .map(|e| element_text(&e))
}

/// Avito job listing. Titles are not classified; Avito's own search does that.
pub async fn search_avito(html: &Client) -> Vec<Vacancy> {
    info!("Searching avito.ru");
    let url = format!("{AVITO_URL}/all/vakansii");
    let response = html
        .get(&url)
        .query(&[("q", "Product Manager Продакт менеджер"), ("p", "1")])
        .send()
        .await;

    let body = match response {
        Ok(r) if r.status().is_success() => r.text().await,
        Ok(r) => {
            warn!("avito.ru returned {}", r.status());
            return Vec::new();
        }
        Err(e) => {
            warn!("avito.ru search failed: {e}");
            return Vec::new();
        }
    };

    match body.map_err(AppError::from).and_then(|b| parse_avito(&b)) {
        Ok(found) => found,
        Err(e) => {
            warn!("avito.ru listing could not be read: {e}");
            Vec::new()
        }
    }
}

pub fn parse_avito(html: &str) -> Result<Vec<Vacancy>, AppError> {
    let document = Html::parse_document(html);
    let item_sel = selector("div.iva-item-content")?;
    let title_sel = selector("h3.title-root")?;
    let link_sel = selector("a[href]")?;
    let published = dates::now_iso();

    Ok(document
        .select(&item_sel)
        .take(AVITO_LIMIT)
        .filter_map(|item| {
            let title = item.select(&title_sel).next()?;
            let href = item
                .select(&link_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
                .unwrap_or_default();
            Some(Vacancy {
                title: element_text(&title),
                company: NOT_SPECIFIED.to_string(),
                location: NOT_SPECIFIED.to_string(),
                salary: NOT_SPECIFIED.to_string(),
                url: absolute_url(AVITO_URL, href),
                source: "avito.ru".to_string(),
                published: published.clone(),
                ..Default::default()
            })
        })
        .collect())
}

async fn fetch_page(client: &Client, url: &str) -> Result<String, AppError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Upstream {
            service: "careers page",
            status: status.as_u16(),
            message: String::new(),
        });
    }
    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_career_page_falls_through_selectors() {
        let html = r#"
            <div class="job-item">
              <h3 class="job-title">Product Owner</h3>
              <a href="/career/po-1">Подробнее</a>
            </div>
            <div class="job-item"><h3>Бухгалтер</h3></div>
        "#;
        let found = parse_career_page(html, "https://www.tinkoff.ru/career/", &TINKOFF).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Product Owner");
        assert_eq!(found[0].url, "https://www.tinkoff.ru/career/po-1");
        assert_eq!(found[0].company, "Т-Банк (Tinkoff)");
    }

    #[test]
    fn test_career_page_without_link_uses_base_url() {
        let html = r#"<div data-vacancy="1"><h2>Продакт менеджер</h2></div>"#;
        let found =
            parse_career_page(html, "https://career.sber.ru/vacancies", &SBER).unwrap();
        assert_eq!(found[0].url, "https://career.sber.ru/vacancies");
    }

    #[test]
    fn test_avito_items() {
        let html = r#"
            <div class="iva-item-content">
              <a href="/moskva/vakansii/pm_123"><h3 class="title-root">Product Manager</h3></a>
            </div>
            <div class="iva-item-content"><p>no title</p></div>
        "#;
        let found = parse_avito(html).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].url, "https://www.avito.ru/moskva/vakansii/pm_123");
        assert_eq!(found[0].source, "avito.ru");
    }

    #[tokio::test]
    async fn test_hh_results_are_checked_against_employer_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vacancies"))
            .and(query_param("text", "Product Manager Сбер"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"name": "Product Manager", "employer": {"name": "СберМаркет"},
                     "alternate_url": "https://hh.ru/vacancy/1"},
                    {"name": "Product Manager", "employer": {"name": "Другая компания"},
                     "alternate_url": "https://hh.ru/vacancy/2"}
                ]
            })))
            .mount(&server)
            .await;

        let hh = HhClient::new(Client::new(), None).with_base_url(server.uri());
        let found = search_employer(&hh, &Client::new(), &SBER).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source, "hh.ru (Сбер)");
        assert_eq!(found[0].url, "https://hh.ru/vacancy/1");
    }
}
