//! One-shot delivery of the saved postings to the configured chat.

use std::time::Duration;

use tracing::{error, info};

use crate::config::DataPaths;
use crate::dates;
use crate::errors::AppError;
use crate::finder::VacancyFinder;
use crate::models::Vacancy;
use crate::store::vacancies;
use crate::telegram::keyboards::vacancy_buttons;
use crate::telegram::types::{ChatId, SendMessage};
use crate::telegram::ChatApi;

use crate::bot::messages;

pub const DEFAULT_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy)]
pub struct SendOptions {
    /// Re-run the finder first and send everything it found.
    pub refresh: bool,
    /// Only postings from the last `days` days; zero or less disables it.
    pub days: i64,
    /// Ignore the date window.
    pub all: bool,
}

impl SendOptions {
    fn day_window(&self) -> Option<i64> {
        if self.refresh || self.all || self.days <= 0 {
            None
        } else {
            Some(self.days)
        }
    }
}

/// Replaces the vacancies file with a fresh finder run. Returns `false` when
/// nothing was found and the old file was left as is.
pub async fn refresh(finder: &VacancyFinder, paths: &DataPaths) -> bool {
    let found = finder.find_all().await;
    if found.is_empty() {
        return false;
    }
    match vacancies::save(&paths.vacancies_file(), &found) {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to save refreshed postings: {e}");
            false
        }
    }
}

/// Postings to send under `options`, with the console note about the window.
pub fn select(all: Vec<Vacancy>, options: &SendOptions) -> Vec<Vacancy> {
    let Some(days) = options.day_window() else {
        return all;
    };
    let total = all.len();
    let today = dates::today();
    let kept: Vec<Vacancy> = all
        .into_iter()
        .filter(|v| dates::within_days(&v.published, days, today))
        .collect();
    if kept.len() < total {
        println!("📅 Отобрано вакансий за последние {days} дн.: {} из {total}", kept.len());
    }
    kept
}

/// Sends every selected posting with the cover-letter buttons and returns
/// how many went through.
pub async fn send_all(
    api: &dyn ChatApi,
    chat: &ChatId,
    paths: &DataPaths,
    finder: Option<&VacancyFinder>,
    options: SendOptions,
    delay: Duration,
) -> Result<usize, AppError> {
    if options.refresh {
        if let Some(finder) = finder {
            println!("🔄 Обновляю список вакансий с hh.ru и career.habr.com...");
            if refresh(finder, paths).await {
                println!("✅ Список вакансий обновлён.");
            } else {
                println!("⚠️ Продолжаю отправку из существующего файла.");
            }
        }
    }

    let file = paths.vacancies_file();
    let selected = select(vacancies::load(&file), &options);
    if selected.is_empty() {
        match options.day_window() {
            Some(days) => {
                println!("❌ Нет вакансий за последние {days} дн. в файле {}", file.display());
                println!("   Запустите с обновлением: vacancy-bot send --refresh");
                println!("   или сначала: vacancy-bot find");
            }
            None => println!("❌ Нет вакансий для отправки"),
        }
        return Ok(0);
    }

    let total = selected.len();
    println!("📤 Отправляю {total} вакансий...");

    let mut delivered = 0;
    for (i, vacancy) in selected.iter().enumerate() {
        let message = SendMessage::new(
            chat.clone(),
            messages::vacancy_offer(vacancy, dates::now()),
        )
        .html()
        .markup(vacancy_buttons(&vacancy.id()));

        match api.send_message(&message).await {
            Ok(_) => {
                delivered += 1;
                println!(
                    "✅ [{}/{total}] Вакансия отправлена: {} в {}",
                    i + 1,
                    vacancy.title,
                    vacancy.company
                );
            }
            Err(e) => {
                error!("Failed to send {}: {e}", vacancy.url);
                println!("❌ [{}/{total}] Ошибка при отправке: {}", i + 1, vacancy.title);
            }
        }
        tokio::time::sleep(delay).await;
    }

    println!("\n✅ Все вакансии отправлены!");
    info!("Delivered {delivered} of {total} postings to {chat}");
    Ok(delivered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::testing::FakeChat;
    use chrono::Duration as Days;

    fn posting(id: u32, published: String) -> Vacancy {
        Vacancy {
            title: format!("Product Manager {id}"),
            company: "Acme".to_string(),
            url: format!("https://hh.ru/vacancy/{id}"),
            published,
            ..Default::default()
        }
    }

    fn days_ago(days: i64) -> String {
        (dates::now() - Days::days(days))
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string()
    }

    const WINDOW: SendOptions = SendOptions {
        refresh: false,
        days: 3,
        all: false,
    };

    #[test]
    fn test_select_applies_day_window() {
        let input = vec![posting(1, days_ago(1)), posting(2, days_ago(10)), posting(3, String::new())];
        let kept = select(input.clone(), &WINDOW);
        let urls: Vec<_> = kept.iter().map(|v| v.url.as_str()).collect();
        assert_eq!(urls, vec!["https://hh.ru/vacancy/1", "https://hh.ru/vacancy/3"]);

        let all = SendOptions { all: true, ..WINDOW };
        assert_eq!(select(input.clone(), &all).len(), 3);
        let refresh = SendOptions { refresh: true, ..WINDOW };
        assert_eq!(select(input, &refresh).len(), 3);
    }

    #[tokio::test]
    async fn test_send_all_attaches_buttons() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        vacancies::save(
            &paths.vacancies_file(),
            &[posting(11, days_ago(0)), posting(12, days_ago(30))],
        )
        .unwrap();

        let chat = FakeChat::default();
        let target = ChatId::Username("@pm_jobs".to_string());
        let sent = send_all(&chat, &target, &paths, None, WINDOW, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(sent, 1);

        let messages = chat.sent();
        assert_eq!(messages[0].chat_id, target);
        let payload = serde_json::to_value(&messages[0]).unwrap();
        assert_eq!(
            payload["reply_markup"]["inline_keyboard"][0][0]["callback_data"],
            "yes_11"
        );
    }

    #[tokio::test]
    async fn test_send_all_without_postings() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        let chat = FakeChat::default();
        let sent = send_all(&chat, &ChatId::Id(1), &paths, None, WINDOW, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(sent, 0);
        assert!(chat.sent().is_empty());
    }
}
