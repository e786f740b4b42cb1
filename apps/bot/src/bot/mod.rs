//! Interactive Telegram bot: long polling, update dispatch and the
//! background fresh-postings scanner.

pub mod callbacks;
pub mod delivery;
pub mod handlers;
pub mod messages;
pub mod scanner;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::state::AppState;
use crate::telegram::types::Update;

const POLL_TIMEOUT_SECS: u64 = 30;
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Checks the token, starts the scanner and processes updates one at a time
/// until the process is stopped.
pub async fn run(app: AppState) -> Result<(), AppError> {
    let me = app.api.get_me().await?;
    info!(
        "Bot @{} started, batches go to {}",
        me.username.unwrap_or_default(),
        app.channel
    );

    scanner::spawn(app.clone());

    let mut offset = None;
    loop {
        match app.api.get_updates(offset, POLL_TIMEOUT_SECS).await {
            Ok(updates) => {
                for update in updates {
                    offset = Some(update.update_id + 1);
                    dispatch(&app, update).await;
                }
            }
            Err(e) => {
                warn!("getUpdates failed: {e}");
                tokio::time::sleep(POLL_RETRY_DELAY).await;
            }
        }
    }
}

pub async fn dispatch(app: &AppState, update: Update) {
    if let Some(query) = update.callback_query {
        callbacks::handle(app, query).await;
    } else if let Some(message) = update.message {
        handlers::handle_message(app, message).await;
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{test_app, test_app_with_hh, FakeChat};
    use super::*;
    use crate::dates;
    use crate::models::Vacancy;
    use crate::store::vacancies;
    use crate::telegram::keyboards::{confirm_position_buttons, menu_keyboard};
    use crate::telegram::types::{
        CallbackQuery, Chat, ChatId, Document, Message, ParseMode, ReplyMarkup, User,
    };
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn posting(i: usize) -> Vacancy {
        Vacancy {
            title: format!("Product Manager {i}"),
            company: "Acme".to_string(),
            url: format!("https://career.habr.com/vacancies/{i}"),
            source: "habr.com".to_string(),
            ..Default::default()
        }
    }

    fn message(user_id: i64, text: &str) -> Message {
        Message {
            message_id: 7,
            chat: Chat {
                id: user_id,
                kind: "private".to_string(),
                title: None,
                username: None,
                first_name: None,
            },
            from: Some(User {
                id: user_id,
                is_bot: false,
                first_name: "Test".to_string(),
                username: None,
            }),
            text: Some(text.to_string()),
            document: None,
        }
    }

    fn text_update(user_id: i64, text: &str) -> Update {
        Update {
            update_id: 1,
            message: Some(message(user_id, text)),
            channel_post: None,
            callback_query: None,
        }
    }

    fn upload(user_id: i64, file_id: &str, file_name: &str) -> Update {
        let mut message = message(user_id, "");
        message.text = None;
        message.document = Some(Document {
            file_id: file_id.to_string(),
            file_name: Some(file_name.to_string()),
            mime_type: None,
            file_size: None,
        });
        Update {
            update_id: 3,
            message: Some(message),
            channel_post: None,
            callback_query: None,
        }
    }

    fn docx(paragraphs: &[&str]) -> Vec<u8> {
        use docx_rs::{Docx, Paragraph, Run};

        let mut buf = std::io::Cursor::new(Vec::new());
        paragraphs
            .iter()
            .fold(Docx::new(), |doc, text| {
                doc.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)))
            })
            .build()
            .pack(&mut buf)
            .unwrap();
        buf.into_inner()
    }

    fn hh_item(id: usize, published_at: &str) -> serde_json::Value {
        json!({
            "name": format!("Product Manager {id}"),
            "employer": {"name": "Acme"},
            "alternate_url": format!("https://hh.ru/vacancy/{id}"),
            "published_at": published_at
        })
    }

    async fn hh_search(items: Vec<serde_json::Value>) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vacancies"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"items": items, "pages": 1})),
            )
            .mount(&server)
            .await;
        server
    }

    fn press(user_id: i64, data: &str) -> Update {
        Update {
            update_id: 2,
            message: None,
            channel_post: None,
            callback_query: Some(CallbackQuery {
                id: "cb1".to_string(),
                from: User {
                    id: user_id,
                    is_bot: false,
                    first_name: "Test".to_string(),
                    username: None,
                },
                message: Some(message(user_id, "card")),
                data: Some(data.to_string()),
            }),
        }
    }

    #[tokio::test]
    async fn test_batch_send_skips_sent_and_offers_more() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let app = test_app(dir.path(), &chat);
        let all: Vec<Vacancy> = (1..=12).map(posting).collect();
        vacancies::save(&app.paths.vacancies_file(), &all).unwrap();

        delivery::send_batch(&app).await.unwrap();
        let sent = chat.sent();
        assert_eq!(sent.len(), 11);
        assert!(sent[0].text.contains("Product Manager 1"));
        assert!(sent[10].text.contains("Осталось вакансий: 2"));
        assert_eq!(app.store.lock().await.sent.len(), 10);

        delivery::send_batch(&app).await.unwrap();
        assert_eq!(chat.sent().len(), 13);
        assert_eq!(app.store.lock().await.sent.len(), 12);

        delivery::send_batch(&app).await.unwrap();
        assert!(chat.sent()[13].text.contains("уже были отправлены"));
    }

    #[tokio::test]
    async fn test_batch_send_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let app = test_app(dir.path(), &chat);

        delivery::send_batch(&app).await.unwrap();
        assert!(chat.sent()[0].text.starts_with("❌ Нет вакансий для отправки"));
    }

    #[tokio::test]
    async fn test_user_delivery_leaves_sent_set_alone() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let app = test_app(dir.path(), &chat);

        let first = delivery::send_vacancy(&app, &posting(1), delivery::Delivery::User(5)).await;
        assert!(first.unwrap());
        assert!(app.store.lock().await.sent.is_empty());
        assert!(app.store.lock().await.vacancy_cache.contains_key(&posting(1).id()));
    }

    #[tokio::test]
    async fn test_menu_command_reports_sent_count() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let app = test_app(dir.path(), &chat);

        dispatch(&app, text_update(42, "/menu")).await;
        let payload = serde_json::to_value(&chat.sent()[0]).unwrap();
        assert_eq!(payload["chat_id"], json!(42));
        assert_eq!(payload["parse_mode"], json!("HTML"));
        assert!(payload["reply_markup"]["keyboard"].is_array());
    }

    #[tokio::test]
    async fn test_long_text_is_saved_as_resume() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let app = test_app(dir.path(), &chat);
        let resume = "Опыт работы продакт-менеджером. ".repeat(5);

        dispatch(&app, text_update(42, &resume)).await;
        assert!(chat.sent()[0].text.starts_with("✅ Резюме сохранено!"));
        assert_eq!(app.store.lock().await.resumes.get(42), Some(resume.as_str()));

        dispatch(&app, text_update(42, "/clear_resume")).await;
        assert_eq!(chat.sent()[1].text, "✅ Резюме удалено.");
    }

    #[tokio::test]
    async fn test_typed_position_is_offered_for_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let app = test_app(dir.path(), &chat);

        dispatch(&app, press(42, "change_position_42")).await;
        assert!(chat.edits()[0].text.contains("отправьте название"));

        dispatch(&app, text_update(42, "Data Analyst")).await;
        let sent = chat.sent();
        assert!(sent[0].text.contains("<b>Data Analyst</b>"));
        assert_eq!(
            serde_json::to_value(&sent[0].reply_markup).unwrap(),
            serde_json::to_value(confirm_position_buttons(42)).unwrap()
        );

        let store = app.store.lock().await;
        assert_eq!(store.users.position(42), Some("Data Analyst"));
        assert!(store.awaiting_position.is_empty());
    }

    #[tokio::test]
    async fn test_confirm_rejects_other_user() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let app = test_app(dir.path(), &chat);

        dispatch(&app, press(7, "confirm_position_42")).await;
        let answers = chat.answers();
        assert_eq!(answers[0].1.as_deref(), Some("Ошибка: неверный пользователь"));
        assert!(answers[0].2);
        assert!(chat.edits().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_without_position() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let app = test_app(dir.path(), &chat);

        dispatch(&app, press(42, "confirm_position_42")).await;
        assert!(chat.edits()[0].text.starts_with("❌ Должность не найдена"));
    }

    #[tokio::test]
    async fn test_unknown_callback_gets_alert() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let app = test_app(dir.path(), &chat);

        dispatch(&app, press(42, "bogus")).await;
        assert_eq!(chat.answers()[0].1.as_deref(), Some("Неизвестная команда"));
    }

    #[tokio::test]
    async fn test_no_callback_acknowledges() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let app = test_app(dir.path(), &chat);

        dispatch(&app, press(42, "no_123")).await;
        assert_eq!(
            chat.edits()[0].text,
            "✅ Понятно, сопроводительное письмо не требуется."
        );
    }

    #[tokio::test]
    async fn test_yes_callback_sends_template_letter() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let app = test_app(dir.path(), &chat);
        let vacancy = posting(3);
        app.store
            .lock()
            .await
            .vacancy_cache
            .insert(vacancy.id(), vacancy.clone());

        dispatch(&app, press(42, &format!("yes_{}", vacancy.id()))).await;
        let sent = chat.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("Сопроводительное письмо"));
        assert!(sent[0].text.contains("Product Manager 3"));
        assert!(sent[0].reply_markup.is_none());

        let edits = chat.edits();
        assert_eq!(edits.last().unwrap().text, "✅ Сопроводительное письмо отправлено!");
    }

    #[tokio::test]
    async fn test_yes_callback_for_unknown_posting() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let app = test_app(dir.path(), &chat);

        dispatch(&app, press(42, "yes_deadbeef")).await;
        assert!(chat.edits().last().unwrap().text.starts_with("❌ Вакансия не найдена"));
    }

    #[tokio::test]
    async fn test_apply_only_for_hh() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let app = test_app(dir.path(), &chat);
        let vacancy = posting(4);
        app.store
            .lock()
            .await
            .vacancy_cache
            .insert(vacancy.id(), vacancy.clone());

        dispatch(&app, press(42, &format!("apply_{}", vacancy.id()))).await;
        assert_eq!(
            chat.answers()[0].1.as_deref(),
            Some("❌ Отклик возможен только для вакансий с hh.ru")
        );
    }

    #[tokio::test]
    async fn test_fresh_sends_todays_postings_in_batches() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let now = dates::now_iso();
        let mut items: Vec<_> = (1..=12).map(|i| hh_item(i, &now)).collect();
        items.push(hh_item(99, "2020-01-01T10:00:00+0300"));
        let server = hh_search(items).await;
        let app = test_app_with_hh(dir.path(), &chat, &server.uri(), None);

        dispatch(&app, text_update(42, "/fresh")).await;
        let sent = chat.sent();
        assert_eq!(sent.len(), 12);
        assert!(sent[0].text.starts_with("🆕 Отправляю 10 свежих вакансий"));
        assert!(sent[1..11].iter().all(|m| m.chat_id == ChatId::Id(42)));
        assert!(sent[11].text.contains("Осталось новых вакансий: 2"));
        assert_eq!(app.store.lock().await.user_sent_fresh.sent_to(42).len(), 10);
        assert_eq!(app.store.lock().await.fresh.vacancies().len(), 12);

        dispatch(&app, text_update(42, "/fresh")).await;
        let sent = chat.sent();
        assert_eq!(sent.len(), 16);
        assert!(sent[12].text.starts_with("🆕 Отправляю 2 свежих вакансий"));
        assert!(sent[15].text.contains("Осталось новых вакансий: 0"));
        assert!(!sent.iter().any(|m| m.text.contains("Product Manager 99")));
    }

    #[tokio::test]
    async fn test_fresh_failure_is_reported_to_user() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let server = hh_search(vec![hh_item(1, &dates::now_iso())]).await;
        let app = test_app_with_hh(dir.path(), &chat, &server.uri(), None);
        // the per-user record cannot be written over a directory
        std::fs::create_dir_all(app.paths.user_sent_fresh_file()).unwrap();

        dispatch(&app, text_update(42, "/fresh")).await;
        let last = chat.sent().pop().unwrap();
        assert!(last.text.starts_with("❌ Ошибка при отправке свежих вакансий"));
        assert_eq!(
            serde_json::to_value(&last.reply_markup).unwrap(),
            serde_json::to_value(ReplyMarkup::from(menu_keyboard())).unwrap()
        );
    }

    #[tokio::test]
    async fn test_confirm_position_subscribes_and_searches() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vacancies"))
            .and(query_param("text", "Data Analyst"))
            .and(query_param("period", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [hh_item(1, "2026-02-11T18:39:21+0300"), hh_item(2, "2026-02-11T18:39:21+0300")],
                "pages": 1
            })))
            .expect(1)
            .mount(&server)
            .await;
        let app = test_app_with_hh(dir.path(), &chat, &server.uri(), None);
        app.store
            .lock()
            .await
            .users
            .set_position(42, "Data Analyst")
            .unwrap();

        dispatch(&app, press(42, "confirm_position_42")).await;
        assert_eq!(chat.answers()[0].1.as_deref(), Some("⏳ Обрабатываю..."));
        assert_eq!(
            chat.edits()[0].text,
            "Отлично! Теперь буду присылать вам подборку вакансий."
        );

        let sent = chat.sent();
        assert_eq!(sent.len(), 4);
        assert!(sent[0].text.contains("<b>Data Analyst</b>"));
        assert!(sent[1].text.contains("Product Manager 1"));
        assert!(sent[2].text.contains("Product Manager 2"));
        assert_eq!(sent[3].text, "✅ Отправлено вакансий: 2");

        let store = app.store.lock().await;
        assert!(store.users.subscription(42).unwrap().active);
        assert!(store.users.active_positions().contains("Data Analyst"));
        assert!(store.sent.is_empty());
    }

    #[tokio::test]
    async fn test_send_more_callback_sends_next_batch() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let app = test_app(dir.path(), &chat);
        let all: Vec<Vacancy> = (1..=12).map(posting).collect();
        vacancies::save(&app.paths.vacancies_file(), &all).unwrap();

        dispatch(&app, press(42, "send_more")).await;
        assert_eq!(chat.edits()[0].text, "📤 Отправляю ещё вакансии...");
        let sent = chat.sent();
        assert_eq!(sent.len(), 11);
        assert!(sent[..10].iter().all(|m| m.chat_id == ChatId::Id(-100)));
        assert_eq!(app.store.lock().await.sent.len(), 10);
    }

    #[tokio::test]
    async fn test_upload_without_position_waits_for_it() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default().with_file(
            "f1",
            "documents/file_1.docx",
            docx(&["Email: ivan@example.com, +7 999 123-45-67", "Зарплата: 250 000 руб."]),
        );
        let app = test_app(dir.path(), &chat);

        dispatch(&app, upload(42, "f1", "cv.docx")).await;
        let sent = chat.sent();
        assert_eq!(sent[0].text, "Спасибо! Обрабатываю ваше резюме...");
        assert!(sent[1].text.contains("<b>250 000 руб</b>"));
        assert!(sent[1].text.contains("Не удалось автоматически определить"));
        assert_eq!(sent[1].parse_mode, Some(ParseMode::Html));
        assert!(app.paths.resumes_dir().join("resume_42_cv.docx").exists());

        let store = app.store.lock().await;
        assert!(store.awaiting_position.contains(&42));
        assert!(store.resumes.get(42).unwrap().contains("ivan@example.com"));
        assert_eq!(store.users.position(42), None);
    }

    #[tokio::test]
    async fn test_upload_with_position_offers_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default().with_file(
            "f2",
            "documents/file_2.docx",
            docx(&["Иван Петров", "Желаемая должность: Product Manager."]),
        );
        let app = test_app(dir.path(), &chat);

        dispatch(&app, upload(42, "f2", "cv.docx")).await;
        let sent = chat.sent();
        assert!(sent[1].text.contains("<b>Product Manager</b>"));
        assert_eq!(
            serde_json::to_value(&sent[1].reply_markup).unwrap(),
            serde_json::to_value(ReplyMarkup::from(confirm_position_buttons(42))).unwrap()
        );

        let store = app.store.lock().await;
        assert_eq!(store.users.position(42), Some("Product Manager"));
        assert!(store.awaiting_position.is_empty());
    }

    #[tokio::test]
    async fn test_upload_of_unsupported_format() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let app = test_app(dir.path(), &chat);

        dispatch(&app, upload(42, "f3", "cv.doc")).await;
        let sent = chat.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.starts_with("❌ Неподдерживаемый формат файла."));
    }

    #[tokio::test]
    async fn test_apply_to_hh_posting() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resumes"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "r-1"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/negotiations"))
            .and(body_partial_json(json!({
                "vacancy_id": "555",
                "resume_id": "r-1",
                "message": messages::application_text(false)
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        let app = test_app_with_hh(dir.path(), &chat, &server.uri(), Some("secret"));
        let vacancy = Vacancy {
            title: "Product Manager".to_string(),
            url: "https://hh.ru/vacancy/555".to_string(),
            source: "hh.ru".to_string(),
            ..Default::default()
        };
        app.store
            .lock()
            .await
            .vacancy_cache
            .insert(vacancy.id(), vacancy);

        dispatch(&app, press(42, "apply_555")).await;
        let answers = chat.answers();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].1.as_deref(), Some("✅ Отклик успешно отправлен!"));
        assert!(answers[0].2);

        let edit = chat.edits().pop().unwrap();
        assert_eq!(edit.text, "card\n\n✅ <b>Отклик отправлен работодателю!</b>");
        assert_eq!(edit.parse_mode, Some(ParseMode::Html));
    }

    #[tokio::test]
    async fn test_rejected_application_keeps_card() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resumes"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        let app = test_app_with_hh(dir.path(), &chat, &server.uri(), Some("expired"));
        let vacancy = Vacancy {
            url: "https://hh.ru/vacancy/556".to_string(),
            ..Default::default()
        };
        app.store
            .lock()
            .await
            .vacancy_cache
            .insert(vacancy.id(), vacancy);

        dispatch(&app, press(42, "apply_556")).await;
        assert_eq!(
            chat.answers()[0].1.as_deref(),
            Some("❌ Не удалось отправить отклик. Проверьте токен доступа.")
        );
        assert!(chat.edits().is_empty());
    }

    #[tokio::test]
    async fn test_clear_resume_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let chat = FakeChat::default();
        let app = test_app(dir.path(), &chat);
        let resume = "Опыт работы продакт-менеджером. ".repeat(5);
        dispatch(&app, text_update(42, &resume)).await;

        let stored = app.paths.resumes_dir().join("resume_42.txt");
        std::fs::remove_file(&stored).unwrap();
        std::fs::create_dir(&stored).unwrap();

        dispatch(&app, text_update(42, "/clear_resume")).await;
        let last = chat.sent().pop().unwrap();
        assert!(last.text.starts_with("❌ Ошибка при удалении резюме"));
    }
}
