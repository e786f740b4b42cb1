//! Inline-button presses.

use html_escape::encode_text;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::Vacancy;
use crate::state::AppState;
use crate::store::vacancies;
use crate::telegram::keyboards::{self, Callback};
use crate::telegram::types::{CallbackQuery, ChatId, EditMessageText, Message, ParseMode, SendMessage};

use super::delivery;
use super::messages;

/// Edits the message the button belongs to.
async fn edit(app: &AppState, message: &Message, text: impl Into<String>, html: bool) {
    let edit = EditMessageText {
        chat_id: ChatId::Id(message.chat.id),
        message_id: message.message_id,
        text: text.into(),
        parse_mode: html.then_some(ParseMode::Html),
        reply_markup: None,
    };
    if let Err(e) = app.api.edit_message_text(&edit).await {
        warn!("Failed to edit message {}: {e}", message.message_id);
    }
}

async fn answer(app: &AppState, query: &CallbackQuery, text: Option<&str>, alert: bool) {
    if let Err(e) = app.api.answer_callback_query(&query.id, text, alert).await {
        warn!("Failed to answer callback {}: {e}", query.id);
    }
}

/// Posting offered in this session, or from the vacancies file.
async fn resolve_vacancy(app: &AppState, id: &str) -> Option<Vacancy> {
    if let Some(found) = app.store.lock().await.vacancy_cache.get(id) {
        return Some(found.clone());
    }
    vacancies::find_by_id(&app.paths.vacancies_file(), id)
}

pub async fn handle(app: &AppState, query: CallbackQuery) {
    let data = query.data.clone().unwrap_or_default();
    info!("Callback '{data}' from {}", query.from.id);

    let (Some(callback), Some(message)) = (Callback::parse(&data), query.message.clone()) else {
        answer(app, &query, Some("Неизвестная команда"), true).await;
        return;
    };

    match callback {
        Callback::Yes(id) => {
            answer(app, &query, None, false).await;
            write_letter(app, &query, &message, &id).await;
        }
        Callback::No(_) => {
            answer(app, &query, None, false).await;
            edit(app, &message, "✅ Понятно, сопроводительное письмо не требуется.", false).await;
        }
        Callback::SendMore => {
            answer(app, &query, None, false).await;
            edit(app, &message, "📤 Отправляю ещё вакансии...", false).await;
            if let Err(e) = delivery::send_batch(app).await {
                error!("Failed to send the next batch: {e}");
            }
        }
        Callback::Start => {
            answer(app, &query, None, false).await;
            edit(app, &message, messages::GREETING, false).await;
        }
        Callback::Apply(id) => apply(app, &query, &message, &id).await,
        Callback::ConfirmPosition(uid) => confirm_position(app, &query, &message, uid).await,
        Callback::ChangePosition(uid) => {
            answer(app, &query, None, false).await;
            if uid != query.from.id {
                return;
            }
            app.store.lock().await.awaiting_position.insert(uid);
            edit(
                app,
                &message,
                "Пожалуйста, отправьте название желаемой должности текстовым сообщением.",
                false,
            )
            .await;
        }
    }
}

async fn write_letter(app: &AppState, query: &CallbackQuery, message: &Message, id: &str) {
    edit(app, message, "⏳ Составляю сопроводительное письмо...", false).await;

    let Some(vacancy) = resolve_vacancy(app, id).await else {
        edit(
            app,
            message,
            "❌ Вакансия не найдена. Попробуйте отправить вакансии заново командой /send",
            false,
        )
        .await;
        return;
    };
    if vacancy.url.is_empty() {
        edit(app, message, "❌ Ошибка: URL вакансии не найден", false).await;
        return;
    }

    match send_letter(app, query, message, &vacancy).await {
        Ok(()) => edit(app, message, "✅ Сопроводительное письмо отправлено!", false).await,
        Err(e) => {
            error!("Cover letter for {} failed: {e}", vacancy.url);
            edit(app, message, format!("❌ Ошибка: {e}"), false).await;
        }
    }
}

async fn send_letter(
    app: &AppState,
    query: &CallbackQuery,
    message: &Message,
    vacancy: &Vacancy,
) -> Result<(), AppError> {
    let description = app.finder.hh().vacancy_description(&vacancy.url).await;
    let resume = app
        .store
        .lock()
        .await
        .resumes
        .get(query.from.id)
        .map(str::to_string);

    let title = non_empty_or(&vacancy.title, "Вакансия");
    let company = non_empty_or(&vacancy.company, "Компания");
    let outcome = app
        .letters
        .generate(title, company, description.as_deref(), resume.as_deref())
        .await;

    let mut letter = SendMessage::new(message.chat.id, messages::cover_letter(vacancy, &outcome))
        .html()
        .no_preview();
    if vacancy.is_hh() {
        letter = letter.markup(keyboards::apply_button(&vacancy.id()));
    }
    app.api.send_message(&letter).await?;
    Ok(())
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

async fn apply(app: &AppState, query: &CallbackQuery, message: &Message, id: &str) {
    let Some(vacancy) = resolve_vacancy(app, id).await else {
        answer(app, query, Some("❌ Вакансия не найдена"), true).await;
        return;
    };
    if !vacancy.is_hh() {
        answer(app, query, Some("❌ Отклик возможен только для вакансий с hh.ru"), true).await;
        return;
    }
    let hh = app.finder.hh();
    if !hh.can_apply() {
        answer(app, query, Some(messages::HH_TOKEN_HELP), true).await;
        return;
    }

    let resume = app
        .store
        .lock()
        .await
        .resumes
        .get(query.from.id)
        .map(str::to_string);
    let text = match resume {
        Some(resume) => match hh.vacancy_description(&vacancy.url).await {
            Some(description) => {
                app.letters
                    .generate(
                        non_empty_or(&vacancy.title, "Вакансия"),
                        non_empty_or(&vacancy.company, "Компания"),
                        Some(&description),
                        Some(&resume),
                    )
                    .await
                    .text
            }
            None => messages::application_text(true),
        },
        None => messages::application_text(false),
    };

    match hh.apply(id, &text).await {
        Ok(()) => {
            answer(app, query, Some("✅ Отклик успешно отправлен!"), true).await;
            let original = message.text.as_deref().unwrap_or_default();
            edit(
                app,
                message,
                format!(
                    "{}\n\n✅ <b>Отклик отправлен работодателю!</b>",
                    encode_text(original)
                ),
                true,
            )
            .await;
        }
        Err(e) => {
            error!("Application for {id} failed: {e}");
            answer(
                app,
                query,
                Some("❌ Не удалось отправить отклик. Проверьте токен доступа."),
                true,
            )
            .await;
        }
    }
}

async fn confirm_position(app: &AppState, query: &CallbackQuery, message: &Message, uid: i64) {
    if uid != query.from.id {
        answer(app, query, Some("Ошибка: неверный пользователь"), true).await;
        return;
    }
    answer(app, query, Some("⏳ Обрабатываю..."), false).await;

    let activated = app.store.lock().await.users.activate(uid);
    let subscription = match activated {
        Ok(subscription) => subscription,
        Err(AppError::NotFound(_)) => {
            edit(
                app,
                message,
                "❌ Должность не найдена. Пожалуйста, загрузите резюме заново.",
                false,
            )
            .await;
            return;
        }
        Err(e) => {
            error!("Failed to activate subscription for {uid}: {e}");
            edit(app, message, format!("❌ Ошибка: {e}"), false).await;
            return;
        }
    };

    edit(
        app,
        message,
        "Отлично! Теперь буду присылать вам подборку вакансий.",
        false,
    )
    .await;

    if let Err(e) = delivery::send_for_position(app, uid, &subscription.position).await {
        error!("Position search for {uid} failed: {e}");
        let text = format!("❌ Ошибка при поиске вакансий: {e}");
        if let Err(e) = app.api.send_message(&SendMessage::new(uid, text)).await {
            warn!("Failed to report search error to {uid}: {e}");
        }
    }
}
