//! Commands, menu buttons, free text and resume uploads.

use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::resume::{extract_position, extract_salary, extract_text, ResumeFormat};
use crate::state::AppState;
use crate::telegram::keyboards::{self, menu_keyboard};
use crate::telegram::types::{Document, Message, SendMessage};

use super::delivery;
use super::messages;

/// Text messages longer than this are taken as a pasted resume.
const RESUME_TEXT_MIN: usize = 100;
/// Typed positions longer than this are not treated as a position.
const POSITION_TEXT_MAX: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Send,
    Fresh,
    Resume,
    ClearResume,
    ClearSent,
    Menu,
    Help,
}

impl Command {
    /// Slash commands (with an optional `@botname` suffix) and menu buttons.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let command = match text.strip_prefix('/') {
            Some(rest) => rest.split_whitespace().next()?.split('@').next()?,
            None => {
                return match text {
                    keyboards::MENU_FRESH => Some(Command::Fresh),
                    keyboards::MENU_SEND => Some(Command::Send),
                    keyboards::MENU_RESUME => Some(Command::Resume),
                    keyboards::MENU_CLEAR_RESUME => Some(Command::ClearResume),
                    keyboards::MENU_CLEAR_SENT => Some(Command::ClearSent),
                    keyboards::MENU_HELP => Some(Command::Help),
                    keyboards::MENU_MENU => Some(Command::Menu),
                    _ => None,
                };
            }
        };
        match command {
            "start" => Some(Command::Start),
            "send" => Some(Command::Send),
            "fresh" => Some(Command::Fresh),
            "resume" => Some(Command::Resume),
            "clear_resume" => Some(Command::ClearResume),
            "clear_sent" => Some(Command::ClearSent),
            "menu" => Some(Command::Menu),
            "help" => Some(Command::Help),
            _ => None,
        }
    }
}

async fn reply(app: &AppState, message: SendMessage) {
    let chat = message.chat_id.clone();
    if let Err(e) = app.api.send_message(&message).await {
        warn!("Failed to reply to {chat}: {e}");
    }
}

pub async fn handle_message(app: &AppState, message: Message) {
    let user_id = message.from.as_ref().map_or(message.chat.id, |u| u.id);

    if let Some(document) = &message.document {
        handle_document(app, &message, user_id, document).await;
        return;
    }
    let Some(text) = message.text.as_deref() else {
        return;
    };

    if let Some(command) = Command::parse(text) {
        info!("Command {command:?} from {user_id} in {}", message.chat.display_name());
        handle_command(app, &message, user_id, command).await;
        return;
    }
    if text.starts_with('/') {
        return;
    }
    handle_text(app, &message, user_id, text).await;
}

pub async fn handle_command(app: &AppState, message: &Message, user_id: i64, command: Command) {
    let chat = message.chat.id;
    match command {
        Command::Start => {
            reply(app, SendMessage::new(chat, messages::GREETING).markup(menu_keyboard())).await;
        }
        Command::Send => {
            reply(app, SendMessage::new(chat, "📤 Начинаю отправку вакансий...")).await;
            let text = match delivery::send_batch(app).await {
                Ok(()) => "✅ Отправка завершена!".to_string(),
                Err(e) => {
                    error!("Batch send failed: {e}");
                    format!("❌ Ошибка при отправке: {e}")
                }
            };
            reply(app, SendMessage::new(chat, text).markup(menu_keyboard())).await;
        }
        Command::Fresh => {
            if let Err(e) = delivery::send_fresh(app, user_id).await {
                error!("Fresh delivery to {user_id} failed: {e}");
                reply(
                    app,
                    SendMessage::new(chat, format!("❌ Ошибка при отправке свежих вакансий: {e}"))
                        .markup(menu_keyboard()),
                )
                .await;
            }
        }
        Command::Resume => {
            let text = match app.store.lock().await.resumes.get(user_id) {
                Some(resume) => messages::resume_preview(resume),
                None => messages::NO_RESUME.to_string(),
            };
            reply(app, SendMessage::new(chat, text)).await;
        }
        Command::ClearResume => {
            let text = match app.store.lock().await.resumes.remove(user_id) {
                Ok(true) => "✅ Резюме удалено.".to_string(),
                Ok(false) => "❌ Резюме не найдено.".to_string(),
                Err(e) => {
                    error!("Failed to remove resume of {user_id}: {e}");
                    format!("❌ Ошибка при удалении резюме: {e}")
                }
            };
            reply(app, SendMessage::new(chat, text).markup(menu_keyboard())).await;
        }
        Command::ClearSent => {
            let text = match app.store.lock().await.sent.clear() {
                Ok(()) => "✅ Список отправленных вакансий очищен!".to_string(),
                Err(e) => format!("❌ Ошибка при очистке: {e}"),
            };
            reply(app, SendMessage::new(chat, text).markup(menu_keyboard())).await;
        }
        Command::Menu => {
            let sent = app.store.lock().await.sent.len();
            reply(
                app,
                SendMessage::new(chat, messages::menu(sent))
                    .html()
                    .markup(menu_keyboard()),
            )
            .await;
        }
        Command::Help => {
            reply(
                app,
                SendMessage::new(chat, messages::HELP)
                    .html()
                    .markup(menu_keyboard()),
            )
            .await;
        }
    }
}

async fn handle_text(app: &AppState, message: &Message, user_id: i64, text: &str) {
    let chat = message.chat.id;
    let length = text.chars().count();

    let awaiting = app.store.lock().await.awaiting_position.contains(&user_id);
    if awaiting && length <= POSITION_TEXT_MAX {
        let position = text.trim();
        if position.is_empty() {
            return;
        }
        let saved = {
            let mut store = app.store.lock().await;
            store.awaiting_position.remove(&user_id);
            store.users.set_position(user_id, position)
        };
        if let Err(e) = saved {
            error!("Failed to save position for {user_id}: {e}");
        }
        reply(
            app,
            SendMessage::new(chat, messages::position_entered(position))
                .html()
                .markup(keyboards::confirm_position_buttons(user_id)),
        )
        .await;
        return;
    }

    if length > RESUME_TEXT_MIN {
        let saved = app.store.lock().await.resumes.save(user_id, text);
        match saved {
            Ok(()) => reply(app, SendMessage::new(chat, messages::resume_saved(length))).await,
            Err(e) => {
                error!("Failed to save resume of {user_id}: {e}");
                reply(app, SendMessage::new(chat, format!("❌ Ошибка при обработке файла: {e}"))).await;
            }
        }
    }
}

async fn handle_document(app: &AppState, message: &Message, user_id: i64, document: &Document) {
    let chat = message.chat.id;
    let file_name = document.file_name.clone().unwrap_or_default();
    let format = match ResumeFormat::from_file_name(&file_name) {
        Some(format) if format.is_upload() => format,
        _ => {
            reply(
                app,
                SendMessage::new(
                    chat,
                    "❌ Неподдерживаемый формат файла.\nПоддерживаются: PDF, DOCX",
                ),
            )
            .await;
            return;
        }
    };

    reply(app, SendMessage::new(chat, "Спасибо! Обрабатываю ваше резюме...")).await;

    let text = match read_upload(app, user_id, document, &file_name, format).await {
        Ok(text) => text,
        Err(AppError::Extraction(e)) => {
            warn!("No text extracted from {file_name}: {e}");
            reply(
                app,
                SendMessage::new(
                    chat,
                    "⚠️ Не удалось извлечь текст из файла.\n\n\
                     Попробуйте отправить резюме в формате PDF или DOCX.",
                ),
            )
            .await;
            return;
        }
        Err(e) => {
            error!("Failed to process {file_name} from {user_id}: {e}");
            reply(app, SendMessage::new(chat, format!("❌ Ошибка при обработке файла: {e}"))).await;
            return;
        }
    };

    let position = extract_position(&text);
    let salary = extract_salary(&text);
    info!("Resume from {user_id}: position {position:?}, salary {salary:?}");

    let mut store = app.store.lock().await;
    if let Err(e) = store.resumes.save(user_id, &text) {
        error!("Failed to save resume of {user_id}: {e}");
    }
    let reply_message = match &position {
        Some(position) => {
            if let Err(e) = store.users.set_position(user_id, position) {
                error!("Failed to save position for {user_id}: {e}");
            }
            SendMessage::new(chat, messages::position_found(position, salary.as_deref()))
                .html()
                .markup(keyboards::confirm_position_buttons(user_id))
        }
        None => {
            store.awaiting_position.insert(user_id);
            SendMessage::new(chat, messages::position_missing(salary.as_deref())).html()
        }
    };
    drop(store);
    reply(app, reply_message).await;
}

/// Downloads the upload, keeps a copy next to the stored resumes and returns
/// its text.
async fn read_upload(
    app: &AppState,
    user_id: i64,
    document: &Document,
    file_name: &str,
    format: ResumeFormat,
) -> Result<String, AppError> {
    let file = app.api.get_file(&document.file_id).await?;
    let file_path = file
        .file_path
        .ok_or_else(|| AppError::NotFound(format!("file path for {}", document.file_id)))?;
    let bytes = app.api.download_file(&file_path).await?;

    let target = app.store.lock().await.resumes.upload_path(user_id, file_name);
    tokio::fs::write(&target, &bytes).await?;

    extract_text(format, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/clear_sent"), Some(Command::ClearSent));
        assert_eq!(Command::parse("/send@pm_jobs_bot"), Some(Command::Send));
        assert_eq!(Command::parse("/unknown"), None);
    }

    #[test]
    fn test_menu_buttons() {
        assert_eq!(Command::parse(keyboards::MENU_FRESH), Some(Command::Fresh));
        assert_eq!(Command::parse(keyboards::MENU_HELP), Some(Command::Help));
        assert_eq!(Command::parse("Product Manager"), None);
    }
}
