//! Recording chat fake and an `AppState` wired to a temp directory.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;

use crate::config::{DataPaths, FinderSettings};
use crate::cover_letter::CoverLetterService;
use crate::errors::AppError;
use crate::finder::habr::HabrClient;
use crate::finder::hh::HhClient;
use crate::finder::{Pacing, VacancyFinder};
use crate::state::{AppState, BotState};
use crate::telegram::types::{
    BotInfo, Chat, ChatId, EditMessageText, File, Message, SendMessage, Update,
};
use crate::telegram::ChatApi;

/// Nothing listens here, so scraper calls fail fast.
const DEAD_URL: &str = "http://127.0.0.1:9";

#[derive(Default)]
struct Recorded {
    sent: Vec<SendMessage>,
    edits: Vec<EditMessageText>,
    answers: Vec<(String, Option<String>, bool)>,
}

#[derive(Clone, Default)]
pub struct FakeChat {
    recorded: Arc<Mutex<Recorded>>,
    /// file_id -> (file_path, contents)
    files: HashMap<String, (String, Bytes)>,
}

impl FakeChat {
    pub fn with_file(mut self, file_id: &str, file_path: &str, contents: impl Into<Bytes>) -> Self {
        self.files
            .insert(file_id.to_string(), (file_path.to_string(), contents.into()));
        self
    }

    pub fn sent(&self) -> Vec<SendMessage> {
        self.recorded.lock().unwrap().sent.clone()
    }

    pub fn edits(&self) -> Vec<EditMessageText> {
        self.recorded.lock().unwrap().edits.clone()
    }

    pub fn answers(&self) -> Vec<(String, Option<String>, bool)> {
        self.recorded.lock().unwrap().answers.clone()
    }
}

#[async_trait]
impl ChatApi for FakeChat {
    async fn get_me(&self) -> Result<BotInfo, AppError> {
        Ok(BotInfo {
            id: 1,
            username: Some("test_bot".to_string()),
            first_name: "Test".to_string(),
        })
    }

    async fn get_updates(&self, _: Option<i64>, _: u64) -> Result<Vec<Update>, AppError> {
        Ok(Vec::new())
    }

    async fn send_message(&self, message: &SendMessage) -> Result<Message, AppError> {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.sent.push(message.clone());
        let chat_id = match &message.chat_id {
            ChatId::Id(id) => *id,
            ChatId::Username(_) => -100,
        };
        Ok(Message {
            message_id: recorded.sent.len() as i64,
            chat: Chat {
                id: chat_id,
                kind: "private".to_string(),
                title: None,
                username: None,
                first_name: None,
            },
            from: None,
            text: Some(message.text.clone()),
            document: None,
        })
    }

    async fn edit_message_text(&self, edit: &EditMessageText) -> Result<(), AppError> {
        self.recorded.lock().unwrap().edits.push(edit.clone());
        Ok(())
    }

    async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), AppError> {
        self.recorded.lock().unwrap().answers.push((
            callback_query_id.to_string(),
            text.map(str::to_string),
            show_alert,
        ));
        Ok(())
    }

    async fn get_file(&self, file_id: &str) -> Result<File, AppError> {
        let (file_path, _) = self
            .files
            .get(file_id)
            .ok_or_else(|| AppError::NotFound(file_id.to_string()))?;
        Ok(File {
            file_id: file_id.to_string(),
            file_path: Some(file_path.clone()),
        })
    }

    async fn download_file(&self, file_path: &str) -> Result<Bytes, AppError> {
        self.files
            .values()
            .find(|(path, _)| path == file_path)
            .map(|(_, contents)| contents.clone())
            .ok_or_else(|| AppError::NotFound(file_path.to_string()))
    }
}

pub fn test_app(root: &Path, chat: &FakeChat) -> AppState {
    test_app_with_hh(root, chat, DEAD_URL, None)
}

/// Same as `test_app`, with hh.ru requests going to `hh_url`.
pub fn test_app_with_hh(
    root: &Path,
    chat: &FakeChat,
    hh_url: &str,
    hh_token: Option<&str>,
) -> AppState {
    let paths = DataPaths::new(root);
    let finder = VacancyFinder::new(
        HhClient::new(Client::new(), hh_token.map(str::to_string)).with_base_url(hh_url),
        HabrClient::new(Client::new()).with_base_url(DEAD_URL),
        Client::new(),
        FinderSettings::default(),
    )
    .with_pacing(Pacing::none());

    AppState {
        api: Arc::new(chat.clone()),
        finder: Arc::new(finder),
        letters: CoverLetterService::template_only(),
        store: Arc::new(tokio::sync::Mutex::new(BotState::load(&paths).unwrap())),
        paths,
        channel: ChatId::Id(-100),
        send_delay: Duration::ZERO,
    }
}
