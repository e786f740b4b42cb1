//! Telegram Bot API over plain HTTPS.
//!
//! All chat traffic goes through the `ChatApi` trait so the bot and the
//! sender can be driven by a recording fake in tests.

pub mod keyboards;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::errors::AppError;

use self::types::{BotInfo, ChatId, EditMessageText, File, Message, SendMessage, Update};

const TELEGRAM_API_URL: &str = "https://api.telegram.org";
/// Must exceed the long-polling timeout passed to `getUpdates`.
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn get_me(&self) -> Result<BotInfo, AppError>;

    async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64)
        -> Result<Vec<Update>, AppError>;

    async fn send_message(&self, message: &SendMessage) -> Result<Message, AppError>;

    async fn edit_message_text(&self, edit: &EditMessageText) -> Result<(), AppError>;

    async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), AppError>;

    async fn get_file(&self, file_id: &str) -> Result<File, AppError>;

    async fn download_file(&self, file_path: &str) -> Result<Bytes, AppError>;
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>) -> Result<Self, AppError> {
        Ok(Self {
            client: Client::builder().timeout(HTTP_TIMEOUT).build()?,
            base_url: TELEGRAM_API_URL.to_string(),
            token: token.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        debug!("Telegram call: {method}");
        let response = self
            .client
            .post(format!("{}/bot{}/{method}", self.base_url, self.token))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let parsed: ApiResponse<T> = serde_json::from_str(&text).map_err(|_| AppError::Telegram {
            code: Some(i64::from(status.as_u16())),
            description: text.chars().take(200).collect(),
        })?;

        match parsed {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            other => Err(AppError::Telegram {
                code: other.error_code,
                description: other
                    .description
                    .unwrap_or_else(|| format!("{method} failed with status {status}")),
            }),
        }
    }
}

#[async_trait]
impl ChatApi for TelegramClient {
    async fn get_me(&self) -> Result<BotInfo, AppError> {
        self.call("getMe", &json!({})).await
    }

    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, AppError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "channel_post", "callback_query"],
            }),
        )
        .await
    }

    async fn send_message(&self, message: &SendMessage) -> Result<Message, AppError> {
        self.call("sendMessage", message).await
    }

    async fn edit_message_text(&self, edit: &EditMessageText) -> Result<(), AppError> {
        // result is either the edited message or `true`
        let _: serde_json::Value = self.call("editMessageText", edit).await?;
        Ok(())
    }

    async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), AppError> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &json!({
                    "callback_query_id": callback_query_id,
                    "text": text,
                    "show_alert": show_alert,
                }),
            )
            .await?;
        Ok(())
    }

    async fn get_file(&self, file_id: &str) -> Result<File, AppError> {
        self.call("getFile", &json!({ "file_id": file_id })).await
    }

    async fn download_file(&self, file_path: &str) -> Result<Bytes, AppError> {
        let response = self
            .client
            .get(format!("{}/file/bot{}/{file_path}", self.base_url, self.token))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Telegram {
                code: Some(i64::from(status.as_u16())),
                description: format!("download of {file_path} failed"),
            });
        }
        Ok(response.bytes().await?)
    }
}

/// Sends `text` as a plain message; used where no formatting or buttons are needed.
pub async fn send_text(
    api: &dyn ChatApi,
    chat_id: impl Into<ChatId>,
    text: impl Into<String>,
) -> Result<Message, AppError> {
    api.send_message(&SendMessage::new(chat_id, text)).await
}
