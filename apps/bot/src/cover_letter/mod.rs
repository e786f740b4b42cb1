//! Cover letters: language model first, template on any failure.

pub mod requirements;
pub mod template;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::llm_client::prompts::{build_cover_letter_prompt, COVER_LETTER_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};

pub use template::template_letter;

/// Anything that can turn a prompt into letter text.
#[async_trait]
pub trait LetterModel: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl LetterModel for LlmClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        LlmClient::complete(self, prompt, system).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterMethod {
    Openai,
    Template,
}

/// Why the template was used instead of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    NoApiKey,
    RegionForbidden,
    Unauthorized,
    RateLimit,
    Timeout,
    ConnectionError,
    UnknownError,
}

impl FallbackReason {
    pub fn classify(error: &LlmError) -> Self {
        match error {
            LlmError::Http(e) if e.is_timeout() => FallbackReason::Timeout,
            LlmError::Http(e) if e.is_connect() => FallbackReason::ConnectionError,
            LlmError::Api { status, message } => {
                let message = message.to_lowercase();
                if *status == 403
                    || message.contains("unsupported_country")
                    || message.contains("forbidden")
                {
                    FallbackReason::RegionForbidden
                } else if *status == 401 || message.contains("unauthorized") {
                    FallbackReason::Unauthorized
                } else if *status == 429 || message.contains("rate limit") {
                    FallbackReason::RateLimit
                } else {
                    FallbackReason::UnknownError
                }
            }
            _ => FallbackReason::UnknownError,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::NoApiKey => "no_api_key",
            FallbackReason::RegionForbidden => "region_forbidden",
            FallbackReason::Unauthorized => "unauthorized",
            FallbackReason::RateLimit => "rate_limit",
            FallbackReason::Timeout => "timeout",
            FallbackReason::ConnectionError => "connection_error",
            FallbackReason::UnknownError => "unknown_error",
        }
    }

    /// Shown to the user under a template letter.
    pub fn description(&self) -> &'static str {
        match self {
            FallbackReason::NoApiKey => "API ключ OpenAI не установлен",
            FallbackReason::RegionForbidden => "OpenAI недоступен в вашем регионе",
            FallbackReason::Unauthorized => "Неверный API ключ OpenAI",
            FallbackReason::RateLimit => "Превышен лимит запросов к OpenAI",
            FallbackReason::Timeout => "Таймаут при подключении к OpenAI",
            FallbackReason::ConnectionError => "Проблема с подключением к OpenAI",
            FallbackReason::UnknownError => "Ошибка при подключении к OpenAI",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LetterOutcome {
    pub text: String,
    pub method: LetterMethod,
    pub fallback: Option<FallbackReason>,
}

impl LetterOutcome {
    /// HTML footnote naming how the letter was produced.
    pub fn method_note(&self) -> String {
        match (self.method, self.fallback) {
            (LetterMethod::Openai, _) => {
                "✨ <i>Письмо сгенерировано с помощью OpenAI AI</i>".to_string()
            }
            (LetterMethod::Template, Some(reason)) => format!(
                "📋 <i>Письмо сгенерировано по шаблону с анализом резюме</i>\n⚠️ <i>Не удалось использовать OpenAI: {}</i>",
                reason.description()
            ),
            (LetterMethod::Template, None) => {
                "📋 <i>Письмо сгенерировано по шаблону с анализом резюме</i>".to_string()
            }
        }
    }
}

#[derive(Clone)]
pub struct CoverLetterService {
    model: Option<Arc<dyn LetterModel>>,
}

impl CoverLetterService {
    pub fn new(model: Option<Arc<dyn LetterModel>>) -> Self {
        Self { model }
    }

    pub fn template_only() -> Self {
        Self { model: None }
    }

    pub async fn generate(
        &self,
        title: &str,
        company: &str,
        description: Option<&str>,
        resume: Option<&str>,
    ) -> LetterOutcome {
        let fallback = |reason: FallbackReason| LetterOutcome {
            text: template_letter(title, company, description, resume),
            method: LetterMethod::Template,
            fallback: Some(reason),
        };

        let Some(model) = &self.model else {
            info!("No OpenAI key configured, using the template letter");
            return fallback(FallbackReason::NoApiKey);
        };

        let prompt = build_cover_letter_prompt(title, company, description, resume);
        match model.complete(COVER_LETTER_SYSTEM, &prompt).await {
            Ok(text) => {
                info!("Cover letter generated by the language model");
                LetterOutcome {
                    text,
                    method: LetterMethod::Openai,
                    fallback: None,
                }
            }
            Err(e) => {
                let reason = FallbackReason::classify(&e);
                warn!("Language model failed ({}): {e}", reason.as_str());
                fallback(reason)
            }
        }
    }
}
