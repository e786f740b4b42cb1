//! Inline buttons, their callback data, and the reply-keyboard menu.

use std::fmt;

use super::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, ReplyKeyboardMarkup,
};

pub const MENU_FRESH: &str = "🆕 Отправить свежие вакансии";
pub const MENU_SEND: &str = "📤 Отправить вакансии";
pub const MENU_RESUME: &str = "📄 Резюме";
pub const MENU_CLEAR_RESUME: &str = "🗑️ Очистить резюме";
pub const MENU_CLEAR_SENT: &str = "🔄 Очистить отправленные";
pub const MENU_HELP: &str = "ℹ️ Помощь";
pub const MENU_MENU: &str = "📋 Меню";

/// Data carried by an inline button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    Yes(String),
    No(String),
    Apply(String),
    SendMore,
    Start,
    ConfirmPosition(i64),
    ChangePosition(i64),
}

impl Callback {
    pub fn parse(data: &str) -> Option<Self> {
        if data == "send_more" {
            return Some(Callback::SendMore);
        }
        if data == "start" {
            return Some(Callback::Start);
        }
        if let Some(uid) = data.strip_prefix("confirm_position_") {
            return uid.parse().ok().map(Callback::ConfirmPosition);
        }
        if let Some(uid) = data.strip_prefix("change_position_") {
            return uid.parse().ok().map(Callback::ChangePosition);
        }
        let (kind, id) = data.split_once('_')?;
        if id.is_empty() {
            return None;
        }
        match kind {
            "yes" => Some(Callback::Yes(id.to_string())),
            "no" => Some(Callback::No(id.to_string())),
            "apply" => Some(Callback::Apply(id.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Yes(id) => write!(f, "yes_{id}"),
            Callback::No(id) => write!(f, "no_{id}"),
            Callback::Apply(id) => write!(f, "apply_{id}"),
            Callback::SendMore => f.write_str("send_more"),
            Callback::Start => f.write_str("start"),
            Callback::ConfirmPosition(uid) => write!(f, "confirm_position_{uid}"),
            Callback::ChangePosition(uid) => write!(f, "change_position_{uid}"),
        }
    }
}

fn button(text: &str, callback: Callback) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, callback.to_string())
}

/// "Write a cover letter?" choice under each posting.
pub fn vacancy_buttons(vacancy_id: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![vec![
            button("✅ Да, составить", Callback::Yes(vacancy_id.to_string())),
            button("❌ Нет", Callback::No(vacancy_id.to_string())),
        ]],
    }
}

pub fn apply_button(vacancy_id: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![vec![button(
            "📤 Откликнуться на вакансию",
            Callback::Apply(vacancy_id.to_string()),
        )]],
    }
}

pub fn send_more_button() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![vec![button("📤 Отправить ещё вакансии", Callback::SendMore)]],
    }
}

pub fn confirm_position_buttons(user_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![vec![
            button("✅ Да", Callback::ConfirmPosition(user_id)),
            button("❌ Нет, указать другую", Callback::ChangePosition(user_id)),
        ]],
    }
}

pub fn menu_keyboard() -> ReplyKeyboardMarkup {
    let row = |labels: &[&str]| {
        labels
            .iter()
            .map(|text| KeyboardButton {
                text: text.to_string(),
            })
            .collect::<Vec<_>>()
    };
    ReplyKeyboardMarkup {
        keyboard: vec![
            row(&[MENU_FRESH, MENU_SEND]),
            row(&[MENU_RESUME, MENU_CLEAR_RESUME]),
            row(&[MENU_CLEAR_SENT, MENU_HELP]),
            row(&[MENU_MENU]),
        ],
        resize_keyboard: true,
    }
}
