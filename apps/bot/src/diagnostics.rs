//! Setup helpers: finding the chat id and checking the environment.

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::errors::AppError;
use crate::telegram::types::{Chat, Update};
use crate::telegram::ChatApi;

const RULE_WIDTH: usize = 60;

/// Distinct chats that wrote to the bot, in order of first appearance.
pub fn unique_chats(updates: &[Update]) -> Vec<&Chat> {
    let mut seen = HashSet::new();
    updates
        .iter()
        .filter_map(|u| u.message.as_ref().or(u.channel_post.as_ref()))
        .map(|m| &m.chat)
        .filter(|chat| seen.insert(chat.id))
        .collect()
}

pub fn render_chats(chats: &[&Chat]) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    if chats.is_empty() {
        return "\n⚠️ Сообщений не найдено.\n\n📝 ДЕЙСТВИЯ:\n   \
                1. Откройте Telegram\n   \
                2. Найдите вашего бота\n   \
                3. Напишите ему любое сообщение\n   \
                4. Запустите эту команду снова\n"
            .to_string();
    }

    let mut out = "\n✅ Найденные чаты:\n\n".to_string();
    for chat in chats {
        let (label, name_label) = match chat.kind.as_str() {
            "private" => ("👤 ЛИЧНЫЙ ЧАТ", "Имя"),
            "group" | "supergroup" => ("👥 ГРУППА", "Название"),
            "channel" => ("📢 КАНАЛ", "Название"),
            _ => continue,
        };
        let name = match chat.kind.as_str() {
            "private" => chat.first_name.clone(),
            _ => chat.title.clone(),
        }
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "Не указано".to_string());

        let _ = writeln!(out, "  {label}");
        let _ = writeln!(out, "     Chat ID: {}", chat.id);
        let _ = writeln!(out, "     {name_label}: {name}");
        if let Some(username) = &chat.username {
            let _ = writeln!(out, "     Username: @{username}");
        }
        out.push('\n');
    }

    let _ = writeln!(out, "{rule}\n✅ ИСПОЛЬЗУЙТЕ ОДИН ИЗ ЭТИХ CHAT ID:\n{rule}");
    for chat in chats {
        let _ = writeln!(out, "export TELEGRAM_CHAT_ID=\"{}\"", chat.id);
    }
    let _ = writeln!(out, "\nИли обновите файл .env:\nTELEGRAM_CHAT_ID={}", chats[0].id);
    out
}

/// Prints the chats found in pending updates.
pub async fn print_chat_ids(api: &dyn ChatApi) -> Result<(), AppError> {
    let rule = "=".repeat(RULE_WIDTH);
    println!("{rule}\n📱 ПОЛУЧЕНИЕ CHAT ID ДЛЯ TELEGRAM БОТА\n{rule}");
    println!("\n⚠️ ВАЖНО: Chat ID - это НЕ ID бота!");
    println!("   Chat ID - это ID вашего личного чата или канала");

    let updates = api.get_updates(None, 0).await?;
    print!("{}", render_chats(&unique_chats(&updates)));
    Ok(())
}

/// First 20 and last 10 characters of the token.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 30 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..20].iter().collect();
    let tail: String = chars[chars.len() - 10..].iter().collect();
    format!("{head}...{tail}")
}

/// Report for `check-env`; the flag is true when everything required is set.
pub fn env_report(token: Option<&str>, chat_id: Option<&str>) -> (String, bool) {
    let mut out = String::new();
    match token {
        Some(token) => {
            let _ = writeln!(out, "✅ TELEGRAM_BOT_TOKEN: {}", mask_token(token));
        }
        None => out.push_str("❌ TELEGRAM_BOT_TOKEN: НЕ УСТАНОВЛЕН\n"),
    }
    match chat_id {
        Some(chat_id) => {
            let _ = writeln!(out, "✅ TELEGRAM_CHAT_ID: {chat_id}");
        }
        None => out.push_str("❌ TELEGRAM_CHAT_ID: НЕ УСТАНОВЛЕН\n"),
    }

    let ok = token.is_some() && chat_id.is_some();
    let _ = writeln!(out, "\n{}", "=".repeat(50));
    if ok {
        out.push_str("✅ Все переменные установлены! Можно запускать бота.\n");
    } else {
        out.push_str(
            "❌ Не все переменные установлены!\n\nРешение:\n\
             1. Убедитесь, что файл .env существует\n\
             2. Или установите переменные: export TELEGRAM_BOT_TOKEN='...'\n",
        );
    }
    (out, ok)
}
