//! User-facing texts. Russian, HTML where formatting is used; values that
//! come from scraped pages or users are escaped.

use chrono::NaiveDateTime;
use html_escape::encode_text;

use crate::cover_letter::LetterOutcome;
use crate::dates;
use crate::models::Vacancy;

pub const GREETING: &str = "Привет! Я помогу тебе с поиском работы. Просто отправь своё резюме в формате word или pdf, я возьму из него твою должность и ожидания по заработной плате, если они там указаны. Дальше я буду отправлять тебе актуальные вакансии";

pub const LETTER_QUESTION: &str = "❓ <b>Необходимо ли составить сопроводительное письмо?</b>";

pub const HELP: &str = "ℹ️ <b>Справка по использованию бота</b>\n\n\
<b>Основные команды:</b>\n\
/start - запустить бота и показать приветствие\n\
/send - отправить новые вакансии из файла\n\
/menu - показать меню с кнопками\n\
/help - показать эту справку\n\n\
<b>Работа с резюме:</b>\n\
/resume - загрузить резюме (файл или текст)\n\
/clear_resume - удалить загруженное резюме\n\n\
<b>Управление вакансиями:</b>\n\
/clear_sent - очистить список отправленных вакансий\n\n\
<b>Свежие вакансии:</b>\n\
🆕 Кнопка 'Отправить свежие вакансии' отправляет 10 вакансий за сегодня.\n\
Бот автоматически сканирует hh.ru каждые 30 минут.\n\n\
<b>Как использовать:</b>\n\
1. Загрузите резюме командой /resume или через меню\n\
2. Отправьте вакансии командой /send или через меню\n\
3. Для каждой вакансии выберите, нужно ли сопроводительное письмо\n\
4. Если нужно - бот сгенерирует письмо на основе вашего резюме\n\n\
💡 Используйте кнопки меню для быстрого доступа к функциям!";

pub const NO_RESUME: &str = "❌ Резюме не найдено.\n\n\
Загрузите резюме:\n\
- Отправьте файл (PDF, DOCX)\n\
- Или отправьте текст резюме сообщением";

pub const HH_TOKEN_HELP: &str = "⚠️ Для отклика на вакансии необходим токен доступа к HH API.\n\n\
Получите токен:\n\
1. Зайдите на https://hh.ru/account/applications\n\
2. Создайте приложение\n\
3. Скопируйте Access Token\n\
4. Добавьте в .env: HH_ACCESS_TOKEN=ваш_токен";

const RULE: &str = "─────────────────────";
const RESUME_PREVIEW: usize = 500;

pub fn menu(sent_count: usize) -> String {
    format!(
        "📋 <b>Меню бота</b>\n\n\
         Доступные функции:\n\n\
         🆕 <b>Отправить свежие вакансии</b> - вакансии за сегодня по вашей должности\n\
         📤 <b>Отправить вакансии</b> - отправить новые вакансии из файла\n\
         📄 <b>Резюме</b> - загрузить или посмотреть резюме\n\
         🗑️ <b>Очистить резюме</b> - удалить загруженное резюме\n\
         🔄 <b>Очистить отправленные</b> - очистить список отправленных вакансий\n\
         ℹ️ <b>Помощь</b> - показать справку\n\
         📋 <b>Меню</b> - показать это меню\n\n\
         📊 Отправлено вакансий ранее: {sent_count}"
    )
}

/// Posting card with an optional relative publication date.
pub fn vacancy_card(vacancy: &Vacancy, now: NaiveDateTime) -> String {
    let mut message = format!(
        "🎯 <b>{}</b>\n\n🏢 Компания: {}\n📍 Локация: {}\n💰 Зарплата: {}\n📅 Источник: {}",
        encode_text(&vacancy.title),
        encode_text(&vacancy.company),
        encode_text(&vacancy.location),
        encode_text(&vacancy.salary),
        encode_text(&vacancy.source),
    );
    let published = dates::format_relative(&vacancy.published, now);
    if !published.is_empty() {
        message.push_str(&format!("\n📆 Опубликовано: {published}"));
    }
    message.push_str(&format!("\n🔗 Ссылка: {}", encode_text(&vacancy.url)));
    message
}

pub fn vacancy_offer(vacancy: &Vacancy, now: NaiveDateTime) -> String {
    format!("{}\n\n{LETTER_QUESTION}", vacancy_card(vacancy, now))
}

pub fn cover_letter(vacancy: &Vacancy, outcome: &LetterOutcome) -> String {
    format!(
        "📝 <b>Сопроводительное письмо</b>\n\n\
         <b>Вакансия:</b> {}\n\
         <b>Компания:</b> {}\n\n\
         {RULE}\n\n\
         {}\n\n\
         {RULE}\n\
         {}\n\n\
         <b>Ссылка на вакансию:</b> {}",
        encode_text(&vacancy.title),
        encode_text(&vacancy.company),
        encode_text(&outcome.text),
        outcome.method_note(),
        encode_text(&vacancy.url),
    )
}

pub fn send_more(remaining: usize) -> String {
    format!(
        "✅ Отправлено 10 вакансий!\n\n📊 Осталось вакансий: {remaining}\n\nНажмите кнопку, чтобы отправить ещё 10 вакансий."
    )
}

pub fn resume_saved(chars: usize) -> String {
    format!(
        "✅ Резюме сохранено!\n\n\
         📄 Размер: {chars} символов\n\n\
         Теперь при составлении сопроводительных писем ИИ будет использовать информацию из вашего резюме.\n\n\
         Используйте /resume для просмотра или /clear_resume для удаления."
    )
}

pub fn resume_preview(resume: &str) -> String {
    let total = resume.chars().count();
    let preview = if total > RESUME_PREVIEW {
        format!("{}...", resume.chars().take(RESUME_PREVIEW).collect::<String>())
    } else {
        resume.to_string()
    };
    format!(
        "📄 Ваше резюме:\n\n{preview}\n\nПолный размер: {total} символов\n\nИспользуйте /clear_resume для удаления."
    )
}

pub fn position_found(position: &str, salary: Option<&str>) -> String {
    let mut message = format!(
        "Я определил вашу желаемую должность как <b>{}</b>",
        encode_text(position)
    );
    if let Some(salary) = salary {
        message.push_str(&format!(
            "\n\n💰 Желаемая зарплата: <b>{}</b>",
            encode_text(salary)
        ));
    }
    message.push_str("\n\nВерно?");
    message
}

pub fn position_entered(position: &str) -> String {
    format!(
        "Вы указали должность <b>{}</b>\n\nВерно?",
        encode_text(position)
    )
}

pub fn position_missing(salary: Option<&str>) -> String {
    let mut message = "✅ Резюме загружено!\n\n".to_string();
    if let Some(salary) = salary {
        message.push_str(&format!(
            "💰 Я определил вашу желаемую зарплату: <b>{}</b>\n\n",
            encode_text(salary)
        ));
    }
    message.push_str(
        "Не удалось автоматически определить желаемую должность.\n\
         Пожалуйста, отправьте название должности текстовым сообщением.",
    );
    message
}

pub fn searching_for(position: &str) -> String {
    format!("🔍 Ищу вакансии по запросу: <b>{}</b>...", encode_text(position))
}

pub fn nothing_for(position: &str) -> String {
    format!(
        "😔 По запросу '{position}' вакансий не найдено. Попробуйте изменить название должности."
    )
}

pub fn fresh_sending(count: usize) -> String {
    format!("🆕 Отправляю {count} свежих вакансий за сегодня...")
}

pub fn fresh_done(sent: usize, remaining: usize) -> String {
    format!(
        "✅ Отправлено {sent} свежих вакансий за сегодня!\n\n\
         📊 Осталось новых вакансий: {remaining}\n\n\
         Нажмите кнопку ещё раз, чтобы получить следующую порцию."
    )
}

/// Standard application text when no tailored letter is available.
pub fn application_text(has_resume: bool) -> String {
    if has_resume {
        "Здравствуйте!\n\n\
         Меня заинтересовала данная вакансия. \
         Мой опыт и навыки соответствуют требованиям позиции. \
         Буду рад обсудить детали в личной беседе.\n\n\
         С уважением"
            .to_string()
    } else {
        "Здравствуйте!\n\n\
         Меня заинтересовала данная вакансия. \
         Буду рад обсудить детали в личной беседе.\n\n\
         С уважением"
            .to_string()
    }
}
