//! Posting delivery: single cards, channel batches, per-user searches and
//! today's fresh postings.

use tracing::{error, info, warn};

use crate::dates;
use crate::errors::AppError;
use crate::models::Vacancy;
use crate::state::AppState;
use crate::store::vacancies;
use crate::telegram::keyboards::{self, menu_keyboard};
use crate::telegram::send_text;
use crate::telegram::types::{ChatId, SendMessage};

use super::messages;
use super::scanner;

pub const BATCH_SIZE: usize = 10;

/// Where a card goes. Only channel deliveries consult and update the
/// sent-URL set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Channel,
    User(i64),
}

impl Delivery {
    fn chat_id(&self, app: &AppState) -> ChatId {
        match self {
            Delivery::Channel => app.channel.clone(),
            Delivery::User(id) => ChatId::Id(*id),
        }
    }
}

/// Sends one posting card with the cover-letter buttons. Returns `false`
/// when the posting was already delivered to the channel.
pub async fn send_vacancy(
    app: &AppState,
    vacancy: &Vacancy,
    delivery: Delivery,
) -> Result<bool, AppError> {
    let id = vacancy.id();
    {
        let mut store = app.store.lock().await;
        if delivery == Delivery::Channel && store.sent.contains(&vacancy.url) {
            info!("Already sent, skipping: {} ({})", vacancy.title, vacancy.url);
            return Ok(false);
        }
        store.vacancy_cache.insert(id.clone(), vacancy.clone());
    }

    let message = SendMessage::new(
        delivery.chat_id(app),
        messages::vacancy_offer(vacancy, dates::now()),
    )
    .html()
    .markup(keyboards::vacancy_buttons(&id));
    app.api.send_message(&message).await?;

    if delivery == Delivery::Channel {
        app.store.lock().await.sent.mark(&vacancy.url)?;
    }
    info!("Sent posting: {} at {}", vacancy.title, vacancy.company);
    Ok(true)
}

/// Next batch of unsent postings from the vacancies file to the channel,
/// followed by a "send more" button when some remain.
pub async fn send_batch(app: &AppState) -> Result<(), AppError> {
    let all = vacancies::load(&app.paths.vacancies_file());
    if all.is_empty() {
        let text = "❌ Нет вакансий для отправки. Убедитесь, что файл с вакансиями существует и содержит данные.";
        send_text(app.api.as_ref(), app.channel.clone(), text).await?;
        return Ok(());
    }

    let fresh: Vec<Vacancy> = {
        let store = app.store.lock().await;
        all.iter()
            .filter(|v| {
                if v.url.is_empty() {
                    warn!("Posting without URL: {}", v.title);
                    return false;
                }
                !store.sent.contains(&v.url)
            })
            .cloned()
            .collect()
    };

    let skipped = all.len() - fresh.len();
    if skipped > 0 {
        info!("Skipped {skipped} postings that were sent before");
    }
    if fresh.is_empty() {
        let text = "ℹ️  Все вакансии уже были отправлены ранее. Используйте /clear_sent для очистки списка.";
        send_text(app.api.as_ref(), app.channel.clone(), text).await?;
        return Ok(());
    }

    let remaining = fresh.len().saturating_sub(BATCH_SIZE);
    let mut sent = 0;
    let mut failed = 0;
    for vacancy in fresh.iter().take(BATCH_SIZE) {
        match send_vacancy(app, vacancy, Delivery::Channel).await {
            Ok(true) => sent += 1,
            Ok(false) => {}
            Err(e) => {
                error!("Failed to send {}: {e}", vacancy.title);
                failed += 1;
            }
        }
        tokio::time::sleep(app.send_delay).await;
    }
    info!("Sent {sent} postings, {failed} failed, {remaining} left");

    if remaining > 0 {
        let message = SendMessage::new(app.channel.clone(), messages::send_more(remaining))
            .html()
            .markup(keyboards::send_more_button());
        if let Err(e) = app.api.send_message(&message).await {
            error!("Failed to send the 'send more' button: {e}");
        }
    }
    Ok(())
}

/// Searches both boards for the user's position and sends the first results
/// to the user directly.
pub async fn send_for_position(app: &AppState, user_id: i64, position: &str) -> Result<(), AppError> {
    app.api
        .send_message(&SendMessage::new(user_id, messages::searching_for(position)).html())
        .await?;

    let found = app.finder.search_for_position(position).await;
    if found.is_empty() {
        send_text(app.api.as_ref(), user_id, messages::nothing_for(position)).await?;
        return Ok(());
    }

    let mut sent = 0;
    for vacancy in found.iter().take(BATCH_SIZE) {
        match send_vacancy(app, vacancy, Delivery::User(user_id)).await {
            Ok(true) => {
                sent += 1;
                tokio::time::sleep(app.send_delay).await;
            }
            Ok(false) => {}
            Err(e) => warn!("Failed to send {} to {user_id}: {e}", vacancy.title),
        }
    }

    send_text(app.api.as_ref(), user_id, format!("✅ Отправлено вакансий: {sent}")).await?;
    Ok(())
}

/// Refreshes today's postings, then sends the user up to a batch of those
/// they have not received yet.
pub async fn send_fresh(app: &AppState, user_id: i64) -> Result<(), AppError> {
    scanner::scan_fresh(app).await;

    let today = dates::today();
    let available = {
        let store = app.store.lock().await;
        store
            .fresh
            .unsent_for(&store.user_sent_fresh.sent_to(user_id), today)
    };

    if available.is_empty() {
        let text = "😔 Нет новых свежих вакансий за сегодня.\n\n\
                    Бот автоматически сканирует hh.ru и обновляет список свежих вакансий.";
        app.api
            .send_message(&SendMessage::new(user_id, text).markup(menu_keyboard()))
            .await?;
        return Ok(());
    }

    let batch: Vec<&Vacancy> = available.iter().take(BATCH_SIZE).collect();
    app.api
        .send_message(
            &SendMessage::new(user_id, messages::fresh_sending(batch.len())).markup(menu_keyboard()),
        )
        .await?;

    let mut delivered = Vec::new();
    for vacancy in batch {
        match send_vacancy(app, vacancy, Delivery::User(user_id)).await {
            Ok(true) => {
                delivered.push(vacancy.url.clone());
                tokio::time::sleep(app.send_delay).await;
            }
            Ok(false) => {}
            Err(e) => error!("Failed to send fresh posting {}: {e}", vacancy.title),
        }
    }

    let sent = delivered.len();
    app.store
        .lock()
        .await
        .user_sent_fresh
        .record(user_id, delivered)?;

    app.api
        .send_message(
            &SendMessage::new(user_id, messages::fresh_done(sent, available.len() - sent))
                .markup(menu_keyboard()),
        )
        .await?;
    Ok(())
}
