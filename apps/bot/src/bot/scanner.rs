//! Background scan for postings published today.

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::{error, info};

use crate::dates;
use crate::finder::dedup_by_url;
use crate::state::AppState;

pub const SCAN_INTERVAL: Duration = Duration::from_secs(30 * 60);

const DEFAULT_POSITIONS: [&str; 2] = ["Product Manager", "Продакт менеджер"];

/// Subscribed positions, or the product-management defaults when nobody has
/// subscribed yet.
pub fn scan_positions(active: BTreeSet<String>) -> BTreeSet<String> {
    if active.is_empty() {
        DEFAULT_POSITIONS.iter().map(|p| p.to_string()).collect()
    } else {
        active
    }
}

/// Searches hh.ru for every position, keeps today's postings and replaces the
/// fresh list. Returns how many postings were stored.
pub async fn scan_fresh(app: &AppState) -> usize {
    let positions = {
        let store = app.store.lock().await;
        scan_positions(store.users.active_positions())
    };
    info!("Scanning fresh postings for {} positions", positions.len());

    let today = dates::today();
    let mut found = Vec::new();
    for position in &positions {
        found.extend(
            app.finder
                .hh()
                .search_position(position)
                .await
                .into_iter()
                .filter(|v| dates::is_from_today(&v.published, today)),
        );
    }
    let fresh = dedup_by_url(found);
    let count = fresh.len();

    if let Err(e) = app.store.lock().await.fresh.replace(fresh, today) {
        error!("Failed to save fresh postings: {e}");
    }
    info!("Stored {count} fresh postings");
    count
}

/// Scans at start-up and then every `SCAN_INTERVAL`.
pub fn spawn(app: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SCAN_INTERVAL);
        loop {
            ticker.tick().await;
            scan_fresh(&app).await;
        }
    })
}
