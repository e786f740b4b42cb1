use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::dates;
use crate::errors::AppError;
use crate::models::Subscription;

#[derive(Debug, Default, Serialize, Deserialize)]
struct UsersFile {
    #[serde(default)]
    positions: BTreeMap<i64, String>,
    #[serde(default)]
    subscriptions: BTreeMap<i64, Subscription>,
    #[serde(default)]
    last_updated: String,
}

/// Desired positions and subscriptions, keyed by chat user id.
#[derive(Debug)]
pub struct UserStore {
    path: PathBuf,
    positions: BTreeMap<i64, String>,
    subscriptions: BTreeMap<i64, Subscription>,
}

impl UserStore {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file: UsersFile = super::load_json(&path);
        Self {
            path,
            positions: file.positions,
            subscriptions: file.subscriptions,
        }
    }

    pub fn position(&self, user_id: i64) -> Option<&str> {
        self.positions.get(&user_id).map(String::as_str)
    }

    pub fn set_position(&mut self, user_id: i64, position: &str) -> Result<(), AppError> {
        let position = position.trim();
        if position.is_empty() {
            return Err(AppError::Validation("position is empty".to_string()));
        }
        self.positions.insert(user_id, position.to_string());
        self.persist()
    }

    pub fn subscription(&self, user_id: i64) -> Option<&Subscription> {
        self.subscriptions.get(&user_id)
    }

    /// Subscribes the user to their stored position.
    pub fn activate(&mut self, user_id: i64) -> Result<Subscription, AppError> {
        let position = self
            .positions
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("no position for user {user_id}")))?;
        let subscription = Subscription::activate(position);
        self.subscriptions.insert(user_id, subscription.clone());
        self.persist()?;
        Ok(subscription)
    }

    pub fn active_positions(&self) -> BTreeSet<String> {
        self.subscriptions
            .values()
            .filter(|s| s.active && !s.position.trim().is_empty())
            .map(|s| s.position.clone())
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.subscriptions.values().filter(|s| s.active).count()
    }

    fn persist(&self) -> Result<(), AppError> {
        super::save_json(
            &self.path,
            &UsersFile {
                positions: self.positions.clone(),
                subscriptions: self.subscriptions.clone(),
                last_updated: dates::now_iso(),
            },
        )
    }
}
