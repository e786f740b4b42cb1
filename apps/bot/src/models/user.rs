use serde::{Deserialize, Serialize};

/// A user's standing request to receive postings for a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub created_at: String,
}

impl Subscription {
    pub fn activate(position: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            active: true,
            created_at: crate::dates::now_iso(),
        }
    }
}
