//! Deck is a named group of cards
use crate::clock::to_stored;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_NEW_PER_DAY: u32 = 10;
pub const DEFAULT_REVIEW_LIMIT: u32 = 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_new_per_day")]
    pub new_per_day: u32,
    #[serde(default = "default_review_limit")]
    pub review_limit: u32,
    pub created_at: DateTime<Utc>,
}

fn default_new_per_day() -> u32 {
    DEFAULT_NEW_PER_DAY
}

fn default_review_limit() -> u32 {
    DEFAULT_REVIEW_LIMIT
}

impl Deck {
    pub fn new<Tz: TimeZone>(name: &str, created_at: &DateTime<Tz>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            new_per_day: DEFAULT_NEW_PER_DAY,
            review_limit: DEFAULT_REVIEW_LIMIT,
            created_at: to_stored(created_at),
        }
    }

    /// Maximum cards in one review of this deck; a `review_limit` of 0 means `fallback`.
    pub fn queue_limit(&self, fallback: usize) -> usize {
        match self.review_limit {
            0 => fallback,
            limit => limit as usize,
        }
    }
}
