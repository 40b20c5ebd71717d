//! Card is a Korean prompt (front) with its English meaning (back) plus scheduling state.
use super::SchedulingState;
use crate::clock::to_stored;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFront {
    pub hangul: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub romanization: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardBack {
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_ko: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_en: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub front: CardFront,
    pub back: CardBack,
    #[serde(default)]
    pub alt_answers: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub srs: SchedulingState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// New card in `deck_id`, due immediately.
    pub fn new<Tz: TimeZone>(
        deck_id: Uuid,
        hangul: &str,
        meaning: &str,
        created_at: &DateTime<Tz>,
    ) -> Self {
        let stamp = to_stored(created_at);
        Self {
            id: Uuid::new_v4(),
            deck_id,
            front: CardFront {
                hangul: hangul.to_string(),
                romanization: None,
            },
            back: CardBack {
                meaning: meaning.to_string(),
                example_ko: None,
                example_en: None,
            },
            alt_answers: Vec::new(),
            tags: Vec::new(),
            notes: None,
            srs: SchedulingState::new(created_at),
            created_at: stamp,
            updated_at: stamp,
        }
    }

    pub fn with_romanization(mut self, romanization: &str) -> Self {
        self.front.romanization = non_empty(romanization);
        self
    }

    pub fn with_examples(mut self, example_ko: &str, example_en: &str) -> Self {
        self.back.example_ko = non_empty(example_ko);
        self.back.example_en = non_empty(example_en);
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
