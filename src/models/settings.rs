//! Study preferences persisted alongside the cards.
//!
//! Every field has a serde default so rows written by older versions, or
//! partially corrupted ones, still load.
use serde::{Deserialize, Serialize};

pub const DEFAULT_DAILY_GOAL: u32 = 20;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
    #[default]
    System,
}

/// Which side of the card is shown as the prompt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewDirection {
    #[default]
    #[serde(rename = "ko2en")]
    KoreanToEnglish,
    #[serde(rename = "en2ko")]
    EnglishToKorean,
    #[serde(rename = "both")]
    Both,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypingTolerance {
    pub normalize_hangul: bool,
    pub ignore_punctuation: bool,
}

impl Default for TypingTolerance {
    fn default() -> Self {
        Self {
            normalize_hangul: true,
            ignore_punctuation: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    pub font: String,
    pub language: String,
    pub typing_tolerance: TypingTolerance,
    pub review_direction: ReviewDirection,
    pub daily_goal: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            font: "system".to_string(),
            language: "en".to_string(),
            typing_tolerance: TypingTolerance::default(),
            review_direction: ReviewDirection::default(),
            daily_goal: DEFAULT_DAILY_GOAL,
        }
    }
}

impl Settings {
    /// Parses a stored settings row, falling back to defaults field by field.
    pub fn from_stored(raw: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(_) => return Self::default(),
        };
        let mut settings = Self::default();
        let serde_json::Value::Object(fields) = value else {
            return settings;
        };
        for (key, field) in fields {
            let applied = match key.as_str() {
                "theme" => serde_json::from_value(field).map(|v| settings.theme = v),
                "font" => serde_json::from_value(field).map(|v| settings.font = v),
                "typingTolerance" => {
                    serde_json::from_value(field).map(|v| settings.typing_tolerance = v)
                }
                "reviewDirection" => {
                    serde_json::from_value(field).map(|v| settings.review_direction = v)
                }
                "dailyGoal" => serde_json::from_value::<u32>(field)
                    .map(|v| settings.daily_goal = v.max(1)),
                _ => Ok(()),
            };
            if let Err(e) = applied {
                log::warn!("Ignoring malformed setting '{}': {}", key, e);
            }
        }
        settings
    }
}
