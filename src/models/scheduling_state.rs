//! Per-card spaced repetition state.
use super::Grade;
use crate::clock::to_stored;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub const INITIAL_EASE: f64 = 2.5;
pub const MIN_EASE: f64 = 1.3;
pub const MAX_EASE: f64 = 3.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingState {
    /// Easiness factor, kept within [MIN_EASE, MAX_EASE]
    pub ease: f64,
    /// Days until the next review after a successful one
    pub interval: u32,
    /// Earliest instant the card is eligible for review
    pub due_at: DateTime<Utc>,
    /// Consecutive successful reviews
    pub reps: u32,
    /// Failed reviews, never reset
    pub lapses: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_grade: Option<Grade>,
}

impl SchedulingState {
    /// State of a freshly created card, due immediately.
    pub fn new<Tz: TimeZone>(created_at: &DateTime<Tz>) -> Self {
        Self {
            ease: INITIAL_EASE,
            interval: 0,
            due_at: to_stored(created_at),
            reps: 0,
            lapses: 0,
            last_grade: None,
        }
    }

    pub fn ease_in_bounds(&self) -> bool {
        (MIN_EASE..=MAX_EASE).contains(&self.ease)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_initial_defaults() {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap() + TimeDelta::microseconds(1500);
        let state = SchedulingState::new(&created);
        assert_eq!(state.ease, 2.5);
        assert_eq!(state.interval, 0);
        assert_eq!(state.reps, 0);
        assert_eq!(state.lapses, 0);
        assert_eq!(state.last_grade, None);
        assert_eq!(state.due_at, Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap() + TimeDelta::milliseconds(1));
        assert!(state.ease_in_bounds());
    }

    #[test]
    fn test_json_field_names() {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut state = SchedulingState::new(&created);
        state.last_grade = Some(Grade::Good);
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["dueAt"], "2024-06-01T00:00:00Z");
        assert_eq!(value["lastGrade"], "good");
        assert_eq!(value["ease"], 2.5);
    }

    #[test]
    fn test_json_preserves_ease_precision() {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() + TimeDelta::milliseconds(123);
        let mut state = SchedulingState::new(&created);
        state.ease = 1.96;
        let json = serde_json::to_string(&state).unwrap();
        let back: SchedulingState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_missing_last_grade_is_none() {
        let json = r#"{"ease":2.5,"interval":0,"dueAt":"2024-06-01T00:00:00.000Z","reps":0,"lapses":0}"#;
        let state: SchedulingState = serde_json::from_str(json).unwrap();
        assert_eq!(state.last_grade, None);
    }
}
