//! Daily progress figures shown on the main screen.
use super::Card;
use crate::clock::{end_of_day, start_of_day};
use chrono::{DateTime, TimeZone};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CardStats {
    pub total_cards: usize,
    /// Cards whose due date falls within today; overdue cards are not counted
    pub due_today: usize,
    pub reviewed_today: u32,
}

impl CardStats {
    pub fn compute<Tz: TimeZone>(cards: &[Card], reviewed_today: u32, now: &DateTime<Tz>) -> Self {
        let start = start_of_day(now);
        let end = end_of_day(now);
        let due_today = cards
            .iter()
            .filter(|c| c.srs.due_at >= start && c.srs.due_at <= end)
            .count();
        Self {
            total_cards: cards.len(),
            due_today,
            reviewed_today,
        }
    }

    /// Fraction of the daily goal reached, capped at 1.0.
    pub fn goal_progress(&self, daily_goal: u32) -> f32 {
        if daily_goal == 0 {
            return 1.0;
        }
        (self.reviewed_today as f32 / daily_goal as f32).min(1.0)
    }
}
