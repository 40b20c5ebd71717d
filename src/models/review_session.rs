//! Review session over a due queue.
//! Cards graded `again` come back in a further round until every card has passed once.

use super::{Card, Grade, ReviewDirection, due_queue};
use crate::clock::day_key;
use crate::database::store::CardStore;
use crate::error::Result;
use chrono::{DateTime, TimeZone};
use log::warn;

/// Side of the card shown before the answer is revealed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptSide {
    Korean,
    English,
}

struct SessionCard {
    card: Card,
    passed: bool,
}

pub struct ReviewSession {
    pub title: String,
    direction: ReviewDirection,
    cards: Vec<SessionCard>,
    current_round: Vec<usize>,
    current_index: usize,
    pub show_answer: bool,
    pub round_number: usize,
}

impl ReviewSession {
    pub fn new(title: String, queue: Vec<Card>, direction: ReviewDirection) -> Self {
        let cards: Vec<SessionCard> = queue
            .into_iter()
            .map(|card| SessionCard {
                card,
                passed: false,
            })
            .collect();
        let indices = (0..cards.len()).collect();
        Self {
            title,
            direction,
            cards,
            current_round: indices,
            current_index: 0,
            show_answer: false,
            round_number: 1,
        }
    }

    fn current_slot(&self) -> Option<usize> {
        self.current_round.get(self.current_index).copied()
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.current_slot()
            .and_then(|idx| self.cards.get(idx))
            .map(|c| &c.card)
    }

    pub fn prompt_side(&self) -> PromptSide {
        match self.direction {
            ReviewDirection::KoreanToEnglish => PromptSide::Korean,
            ReviewDirection::EnglishToKorean => PromptSide::English,
            ReviewDirection::Both => match self.current_slot() {
                Some(idx) if idx % 2 == 1 => PromptSide::English,
                _ => PromptSide::Korean,
            },
        }
    }

    pub fn reveal(&mut self) {
        self.show_answer = true;
    }

    /// Grades the current card, persists it, counts the review for today and moves on.
    ///
    /// Returns the stored card, or `None` when the session has nothing left to grade.
    pub fn grade_current<S, Tz>(
        &mut self,
        grade: Grade,
        store: &S,
        now: &DateTime<Tz>,
    ) -> Result<Option<Card>>
    where
        S: CardStore + ?Sized,
        Tz: TimeZone,
    {
        let Some(idx) = self.current_slot() else {
            return Ok(None);
        };
        let Some(slot) = self.cards.get_mut(idx) else {
            return Ok(None);
        };

        let graded = due_queue::grade_and_save(store, &slot.card, grade, now)?;
        if let Err(e) = store.record_review(&day_key(now)) {
            // The card is already saved; a missing log entry only affects the daily counter
            warn!("Recording review of card {} failed: {}", graded.id, e);
        }
        slot.card = graded.clone();
        slot.passed = !grade.is_failure();

        self.advance();
        Ok(Some(graded))
    }

    fn advance(&mut self) {
        self.show_answer = false;
        if self.current_index + 1 < self.current_round.len() {
            self.current_index += 1;
        } else {
            self.start_next_round();
        }
    }

    /// Starts a new round with the cards that failed in this one.
    /// If none failed the session is complete.
    fn start_next_round(&mut self) {
        let failed: Vec<usize> = self
            .current_round
            .iter()
            .copied()
            .filter(|&idx| self.cards.get(idx).map(|c| !c.passed).unwrap_or(false))
            .collect();

        if failed.is_empty() {
            self.current_index = self.current_round.len();
            return;
        }

        self.current_round = failed;
        self.current_index = 0;
        self.round_number += 1;
    }

    pub fn passed_count(&self) -> usize {
        self.current_round
            .iter()
            .filter(|&&idx| self.cards.get(idx).map(|c| c.passed).unwrap_or(false))
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.passed_count()
    }

    pub fn is_completed(&self) -> bool {
        self.current_slot().is_none()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} cards", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Relearn): {} cards to retry",
                self.round_number,
                self.total_count()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use chrono::{TimeDelta, Utc};
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 10, 9, 0, 0).unwrap()
    }

    fn setup(n: usize) -> (MemoryStore, Vec<Card>) {
        let deck = Uuid::new_v4();
        let cards: Vec<Card> = (0..n)
            .map(|i| Card::new(deck, &format!("카드 {}", i), "card", &(now() - TimeDelta::days(1))))
            .collect();
        (MemoryStore::with_cards(cards.clone()), cards)
    }

    #[test]
    fn test_all_pass_in_one_round() {
        let (store, cards) = setup(3);
        let mut session = ReviewSession::new("All".into(), cards, ReviewDirection::KoreanToEnglish);
        assert_eq!(session.phase_message(), "Round 1: 3 cards");

        for _ in 0..3 {
            assert!(!session.is_completed());
            session.grade_current(Grade::Good, &store, &now()).unwrap();
        }
        assert!(session.is_completed());
        assert_eq!(session.round_number, 1);
        assert!(store.all_cards().unwrap().iter().all(|c| c.srs.reps == 1));
    }

    #[test]
    fn test_failed_cards_repeat() {
        let (store, cards) = setup(3);
        let failed_id = cards[1].id;
        let mut session = ReviewSession::new("Deck".into(), cards, ReviewDirection::KoreanToEnglish);

        session.grade_current(Grade::Good, &store, &now()).unwrap();
        session.grade_current(Grade::Again, &store, &now()).unwrap();
        session.grade_current(Grade::Easy, &store, &now()).unwrap();

        assert!(!session.is_completed());
        assert_eq!(session.round_number, 2);
        assert_eq!(session.total_count(), 1);
        assert_eq!(session.current_card().unwrap().id, failed_id);
        assert_eq!(session.phase_message(), "Round 2 (Relearn): 1 cards to retry");

        let regraded = session
            .grade_current(Grade::Good, &store, &now())
            .unwrap()
            .unwrap();
        assert_eq!(regraded.srs.lapses, 1);
        assert_eq!(regraded.srs.reps, 1);
        assert!(session.is_completed());
        assert_eq!(store.get(&failed_id).unwrap(), regraded);
    }

    #[test]
    fn test_each_grade_is_counted_for_the_day() {
        let (store, cards) = setup(2);
        let mut session = ReviewSession::new("Deck".into(), cards, ReviewDirection::KoreanToEnglish);
        session.grade_current(Grade::Again, &store, &now()).unwrap();
        session.grade_current(Grade::Good, &store, &now()).unwrap();
        session.grade_current(Grade::Hard, &store, &now()).unwrap();
        assert!(session.is_completed());
        assert_eq!(store.reviews_on("2024-04-10"), 3);
    }

    #[test]
    fn test_empty_session() {
        let store = MemoryStore::new();
        let mut session = ReviewSession::new("Empty".into(), Vec::new(), ReviewDirection::Both);
        assert!(session.is_completed());
        assert!(session.grade_current(Grade::Good, &store, &now()).unwrap().is_none());
    }

    #[test]
    fn test_reveal_resets_after_grading() {
        let (store, cards) = setup(2);
        let mut session = ReviewSession::new("Deck".into(), cards, ReviewDirection::KoreanToEnglish);
        session.reveal();
        assert!(session.show_answer);
        session.grade_current(Grade::Hard, &store, &now()).unwrap();
        assert!(!session.show_answer);
    }

    #[test]
    fn test_prompt_side_follows_direction() {
        let (store, cards) = setup(2);
        let ko = ReviewSession::new("a".into(), cards.clone(), ReviewDirection::KoreanToEnglish);
        assert_eq!(ko.prompt_side(), PromptSide::Korean);
        let en = ReviewSession::new("b".into(), cards.clone(), ReviewDirection::EnglishToKorean);
        assert_eq!(en.prompt_side(), PromptSide::English);

        let mut both = ReviewSession::new("c".into(), cards, ReviewDirection::Both);
        assert_eq!(both.prompt_side(), PromptSide::Korean);
        both.grade_current(Grade::Good, &store, &now()).unwrap();
        assert_eq!(both.prompt_side(), PromptSide::English);
    }
}
