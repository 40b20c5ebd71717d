//! In-memory card store, iterated in insertion order.
use super::store::CardStore;
use crate::error::Result;
use crate::models::Card;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    cards: Mutex<Vec<Card>>,
    reviews: Mutex<HashMap<String, u32>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self {
            cards: Mutex::new(cards),
            reviews: Mutex::default(),
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<Card> {
        self.lock().iter().find(|c| c.id == *id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reviews recorded for the calendar day `day`.
    pub fn reviews_on(&self, day: &str) -> u32 {
        self.review_log().get(day).copied().unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Card>> {
        // A panic while holding the lock cannot leave a half-written Vec behind
        self.cards.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn review_log(&self) -> MutexGuard<'_, HashMap<String, u32>> {
        self.reviews.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CardStore for MemoryStore {
    fn all_cards(&self) -> Result<Vec<Card>> {
        Ok(self.lock().clone())
    }

    fn cards_in_deck(&self, deck_id: &Uuid) -> Result<Vec<Card>> {
        Ok(self
            .lock()
            .iter()
            .filter(|c| c.deck_id == *deck_id)
            .cloned()
            .collect())
    }

    fn save_card(&self, card: &Card) -> Result<()> {
        let mut cards = self.lock();
        match cards.iter_mut().find(|c| c.id == card.id) {
            Some(existing) => *existing = card.clone(),
            None => cards.push(card.clone()),
        }
        Ok(())
    }

    fn record_review(&self, day: &str) -> Result<()> {
        let mut reviews = self.review_log();
        let count = reviews.entry(day.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        Ok(())
    }
}
