//! Card collaborator used by the due queue and review sessions.
//!
//! The scheduler never writes on its own; it reads candidate cards through
//! this trait and hands back new values for the store to persist.

use crate::error::Result;
use crate::models::Card;
use uuid::Uuid;

pub trait CardStore {
    fn all_cards(&self) -> Result<Vec<Card>>;

    fn cards_in_deck(&self, deck_id: &Uuid) -> Result<Vec<Card>>;

    /// Persists the card, replacing any stored version with the same id.
    fn save_card(&self, card: &Card) -> Result<()>;

    /// Counts one review on the calendar day `day` (`YYYY-MM-DD`).
    /// Stores without a review log ignore it.
    fn record_review(&self, _day: &str) -> Result<()> {
        Ok(())
    }
}

impl<S: CardStore + ?Sized> CardStore for &S {
    fn all_cards(&self) -> Result<Vec<Card>> {
        (**self).all_cards()
    }

    fn cards_in_deck(&self, deck_id: &Uuid) -> Result<Vec<Card>> {
        (**self).cards_in_deck(deck_id)
    }

    fn save_card(&self, card: &Card) -> Result<()> {
        (**self).save_card(card)
    }

    fn record_review(&self, day: &str) -> Result<()> {
        (**self).record_review(day)
    }
}
