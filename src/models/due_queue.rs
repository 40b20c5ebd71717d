//! Due card selection.
//!
//! A card is due when its `due_at` falls on or before the last millisecond of
//! the current calendar day, so overdue cards from earlier days are included.
//! The queue is ordered by due date (oldest first), ties broken by card id.

use super::{Card, Grade, sm2};
use crate::clock::{Clock, end_of_day};
use crate::database::store::CardStore;
use crate::error::Result;
use chrono::{DateTime, TimeZone};
use log::debug;
use uuid::Uuid;

/// Returns at most `limit` cards due by the end of `now`'s day, optionally restricted to one deck.
pub fn build_due_queue<S, Tz>(
    store: &S,
    deck_filter: Option<&Uuid>,
    limit: usize,
    now: &DateTime<Tz>,
) -> Result<Vec<Card>>
where
    S: CardStore + ?Sized,
    Tz: TimeZone,
{
    let window_end = end_of_day(now);
    let candidates = match deck_filter {
        Some(deck_id) => store.cards_in_deck(deck_id)?,
        None => store.all_cards()?,
    };
    let candidate_count = candidates.len();

    let mut due: Vec<Card> = candidates
        .into_iter()
        .filter(|c| c.srs.due_at <= window_end)
        .collect();
    due.sort_by(|a, b| a.srs.due_at.cmp(&b.srs.due_at).then_with(|| a.id.cmp(&b.id)));
    due.truncate(limit);

    debug!(
        "Due queue: {} of {} candidates (deck {:?}, limit {}, window end {})",
        due.len(),
        candidate_count,
        deck_filter,
        limit,
        window_end
    );
    Ok(due)
}

/// [`build_due_queue`] evaluated at the clock's current instant.
pub fn build_due_queue_with_clock<S, C>(
    store: &S,
    deck_filter: Option<&Uuid>,
    limit: usize,
    clock: &C,
) -> Result<Vec<Card>>
where
    S: CardStore + ?Sized,
    C: Clock,
{
    build_due_queue(store, deck_filter, limit, &clock.now())
}

/// Grades `card` and persists the result through `store`.
///
/// Callers must not grade the same card concurrently; the read-modify-write is
/// only atomic per call.
pub fn grade_and_save<S, Tz>(store: &S, card: &Card, grade: Grade, now: &DateTime<Tz>) -> Result<Card>
where
    S: CardStore + ?Sized,
    Tz: TimeZone,
{
    let graded = sm2::grade_card(card, grade, now);
    store.save_card(&graded)?;
    debug!(
        "Graded card {} as {}: interval {}d, ease {:.2}, due {}",
        graded.id, grade, graded.srs.interval, graded.srs.ease, graded.srs.due_at
    );
    Ok(graded)
}
