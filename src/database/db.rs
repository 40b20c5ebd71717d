//! Database operations for the study app
//!
//! Handles SQLite initialization, CRUD for decks and cards (including their
//! scheduling state), settings, the simulated day offset and the per-day review log.
//! Instants are stored as INTEGER unix milliseconds.

use super::store::CardStore;
use crate::clock::day_key;
use crate::error::{Error, Result};
use crate::models::{Card, CardBack, CardFront, CardStats, Deck, Grade, SchedulingState, Settings};
use chrono::{DateTime, TimeZone, Utc};
use log::{debug, info};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS decks (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        description TEXT,
        new_per_day INTEGER NOT NULL DEFAULT 10,
        review_limit INTEGER NOT NULL DEFAULT 100,
        created_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS cards (
        id TEXT PRIMARY KEY,
        deck_id TEXT NOT NULL,
        hangul TEXT NOT NULL,
        romanization TEXT,
        meaning TEXT NOT NULL,
        example_ko TEXT,
        example_en TEXT,
        alt_answers TEXT NOT NULL DEFAULT '[]',
        tags TEXT NOT NULL DEFAULT '[]',
        notes TEXT,
        ease REAL NOT NULL DEFAULT 2.5,
        interval_days INTEGER NOT NULL DEFAULT 0,
        due_at INTEGER NOT NULL,
        reps INTEGER NOT NULL DEFAULT 0,
        lapses INTEGER NOT NULL DEFAULT 0,
        last_grade TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        FOREIGN KEY (deck_id) REFERENCES decks(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_cards_deck ON cards(deck_id);
    CREATE INDEX IF NOT EXISTS idx_cards_due ON cards(due_at);

    CREATE TABLE IF NOT EXISTS app_state (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS review_logs (
        day TEXT PRIMARY KEY,
        count INTEGER NOT NULL
    );
";

const DECK_COLUMNS: &str = "id, name, description, new_per_day, review_limit, created_at";

const CARD_COLUMNS: &str = "id, deck_id, hangul, romanization, meaning, example_ko, example_en,
     alt_answers, tags, notes, ease, interval_days, due_at, reps, lapses, last_grade,
     created_at, updated_at";

const KEY_DAY_OFFSET: &str = "day_offset";
const KEY_SETTINGS: &str = "settings";

/// Opens (creating if needed) the database file and ensures the schema exists.
pub fn init_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    info!("Opened database at {}", path.display());
    Ok(conn)
}

/// Fresh in-memory database with the full schema.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES (?1, '0')",
        params![KEY_DAY_OFFSET],
    )?;
    Ok(())
}

fn conversion_error(idx: usize, err: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn uuid_column(row: &Row, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn instant_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| conversion_error(idx, Error::InvalidTimestamp(millis)))
}

fn string_list_column(row: &Row, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn grade_column(row: &Row, idx: usize) -> rusqlite::Result<Option<Grade>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|g| {
        g.parse::<Grade>().map_err(|_| {
            conversion_error(
                idx,
                Error::InvalidColumn {
                    column: "last_grade",
                    value: g.clone(),
                },
            )
        })
    })
    .transpose()
}

fn deck_from_row(row: &Row) -> rusqlite::Result<Deck> {
    Ok(Deck {
        id: uuid_column(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        new_per_day: row.get(3)?,
        review_limit: row.get(4)?,
        created_at: instant_column(row, 5)?,
    })
}

fn card_from_row(row: &Row) -> rusqlite::Result<Card> {
    Ok(Card {
        id: uuid_column(row, 0)?,
        deck_id: uuid_column(row, 1)?,
        front: CardFront {
            hangul: row.get(2)?,
            romanization: row.get(3)?,
        },
        back: CardBack {
            meaning: row.get(4)?,
            example_ko: row.get(5)?,
            example_en: row.get(6)?,
        },
        alt_answers: string_list_column(row, 7)?,
        tags: string_list_column(row, 8)?,
        notes: row.get(9)?,
        srs: SchedulingState {
            ease: row.get(10)?,
            interval: row.get(11)?,
            due_at: instant_column(row, 12)?,
            reps: row.get(13)?,
            lapses: row.get(14)?,
            last_grade: grade_column(row, 15)?,
        },
        created_at: instant_column(row, 16)?,
        updated_at: instant_column(row, 17)?,
    })
}

/* ---------- Simulated day offset ---------- */

/// Number of days the app clock has been pushed forward.
pub fn get_day_offset(conn: &Connection) -> Result<i64> {
    let value: String = conn.query_row(
        "SELECT value FROM app_state WHERE key = ?1",
        params![KEY_DAY_OFFSET],
        |row| row.get(0),
    )?;
    Ok(value.trim().parse::<i64>().unwrap_or(0))
}

/// Advances the simulated clock by one day and returns the new offset.
pub fn advance_day(conn: &Connection) -> Result<i64> {
    let next = get_day_offset(conn)? + 1;
    conn.execute(
        "UPDATE app_state SET value = ?1 WHERE key = ?2",
        params![next.to_string(), KEY_DAY_OFFSET],
    )?;
    info!("Simulated clock advanced to day +{}", next);
    Ok(next)
}

pub fn reset_day_offset(conn: &Connection) -> Result<()> {
    conn.execute(
        "UPDATE app_state SET value = '0' WHERE key = ?1",
        params![KEY_DAY_OFFSET],
    )?;
    Ok(())
}

/* ---------- Decks ---------- */

/// Creates a new deck, rejecting duplicate names.
pub fn new_deck<Tz: TimeZone>(name: &str, now: &DateTime<Tz>, conn: &Connection) -> Result<Deck> {
    let name = name.trim();
    if find_deck_by_name(name, conn)?.is_some() {
        return Err(Error::DuplicateDeck(name.to_string()));
    }
    let deck = Deck::new(name, now);
    insert_deck(&deck, conn)?;
    info!("Deck '{}' created", deck.name);
    Ok(deck)
}

pub fn insert_deck(deck: &Deck, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO decks (id, name, description, new_per_day, review_limit, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            deck.id.to_string(),
            deck.name,
            deck.description,
            deck.new_per_day,
            deck.review_limit,
            deck.created_at.timestamp_millis()
        ],
    )?;
    Ok(())
}

/// All decks, oldest first.
pub fn get_all_decks(conn: &Connection) -> Result<Vec<Deck>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM decks ORDER BY created_at ASC, name ASC",
        DECK_COLUMNS
    ))?;
    let decks = stmt
        .query_map([], deck_from_row)?
        .collect::<rusqlite::Result<Vec<Deck>>>()?;
    Ok(decks)
}

pub fn get_deck(id: &Uuid, conn: &Connection) -> Result<Deck> {
    conn.query_row(
        &format!("SELECT {} FROM decks WHERE id = ?1", DECK_COLUMNS),
        params![id.to_string()],
        deck_from_row,
    )
    .optional()?
    .ok_or(Error::DeckNotFound(*id))
}

pub fn find_deck_by_name(name: &str, conn: &Connection) -> Result<Option<Deck>> {
    let deck = conn
        .query_row(
            &format!("SELECT {} FROM decks WHERE name = ?1", DECK_COLUMNS),
            params![name],
            deck_from_row,
        )
        .optional()?;
    Ok(deck)
}

/// Deletes a deck together with its cards.
pub fn delete_deck(id: &Uuid, conn: &Connection) -> Result<()> {
    let removed = conn.execute("DELETE FROM decks WHERE id = ?1", params![id.to_string()])?;
    if removed == 0 {
        return Err(Error::DeckNotFound(*id));
    }
    info!("Deck {} deleted", id);
    Ok(())
}

/* ---------- Cards ---------- */

fn upsert_card(card: &Card, conn: &Connection) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO cards ({}) VALUES
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
             ON CONFLICT(id) DO UPDATE SET
                deck_id = excluded.deck_id, hangul = excluded.hangul,
                romanization = excluded.romanization, meaning = excluded.meaning,
                example_ko = excluded.example_ko, example_en = excluded.example_en,
                alt_answers = excluded.alt_answers, tags = excluded.tags, notes = excluded.notes,
                ease = excluded.ease, interval_days = excluded.interval_days,
                due_at = excluded.due_at, reps = excluded.reps, lapses = excluded.lapses,
                last_grade = excluded.last_grade, created_at = excluded.created_at,
                updated_at = excluded.updated_at",
            CARD_COLUMNS
        ),
        params![
            card.id.to_string(),
            card.deck_id.to_string(),
            card.front.hangul,
            card.front.romanization,
            card.back.meaning,
            card.back.example_ko,
            card.back.example_en,
            serde_json::to_string(&card.alt_answers)?,
            serde_json::to_string(&card.tags)?,
            card.notes,
            card.srs.ease,
            card.srs.interval,
            card.srs.due_at.timestamp_millis(),
            card.srs.reps,
            card.srs.lapses,
            card.srs.last_grade.map(|g| g.as_str()),
            card.created_at.timestamp_millis(),
            card.updated_at.timestamp_millis()
        ],
    )?;
    Ok(())
}

/// Adds a card to an existing deck.
pub fn add_card(card: &Card, conn: &Connection) -> Result<()> {
    get_deck(&card.deck_id, conn)?;
    upsert_card(card, conn)?;
    debug!("Card {} ('{}') added to deck {}", card.id, card.front.hangul, card.deck_id);
    Ok(())
}

/// Creates a card with initial scheduling state in the given deck.
pub fn new_card<Tz: TimeZone>(
    deck_id: &Uuid,
    hangul: &str,
    meaning: &str,
    romanization: &str,
    now: &DateTime<Tz>,
    conn: &Connection,
) -> Result<Card> {
    let card = Card::new(*deck_id, hangul.trim(), meaning.trim(), now).with_romanization(romanization);
    add_card(&card, conn)?;
    Ok(card)
}

/// Replaces a stored card's content and scheduling state.
pub fn update_card(card: &Card, conn: &Connection) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM cards WHERE id = ?1)",
        params![card.id.to_string()],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(Error::CardNotFound(card.id));
    }
    upsert_card(card, conn)
}

pub fn get_card(id: &Uuid, conn: &Connection) -> Result<Card> {
    conn.query_row(
        &format!("SELECT {} FROM cards WHERE id = ?1", CARD_COLUMNS),
        params![id.to_string()],
        card_from_row,
    )
    .optional()?
    .ok_or(Error::CardNotFound(*id))
}

/// All cards in creation order.
pub fn get_all_cards(conn: &Connection) -> Result<Vec<Card>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM cards ORDER BY created_at ASC, rowid ASC",
        CARD_COLUMNS
    ))?;
    let cards = stmt
        .query_map([], card_from_row)?
        .collect::<rusqlite::Result<Vec<Card>>>()?;
    Ok(cards)
}

pub fn get_cards_for_deck(deck_id: &Uuid, conn: &Connection) -> Result<Vec<Card>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM cards WHERE deck_id = ?1 ORDER BY created_at ASC, rowid ASC",
        CARD_COLUMNS
    ))?;
    let cards = stmt
        .query_map(params![deck_id.to_string()], card_from_row)?
        .collect::<rusqlite::Result<Vec<Card>>>()?;
    Ok(cards)
}

pub fn delete_card(id: &Uuid, conn: &Connection) -> Result<()> {
    let removed = conn.execute("DELETE FROM cards WHERE id = ?1", params![id.to_string()])?;
    if removed == 0 {
        return Err(Error::CardNotFound(*id));
    }
    Ok(())
}

pub fn count_cards(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?;
    Ok(count.max(0) as usize)
}

/// Number of cards per deck id; decks without cards are absent.
pub fn deck_card_counts(conn: &Connection) -> Result<HashMap<Uuid, usize>> {
    let mut stmt = conn.prepare("SELECT deck_id, COUNT(*) FROM cards GROUP BY deck_id")?;
    let counts = stmt
        .query_map([], |row| {
            let count: i64 = row.get(1)?;
            Ok((uuid_column(row, 0)?, count.max(0) as usize))
        })?
        .collect::<rusqlite::Result<HashMap<Uuid, usize>>>()?;
    Ok(counts)
}

/// Replaces every deck and card (and settings when given) in one transaction.
pub fn replace_all(
    decks: &[Deck],
    cards: &[Card],
    settings: Option<&Settings>,
    conn: &mut Connection,
) -> Result<()> {
    let tx: Transaction = conn.transaction()?;
    tx.execute("DELETE FROM cards", [])?;
    tx.execute("DELETE FROM decks", [])?;
    for deck in decks {
        insert_deck(deck, &tx)?;
    }
    for card in cards {
        upsert_card(card, &tx)?;
    }
    if let Some(settings) = settings {
        save_settings(settings, &tx)?;
    }
    tx.commit()?;
    info!("Replaced store with {} decks and {} cards", decks.len(), cards.len());
    Ok(())
}

/* ---------- Settings ---------- */

pub fn get_settings(conn: &Connection) -> Result<Settings> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM app_state WHERE key = ?1",
            params![KEY_SETTINGS],
            |row| row.get(0),
        )
        .optional()?;
    Ok(raw.map(|r| Settings::from_stored(&r)).unwrap_or_default())
}

pub fn save_settings(settings: &Settings, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO app_state (key, value) VALUES (?1, ?2)",
        params![KEY_SETTINGS, serde_json::to_string(settings)?],
    )?;
    Ok(())
}

/// Stores the daily review goal, never below one.
pub fn set_daily_goal(goal: u32, conn: &Connection) -> Result<Settings> {
    let mut settings = get_settings(conn)?;
    settings.daily_goal = goal.max(1);
    save_settings(&settings, conn)?;
    Ok(settings)
}

/* ---------- Review log & stats ---------- */

/// Counts one review on `now`'s calendar day.
pub fn log_review<Tz: TimeZone>(now: &DateTime<Tz>, conn: &Connection) -> Result<()> {
    log_review_on(&day_key(now), conn)
}

fn log_review_on(day: &str, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO review_logs (day, count) VALUES (?1, 1)
         ON CONFLICT(day) DO UPDATE SET count = count + 1",
        params![day],
    )?;
    Ok(())
}

pub fn reviews_on<Tz: TimeZone>(now: &DateTime<Tz>, conn: &Connection) -> Result<u32> {
    let count: Option<u32> = conn
        .query_row(
            "SELECT count FROM review_logs WHERE day = ?1",
            params![day_key(now)],
            |row| row.get(0),
        )
        .optional()?;
    Ok(count.unwrap_or(0))
}

pub fn card_stats<Tz: TimeZone>(now: &DateTime<Tz>, conn: &Connection) -> Result<CardStats> {
    let cards = get_all_cards(conn)?;
    let reviewed = reviews_on(now, conn)?;
    Ok(CardStats::compute(&cards, reviewed, now))
}

impl CardStore for Connection {
    fn all_cards(&self) -> Result<Vec<Card>> {
        get_all_cards(self)
    }

    fn cards_in_deck(&self, deck_id: &Uuid) -> Result<Vec<Card>> {
        get_cards_for_deck(deck_id, self)
    }

    fn save_card(&self, card: &Card) -> Result<()> {
        upsert_card(card, self)
    }

    fn record_review(&self, day: &str) -> Result<()> {
        log_review_on(day, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReviewDirection, ReviewSession, Theme, build_due_queue, grade_and_save};
    use chrono::TimeDelta;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 8, 15, 30).unwrap() + TimeDelta::milliseconds(250)
    }

    #[test]
    fn test_init_database_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("srs.sqlite3");
        {
            let conn = init_database(&path).unwrap();
            new_deck("Beginner Vocabulary", &now(), &conn).unwrap();
        }
        let conn = init_database(&path).unwrap();
        assert_eq!(get_all_decks(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_deck_rejected() {
        let conn = open_in_memory().unwrap();
        new_deck("Grammar", &now(), &conn).unwrap();
        let err = new_deck("Grammar", &now(), &conn).unwrap_err();
        assert!(matches!(err, Error::DuplicateDeck(name) if name == "Grammar"));
    }

    #[test]
    fn test_card_roundtrip_is_lossless() {
        let conn = open_in_memory().unwrap();
        let deck = new_deck("Vocab", &now(), &conn).unwrap();
        let mut card = Card::new(deck.id, "괜찮아요", "It's okay", &now())
            .with_romanization("gwaenchanayo")
            .with_examples("정말 괜찮아요.", "It's really okay.")
            .with_tags(&["polite", "phrases"]);
        card.alt_answers = vec!["no problem".into()];
        card.notes = Some("common reply".into());
        card.srs.ease = 1.96;
        card.srs.interval = 8;
        card.srs.reps = 3;
        card.srs.lapses = 2;
        card.srs.last_grade = Some(Grade::Hard);
        add_card(&card, &conn).unwrap();

        assert_eq!(get_card(&card.id, &conn).unwrap(), card);
    }

    #[test]
    fn test_add_card_requires_deck() {
        let conn = open_in_memory().unwrap();
        let card = Card::new(Uuid::new_v4(), "물", "Water", &now());
        assert!(matches!(add_card(&card, &conn), Err(Error::DeckNotFound(_))));
    }

    #[test]
    fn test_update_and_delete_card() {
        let conn = open_in_memory().unwrap();
        let deck = new_deck("Vocab", &now(), &conn).unwrap();
        let mut card = new_card(&deck.id, " 병원 ", "Hospital", "byeongwon", &now(), &conn).unwrap();
        assert_eq!(card.front.hangul, "병원");

        card.back.meaning = "Hospital / clinic".into();
        update_card(&card, &conn).unwrap();
        assert_eq!(get_card(&card.id, &conn).unwrap().back.meaning, "Hospital / clinic");

        delete_card(&card.id, &conn).unwrap();
        assert!(matches!(get_card(&card.id, &conn), Err(Error::CardNotFound(_))));
        assert!(matches!(update_card(&card, &conn), Err(Error::CardNotFound(_))));
    }

    #[test]
    fn test_delete_deck_cascades() {
        let conn = open_in_memory().unwrap();
        let keep = new_deck("Keep", &now(), &conn).unwrap();
        let drop = new_deck("Drop", &now(), &conn).unwrap();
        new_card(&keep.id, "은행", "Bank", "", &now(), &conn).unwrap();
        new_card(&drop.id, "시장", "Market", "", &now(), &conn).unwrap();

        delete_deck(&drop.id, &conn).unwrap();
        assert_eq!(count_cards(&conn).unwrap(), 1);
        assert!(matches!(delete_deck(&drop.id, &conn), Err(Error::DeckNotFound(_))));
    }

    #[test]
    fn test_deck_card_counts() {
        let conn = open_in_memory().unwrap();
        let a = new_deck("A", &now(), &conn).unwrap();
        let b = new_deck("B", &now(), &conn).unwrap();
        new_card(&a.id, "버스", "Bus", "", &now(), &conn).unwrap();
        new_card(&a.id, "택시", "Taxi", "", &now(), &conn).unwrap();
        let counts = deck_card_counts(&conn).unwrap();
        assert_eq!(counts.get(&a.id), Some(&2));
        assert_eq!(counts.get(&b.id), None);
    }

    #[test]
    fn test_store_feeds_due_queue_and_grading() {
        let conn = open_in_memory().unwrap();
        let a = new_deck("A", &now(), &conn).unwrap();
        let b = new_deck("B", &now(), &conn).unwrap();
        let card = new_card(&a.id, "지하철", "Subway", "", &now(), &conn).unwrap();
        new_card(&b.id, "약국", "Pharmacy", "", &now(), &conn).unwrap();

        let queue = build_due_queue(&conn, Some(&a.id), 100, &now()).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].id, card.id);

        grade_and_save(&conn, &queue[0], Grade::Good, &now()).unwrap();
        let stored = get_card(&card.id, &conn).unwrap();
        assert_eq!(stored.srs.reps, 1);
        assert_eq!(stored.srs.due_at, Utc.with_ymd_and_hms(2024, 5, 21, 0, 0, 0).unwrap());
        assert!(build_due_queue(&conn, Some(&a.id), 100, &now()).unwrap().is_empty());
        assert_eq!(build_due_queue(&conn, None, 100, &now()).unwrap().len(), 1);
    }

    #[test]
    fn test_day_offset() {
        let conn = open_in_memory().unwrap();
        assert_eq!(get_day_offset(&conn).unwrap(), 0);
        assert_eq!(advance_day(&conn).unwrap(), 1);
        assert_eq!(advance_day(&conn).unwrap(), 2);
        reset_day_offset(&conn).unwrap();
        assert_eq!(get_day_offset(&conn).unwrap(), 0);
    }

    #[test]
    fn test_settings_defaults_and_goal_floor() {
        let conn = open_in_memory().unwrap();
        assert_eq!(get_settings(&conn).unwrap(), Settings::default());

        let mut settings = Settings::default();
        settings.theme = Theme::Dark;
        save_settings(&settings, &conn).unwrap();
        assert_eq!(get_settings(&conn).unwrap().theme, Theme::Dark);

        let updated = set_daily_goal(0, &conn).unwrap();
        assert_eq!(updated.daily_goal, 1);
        assert_eq!(get_settings(&conn).unwrap().daily_goal, 1);
        assert_eq!(get_settings(&conn).unwrap().theme, Theme::Dark);
    }

    #[test]
    fn test_review_log_and_stats() {
        let conn = open_in_memory().unwrap();
        let deck = new_deck("A", &now(), &conn).unwrap();
        new_card(&deck.id, "오늘", "Today", "", &now(), &conn).unwrap();
        let mut overdue = Card::new(deck.id, "어제", "Yesterday", &now());
        overdue.srs.due_at = now() - TimeDelta::days(3);
        add_card(&overdue, &conn).unwrap();

        log_review(&now(), &conn).unwrap();
        log_review(&now(), &conn).unwrap();
        log_review(&(now() - TimeDelta::days(1)), &conn).unwrap();

        let stats = card_stats(&now(), &conn).unwrap();
        assert_eq!(stats.total_cards, 2);
        assert_eq!(stats.due_today, 1);
        assert_eq!(stats.reviewed_today, 2);
        assert_eq!(reviews_on(&(now() + TimeDelta::days(1)), &conn).unwrap(), 0);
    }

    #[test]
    fn test_review_session_counts_reviews_today() {
        let conn = open_in_memory().unwrap();
        let deck = new_deck("A", &now(), &conn).unwrap();
        new_card(&deck.id, "사과", "Apple", "sagwa", &now(), &conn).unwrap();
        new_card(&deck.id, "포도", "Grape", "podo", &now(), &conn).unwrap();

        let queue = build_due_queue(&conn, Some(&deck.id), 100, &now()).unwrap();
        let mut session = ReviewSession::new(deck.name.clone(), queue, ReviewDirection::KoreanToEnglish);
        session.grade_current(Grade::Again, &conn, &now()).unwrap();
        session.grade_current(Grade::Good, &conn, &now()).unwrap();
        session.grade_current(Grade::Good, &conn, &now()).unwrap();
        assert!(session.is_completed());

        let stats = card_stats(&now(), &conn).unwrap();
        assert_eq!(stats.reviewed_today, 3);
        assert_eq!(stats.due_today, 0);
        assert_eq!(reviews_on(&(now() - TimeDelta::days(1)), &conn).unwrap(), 0);
    }

    #[test]
    fn test_replace_all() {
        let mut conn = open_in_memory().unwrap();
        let old = new_deck("Old", &now(), &conn).unwrap();
        new_card(&old.id, "사랑", "Love", "", &now(), &conn).unwrap();

        let deck = Deck::new("New", &now());
        let card = Card::new(deck.id, "가족", "Family", &now());
        replace_all(&[deck.clone()], &[card.clone()], None, &mut conn).unwrap();

        assert_eq!(get_all_decks(&conn).unwrap(), vec![deck]);
        assert_eq!(get_all_cards(&conn).unwrap(), vec![card]);
    }

    #[test]
    fn test_replace_all_rolls_back_on_failure() {
        let mut conn = open_in_memory().unwrap();
        let old = new_deck("Old", &now(), &conn).unwrap();
        new_card(&old.id, "사랑", "Love", "", &now(), &conn).unwrap();

        // card points at a deck that is not part of the import
        let orphan = Card::new(Uuid::new_v4(), "고아", "Orphan", &now());
        assert!(replace_all(&[], &[orphan], None, &mut conn).is_err());

        assert_eq!(get_all_decks(&conn).unwrap().len(), 1);
        assert_eq!(count_cards(&conn).unwrap(), 1);
    }
}
