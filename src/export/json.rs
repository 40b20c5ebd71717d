//! JSON backup of the whole collection.
//! Exports decks, cards (with scheduling state) and settings; imports validate
//! the file first and then replace the stored collection atomically.

use crate::clock::to_stored;
use crate::database::db;
use crate::error::{Error, Result};
use crate::models::{Card, Deck, MAX_EASE, MIN_EASE, Settings};
use chrono::{DateTime, TimeZone, Utc};
use log::info;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const EXPORT_VERSION: &str = "0.1.0";
pub const DEFAULT_EXPORT_FILE_NAME: &str = "korean-srs-export.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMeta {
    pub version: String,
    pub exported_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBlob {
    pub meta: ExportMeta,
    pub decks: Vec<Deck>,
    pub cards: Vec<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

/// Counts reported after a successful import.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportSummary {
    pub decks: usize,
    pub cards: usize,
    pub settings_replaced: bool,
}

impl ExportBlob {
    /// Checks the constraints the store relies on.
    pub fn validate(&self) -> Result<()> {
        let mut deck_ids = HashSet::new();
        let mut deck_names = HashSet::new();
        for (i, deck) in self.decks.iter().enumerate() {
            if deck.name.trim().is_empty() {
                return Err(Error::validation(format!("decks[{}].name", i), "must not be empty"));
            }
            if !deck_ids.insert(deck.id) {
                return Err(Error::validation(format!("decks[{}].id", i), "duplicate deck id"));
            }
            if !deck_names.insert(deck.name.as_str()) {
                return Err(Error::validation(format!("decks[{}].name", i), "duplicate deck name"));
            }
        }

        let mut card_ids = HashSet::new();
        for (i, card) in self.cards.iter().enumerate() {
            if !card_ids.insert(card.id) {
                return Err(Error::validation(format!("cards[{}].id", i), "duplicate card id"));
            }
            if !deck_ids.contains(&card.deck_id) {
                return Err(Error::validation(
                    format!("cards[{}].deckId", i),
                    format!("unknown deck {}", card.deck_id),
                ));
            }
            let ease = card.srs.ease;
            if !ease.is_finite() || !(MIN_EASE..=MAX_EASE).contains(&ease) {
                return Err(Error::validation(
                    format!("cards[{}].srs.ease", i),
                    format!("{} is outside [{}, {}]", ease, MIN_EASE, MAX_EASE),
                ));
            }
        }

        if let Some(settings) = &self.settings {
            if settings.daily_goal < 1 {
                return Err(Error::validation("settings.dailyGoal", "must be at least 1"));
            }
        }
        Ok(())
    }
}

/// Parses and validates an export document.
pub fn parse_export(text: &str) -> Result<ExportBlob> {
    let blob: ExportBlob = serde_json::from_str(text)?;
    blob.validate()?;
    Ok(blob)
}

/// Snapshot of everything in the database.
pub fn export_all<Tz: TimeZone>(now: &DateTime<Tz>, conn: &Connection) -> Result<ExportBlob> {
    let blob = ExportBlob {
        meta: ExportMeta {
            version: EXPORT_VERSION.to_string(),
            exported_at: to_stored(now),
        },
        decks: db::get_all_decks(conn)?,
        cards: db::get_all_cards(conn)?,
        settings: Some(db::get_settings(conn)?),
    };
    blob.validate()?;
    Ok(blob)
}

/// Writes a pretty-printed export to `path`.
pub fn export_all_to_path<Tz: TimeZone>(
    path: impl AsRef<Path>,
    now: &DateTime<Tz>,
    conn: &Connection,
) -> Result<ExportBlob> {
    let path = path.as_ref();
    let blob = export_all(now, conn)?;
    fs::write(path, serde_json::to_string_pretty(&blob)?)?;
    info!(
        "Exported {} decks and {} cards to '{}'",
        blob.decks.len(),
        blob.cards.len(),
        path.display()
    );
    Ok(blob)
}

/// Replaces the stored collection with a validated export.
pub fn import_blob(blob: &ExportBlob, conn: &mut Connection) -> Result<ImportSummary> {
    blob.validate()?;
    db::replace_all(&blob.decks, &blob.cards, blob.settings.as_ref(), conn)?;
    Ok(ImportSummary {
        decks: blob.decks.len(),
        cards: blob.cards.len(),
        settings_replaced: blob.settings.is_some(),
    })
}

/// Reads, validates and imports an export file. Nothing is changed on failure.
pub fn import_all_from_path(path: impl AsRef<Path>, conn: &mut Connection) -> Result<ImportSummary> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let blob = parse_export(&text)?;
    let summary = import_blob(&blob, conn)?;
    info!(
        "Imported {} decks and {} cards from '{}'",
        summary.decks,
        summary.cards,
        path.display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Grade, Theme, sm2};
    use chrono::TimeDelta;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 18, 0, 0).unwrap() + TimeDelta::milliseconds(42)
    }

    fn populated() -> Connection {
        let conn = db::open_in_memory().unwrap();
        let deck = db::new_deck("Beginner Vocabulary", &now(), &conn).unwrap();
        let card = db::new_card(&deck.id, "감사합니다", "Thank you (formal)", "gamsahamnida", &now(), &conn)
            .unwrap();
        let graded = sm2::grade_card(&card, Grade::Again, &now());
        db::update_card(&graded, &conn).unwrap();
        db::new_card(&deck.id, "네", "Yes", "ne", &now(), &conn).unwrap();
        conn
    }

    #[test]
    fn test_export_to_path_and_import() {
        let source = populated();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE_NAME);

        let exported = export_all_to_path(&path, &now(), &source).unwrap();
        assert_eq!(exported.meta.version, "0.1.0");

        let mut target = db::open_in_memory().unwrap();
        let summary = import_all_from_path(&path, &mut target).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                decks: 1,
                cards: 2,
                settings_replaced: true
            }
        );
        assert_eq!(db::get_all_cards(&target).unwrap(), db::get_all_cards(&source).unwrap());
        assert_eq!(db::get_all_decks(&target).unwrap(), db::get_all_decks(&source).unwrap());
    }

    #[test]
    fn test_export_document_shape() {
        let blob = export_all(&now(), &populated()).unwrap();
        let value = serde_json::to_value(&blob).unwrap();
        assert_eq!(value["meta"]["exportedAt"], "2024-07-01T18:00:00.042Z");
        assert_eq!(value["cards"][0]["srs"]["lastGrade"], "again");
        assert_eq!(value["cards"][0]["srs"]["lapses"], 1);
        assert!(value["decks"][0].get("reviewLimit").is_some());
    }

    #[test]
    fn test_import_replaces_existing_collection() {
        let mut target = populated();
        let deck = Deck::new("Intermediate Grammar", &now());
        let blob = ExportBlob {
            meta: ExportMeta {
                version: EXPORT_VERSION.into(),
                exported_at: now(),
            },
            decks: vec![deck.clone()],
            cards: vec![Card::new(deck.id, "비가 와요.", "It is raining.", &now())],
            settings: None,
        };
        let summary = import_blob(&blob, &mut target).unwrap();
        assert!(!summary.settings_replaced);
        assert_eq!(db::get_all_decks(&target).unwrap(), vec![deck]);
        assert_eq!(db::count_cards(&target).unwrap(), 1);
    }

    #[test]
    fn test_import_settings() {
        let mut target = db::open_in_memory().unwrap();
        let mut settings = Settings::default();
        settings.theme = Theme::Light;
        settings.daily_goal = 50;
        let blob = ExportBlob {
            meta: ExportMeta {
                version: EXPORT_VERSION.into(),
                exported_at: now(),
            },
            decks: Vec::new(),
            cards: Vec::new(),
            settings: Some(settings.clone()),
        };
        import_blob(&blob, &mut target).unwrap();
        assert_eq!(db::get_settings(&target).unwrap(), settings);
    }

    #[test]
    fn test_validation_rejects_bad_ease() {
        let mut blob = export_all(&now(), &populated()).unwrap();
        blob.cards[1].srs.ease = 4.0;
        let err = blob.validate().unwrap_err();
        assert!(matches!(err, Error::Validation { ref path, .. } if path == "cards[1].srs.ease"));
    }

    #[test]
    fn test_validation_rejects_orphan_cards() {
        let mut blob = export_all(&now(), &populated()).unwrap();
        blob.cards[0].deck_id = Uuid::new_v4();
        assert!(matches!(blob.validate(), Err(Error::Validation { .. })));
    }

    #[test]
    fn test_validation_rejects_duplicate_names_and_empty_names() {
        let mut blob = export_all(&now(), &populated()).unwrap();
        let mut twin = blob.decks[0].clone();
        twin.id = Uuid::new_v4();
        blob.decks.push(twin);
        assert!(blob.validate().is_err());

        let mut blob = export_all(&now(), &populated()).unwrap();
        blob.decks[0].name = "  ".into();
        assert!(blob.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_daily_goal() {
        let mut blob = export_all(&now(), &populated()).unwrap();
        if let Some(settings) = blob.settings.as_mut() {
            settings.daily_goal = 0;
        }
        assert!(blob.validate().is_err());
    }

    #[test]
    fn test_invalid_file_leaves_store_untouched() {
        let mut target = populated();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        assert!(matches!(import_all_from_path(&path, &mut target), Err(Error::Json(_))));
        assert_eq!(db::count_cards(&target).unwrap(), 2);
    }

    #[test]
    fn test_negative_interval_is_rejected_by_schema() {
        let mut blob = serde_json::to_value(export_all(&now(), &populated()).unwrap()).unwrap();
        blob["cards"][0]["srs"]["interval"] = serde_json::json!(-3);
        assert!(parse_export(&blob.to_string()).is_err());
    }

    #[test]
    fn test_import_nonexistent_file() {
        let mut target = db::open_in_memory().unwrap();
        let result = import_all_from_path("nonexistent_file_xyz123.json", &mut target);
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
