//! Main application UI and state management.
//! Handles deck and card management, daily stats, backups and review sessions.

use korean_srs::clock::{Clock, SimulatedClock};
use korean_srs::config::AppConfig;
use korean_srs::database::db;
use korean_srs::export::json::{DEFAULT_EXPORT_FILE_NAME, export_all_to_path, import_all_from_path};
use korean_srs::models::sm2::preview_intervals;
use korean_srs::models::{
    Card, CardStats, Deck, Grade, PromptSide, ReviewDirection, ReviewSession, Settings, Theme,
    build_due_queue,
};
use chrono::{DateTime, Local};
use eframe::egui;
use log::{error, warn};
use rusqlite::Connection;
use std::collections::HashMap;
use uuid::Uuid;

/// Application screen states
#[derive(Default)]
enum AppScreen {
    #[default]
    Main,
    Review,
}

/// Main application state
pub struct MyApp {
    show_confirmation_dialog: bool,
    allowed_to_close: bool,
    conn: Connection,
    config: AppConfig,

    decks: Vec<Deck>,
    card_counts: HashMap<Uuid, usize>,
    due_counts: HashMap<Uuid, usize>,
    selected_deck_index: Option<usize>,
    selected_cards: Vec<Card>,

    new_deck_name: String,
    current_hangul: String,
    current_romanization: String,
    current_meaning: String,

    settings: Settings,
    theme_applied: bool,
    daily_goal_input: u32,
    stats: CardStats,
    day_offset: i64,

    current_screen: AppScreen,
    review_session: Option<ReviewSession>,

    show_result_dialog: bool,
    result_message: String,
}

/// Formats an instant as a local YYYY-MM-DD string
fn format_day(time: DateTime<chrono::Utc>) -> String {
    let local: DateTime<Local> = time.into();
    local.format("%Y-%m-%d").to_string()
}

/// egui follows the OS setting for `Theme::System`
fn theme_preference(theme: Theme) -> egui::ThemePreference {
    match theme {
        Theme::Dark => egui::ThemePreference::Dark,
        Theme::Light => egui::ThemePreference::Light,
        Theme::System => egui::ThemePreference::System,
    }
}

fn grade_label(grade: Grade) -> &'static str {
    match grade {
        Grade::Again => "Again",
        Grade::Hard => "Hard",
        Grade::Good => "Good",
        Grade::Easy => "Easy",
    }
}

impl eframe::App for MyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            self.apply_theme(ctx);
        }

        match self.current_screen {
            AppScreen::Main => self.render_main_screen(ctx),
            AppScreen::Review => self.render_review_screen(ctx),
        }

        // Handle window close requests with confirmation dialog
        if ctx.input(|i| i.viewport().close_requested()) && !self.allowed_to_close {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.show_confirmation_dialog = true;
        }

        if self.show_confirmation_dialog {
            egui::Window::new("Do you want to quit?")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("No").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = false;
                        }

                        if ui.button("Yes").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = true;
                            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                });
        }

        if self.show_result_dialog {
            egui::Window::new("Result")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&self.result_message);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.show_result_dialog = false;
                    }
                });
        }
    }
}

impl MyApp {
    pub fn new(conn: Connection, config: AppConfig) -> Self {
        let settings = db::get_settings(&conn).unwrap_or_else(|e| {
            warn!("Falling back to default settings: {}", e);
            Settings::default()
        });
        let day_offset = db::get_day_offset(&conn).unwrap_or(0);
        let mut app = Self {
            show_confirmation_dialog: false,
            allowed_to_close: false,
            conn,
            config,
            decks: Vec::new(),
            card_counts: HashMap::new(),
            due_counts: HashMap::new(),
            selected_deck_index: None,
            selected_cards: Vec::new(),
            new_deck_name: String::new(),
            current_hangul: String::new(),
            current_romanization: String::new(),
            current_meaning: String::new(),
            daily_goal_input: settings.daily_goal,
            settings,
            theme_applied: false,
            stats: CardStats::default(),
            day_offset,
            current_screen: AppScreen::Main,
            review_session: None,
            show_result_dialog: false,
            result_message: String::new(),
        };
        app.refresh();
        if !app.decks.is_empty() {
            app.select_deck(0);
        }
        app
    }

    fn clock(&self) -> SimulatedClock {
        SimulatedClock {
            offset_days: self.day_offset,
        }
    }

    fn now(&self) -> DateTime<Local> {
        self.clock().now()
    }

    fn show_result(&mut self, message: String) {
        self.result_message = message;
        self.show_result_dialog = true;
    }

    fn apply_theme(&mut self, ctx: &egui::Context) {
        ctx.set_theme(theme_preference(self.settings.theme));
        self.theme_applied = true;
    }

    fn save_settings(&mut self) {
        if let Err(e) = db::save_settings(&self.settings, &self.conn) {
            error!("Saving settings failed: {}", e);
            self.show_result(format!("Saving settings failed: {}", e));
        }
    }

    /// Reloads decks, counts and today's stats from the database.
    fn refresh(&mut self) {
        let now = self.now();
        let result = (|| -> korean_srs::Result<()> {
            self.decks = db::get_all_decks(&self.conn)?;
            self.card_counts = db::deck_card_counts(&self.conn)?;
            let mut due_counts = HashMap::new();
            for deck in &self.decks {
                let limit = deck.queue_limit(self.config.queue_limit);
                let due = build_due_queue(&self.conn, Some(&deck.id), limit, &now)?;
                due_counts.insert(deck.id, due.len());
            }
            self.due_counts = due_counts;
            self.stats = db::card_stats(&now, &self.conn)?;
            Ok(())
        })();
        if let Err(e) = result {
            error!("Refreshing collection failed: {}", e);
            self.show_result(format!("Loading data failed: {}", e));
        }

        if let Some(idx) = self.selected_deck_index {
            if idx >= self.decks.len() {
                self.selected_deck_index = None;
                self.selected_cards.clear();
            } else {
                self.load_selected_cards();
            }
        }
    }

    fn select_deck(&mut self, idx: usize) {
        self.selected_deck_index = Some(idx);
        self.load_selected_cards();
    }

    fn load_selected_cards(&mut self) {
        let Some(deck) = self.selected_deck_index.and_then(|i| self.decks.get(i)) else {
            return;
        };
        match db::get_cards_for_deck(&deck.id, &self.conn) {
            Ok(cards) => self.selected_cards = cards,
            Err(e) => error!("Loading cards for '{}' failed: {}", deck.name, e),
        }
    }

    /// Renders the main screen with stats, settings and deck management
    fn render_main_screen(&mut self, ctx: &egui::Context) {
        let mut action_next_day = false;
        let mut action_reset_day = false;
        let mut action_export = false;
        let mut action_import = false;
        let mut action_create_deck = false;
        let mut action_select: Option<usize> = None;
        let mut action_review: Option<Option<Uuid>> = None;
        let mut action_add_card = false;
        let mut action_set_goal = false;
        let mut settings_changed = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                let today = self.now().format("%Y-%m-%d").to_string();
                if self.day_offset > 0 {
                    ui.label(format!("{} (+{} days)", today, self.day_offset));
                } else {
                    ui.label(today);
                }
                if ui.button("Next Day").clicked() {
                    action_next_day = true;
                }
                if self.day_offset > 0 && ui.button("Back to Today").clicked() {
                    action_reset_day = true;
                }
            });

            ui.label(format!(
                "Cards: {}   Due today: {}   Reviewed today: {} / {}",
                self.stats.total_cards,
                self.stats.due_today,
                self.stats.reviewed_today,
                self.settings.daily_goal
            ));
            ui.add(
                egui::ProgressBar::new(self.stats.goal_progress(self.settings.daily_goal))
                    .show_percentage(),
            );
            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Daily goal:");
                ui.add(egui::DragValue::new(&mut self.daily_goal_input).range(1..=500));
                if ui.button("Set").clicked() {
                    action_set_goal = true;
                }
            });

            ui.horizontal(|ui| {
                let before = (self.settings.theme, self.settings.review_direction);
                egui::ComboBox::from_label("Theme")
                    .selected_text(format!("{:?}", self.settings.theme))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.settings.theme, Theme::System, "System");
                        ui.selectable_value(&mut self.settings.theme, Theme::Dark, "Dark");
                        ui.selectable_value(&mut self.settings.theme, Theme::Light, "Light");
                    });
                egui::ComboBox::from_label("Direction")
                    .selected_text(match self.settings.review_direction {
                        ReviewDirection::KoreanToEnglish => "Korean → English",
                        ReviewDirection::EnglishToKorean => "English → Korean",
                        ReviewDirection::Both => "Both",
                    })
                    .show_ui(ui, |ui| {
                        ui.selectable_value(
                            &mut self.settings.review_direction,
                            ReviewDirection::KoreanToEnglish,
                            "Korean → English",
                        );
                        ui.selectable_value(
                            &mut self.settings.review_direction,
                            ReviewDirection::EnglishToKorean,
                            "English → Korean",
                        );
                        ui.selectable_value(
                            &mut self.settings.review_direction,
                            ReviewDirection::Both,
                            "Both",
                        );
                    });
                settings_changed = before != (self.settings.theme, self.settings.review_direction);
            });
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Export All").clicked() {
                    action_export = true;
                }
                if ui.button("Import").clicked() {
                    action_import = true;
                }
            });
            ui.separator();

            ui.heading("Create New Deck");
            ui.horizontal(|ui| {
                ui.label("Deck name:");
                ui.text_edit_singleline(&mut self.new_deck_name);
                if ui.button("Create Deck").clicked() {
                    action_create_deck = true;
                }
            });
            ui.separator();

            ui.horizontal(|ui| {
                ui.heading(format!("Decks ({})", self.decks.len()));
                if ui.button("Review All Due").clicked() {
                    action_review = Some(None);
                }
            });

            egui::ScrollArea::vertical()
                .id_source("decks_list")
                .max_height(150.0)
                .show(ui, |ui| {
                    for (i, deck) in self.decks.iter().enumerate() {
                        let is_selected = self.selected_deck_index == Some(i);
                        let total = self.card_counts.get(&deck.id).copied().unwrap_or(0);
                        let due = self.due_counts.get(&deck.id).copied().unwrap_or(0);

                        ui.horizontal(|ui| {
                            if ui
                                .selectable_label(
                                    is_selected,
                                    format!("{}. {} ({} cards)", i + 1, deck.name, total),
                                )
                                .clicked()
                            {
                                action_select = Some(i);
                            }

                            if ui
                                .add_enabled(due > 0, egui::Button::new(format!("Review ({})", due)))
                                .clicked()
                            {
                                action_review = Some(Some(deck.id));
                            }
                        });
                    }
                });
            ui.separator();

            if let Some(deck) = self.selected_deck_index.and_then(|i| self.decks.get(i)) {
                ui.heading(format!("Selected Deck: {}", deck.name));

                ui.horizontal(|ui| {
                    ui.label("Hangul:");
                    ui.text_edit_singleline(&mut self.current_hangul);
                });
                ui.horizontal(|ui| {
                    ui.label("Romanization:");
                    ui.text_edit_singleline(&mut self.current_romanization);
                });
                ui.horizontal(|ui| {
                    ui.label("Meaning:");
                    ui.text_edit_singleline(&mut self.current_meaning);
                });
                if ui.button("Add Card").clicked() {
                    action_add_card = true;
                }
                ui.separator();

                ui.heading(format!("Cards ({})", self.selected_cards.len()));
                egui::ScrollArea::vertical()
                    .id_source("cards_list")
                    .max_height(200.0)
                    .show(ui, |ui| {
                        for (i, card) in self.selected_cards.iter().enumerate() {
                            ui.group(|ui| {
                                ui.label(format!(
                                    "{}. {} - {}",
                                    i + 1,
                                    card.front.hangul,
                                    card.back.meaning
                                ));
                                ui.label(format!(
                                    "   Due {} · interval {}d · ease {:.2} · lapses {}",
                                    format_day(card.srs.due_at),
                                    card.srs.interval,
                                    card.srs.ease,
                                    card.srs.lapses
                                ));
                            });
                        }
                    });
            } else {
                ui.label("Select a deck to add cards");
            }
        });

        // Execute deferred actions
        if action_next_day {
            match db::advance_day(&self.conn) {
                Ok(offset) => self.day_offset = offset,
                Err(e) => error!("Advancing day failed: {}", e),
            }
            self.refresh();
        }
        if action_reset_day {
            match db::reset_day_offset(&self.conn) {
                Ok(()) => self.day_offset = 0,
                Err(e) => error!("Resetting day failed: {}", e),
            }
            self.refresh();
        }
        if action_set_goal {
            match db::set_daily_goal(self.daily_goal_input, &self.conn) {
                Ok(settings) => self.settings = settings,
                Err(e) => self.show_result(format!("Saving daily goal failed: {}", e)),
            }
        }
        if settings_changed {
            self.save_settings();
            self.theme_applied = false;
        }
        if action_export {
            self.handle_export();
        }
        if action_import {
            self.handle_import();
        }
        if action_create_deck {
            self.handle_create_deck();
        }
        if let Some(i) = action_select {
            self.select_deck(i);
        }
        if action_add_card {
            self.handle_add_card();
        }
        if let Some(deck_filter) = action_review {
            self.start_review_session(deck_filter);
        }
    }

    /// Renders the review screen with the current card and grade buttons
    fn render_review_screen(&mut self, ctx: &egui::Context) {
        let now = self.now();
        let mut action_reveal = false;
        let mut action_grade: Option<Grade> = None;
        let mut action_back = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(session) = &self.review_session else {
                action_back = true;
                return;
            };

            ui.heading(format!("Review: {}", session.title));
            ui.label(session.phase_message());
            ui.label(format!(
                "Progress: {} / {} passed ({} remaining)",
                session.passed_count(),
                session.total_count(),
                session.remaining_count()
            ));
            ui.add_space(20.0);

            if session.is_completed() {
                ui.heading("All done!");
                ui.label("Every card in this session has been reviewed.");
                ui.add_space(20.0);
                if ui.button("Back to Main Screen").clicked() {
                    action_back = true;
                }
                return;
            }

            let Some(card) = session.current_card() else {
                return;
            };
            let show_answer = session.show_answer;
            let (prompt, answer) = match session.prompt_side() {
                PromptSide::Korean => (card.front.hangul.clone(), card.back.meaning.clone()),
                PromptSide::English => (card.back.meaning.clone(), card.front.hangul.clone()),
            };

            ui.group(|ui| {
                ui.set_min_height(200.0);
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.heading(&prompt);
                    ui.add_space(20.0);

                    if show_answer {
                        ui.heading(&answer);
                        if let Some(romanization) = &card.front.romanization {
                            ui.label(format!("[{}]", romanization));
                        }
                        if let (Some(ko), Some(en)) = (&card.back.example_ko, &card.back.example_en) {
                            ui.add_space(10.0);
                            ui.label(ko);
                            ui.label(en);
                        }
                    } else {
                        ui.label("(Click 'Show Answer' to reveal)");
                    }
                    ui.add_space(20.0);
                });
            });
            ui.add_space(20.0);

            if !show_answer {
                if ui.button("Show Answer").clicked() {
                    action_reveal = true;
                }
            } else {
                let previews = preview_intervals(&card.srs, &now);
                ui.label("How well did you remember?");
                ui.horizontal(|ui| {
                    for (grade, days) in Grade::ALL.into_iter().zip(previews) {
                        if ui
                            .button(format!("{} ({}d)", grade_label(grade), days))
                            .clicked()
                        {
                            action_grade = Some(grade);
                        }
                    }
                });
            }

            ui.add_space(20.0);
            if ui.button("Back to Main Screen").clicked() {
                action_back = true;
            }
        });

        // Execute deferred actions
        if action_reveal {
            if let Some(session) = &mut self.review_session {
                session.reveal();
            }
        }
        if let Some(grade) = action_grade {
            self.handle_grade(grade, &now);
        }
        if action_back {
            self.current_screen = AppScreen::Main;
            self.review_session = None;
            self.refresh();
        }
    }

    fn handle_grade(&mut self, grade: Grade, now: &DateTime<Local>) {
        let Some(session) = &mut self.review_session else {
            return;
        };
        if let Err(e) = session.grade_current(grade, &self.conn, now) {
            error!("Saving review failed: {}", e);
            self.show_result(format!("Saving review failed: {}", e));
        }
    }

    /// Starts a review session with cards due today
    fn start_review_session(&mut self, deck_filter: Option<Uuid>) {
        let now = self.now();
        let title = deck_filter
            .and_then(|id| self.decks.iter().find(|d| d.id == id))
            .map(|d| d.name.clone())
            .unwrap_or_else(|| "All decks".to_string());
        let limit = deck_filter
            .and_then(|id| self.decks.iter().find(|d| d.id == id))
            .map(|d| d.queue_limit(self.config.queue_limit))
            .unwrap_or(self.config.queue_limit);

        match build_due_queue(&self.conn, deck_filter.as_ref(), limit, &now) {
            Ok(queue) if queue.is_empty() => {
                self.show_result(format!("Nothing is due in {} today.", title));
            }
            Ok(queue) => {
                self.review_session = Some(ReviewSession::new(
                    title,
                    queue,
                    self.settings.review_direction,
                ));
                self.current_screen = AppScreen::Review;
            }
            Err(e) => {
                error!("Building due queue failed: {}", e);
                self.show_result(format!("Could not load due cards: {}", e));
            }
        }
    }

    fn handle_create_deck(&mut self) {
        if self.new_deck_name.trim().is_empty() {
            return;
        }
        let now = self.now();
        match db::new_deck(&self.new_deck_name, &now, &self.conn) {
            Ok(deck) => {
                self.new_deck_name.clear();
                self.refresh();
                if let Some(idx) = self.decks.iter().position(|d| d.id == deck.id) {
                    self.select_deck(idx);
                }
            }
            Err(e) => self.show_result(format!("Failed to create deck: {}", e)),
        }
    }

    fn handle_add_card(&mut self) {
        let Some(deck_id) = self
            .selected_deck_index
            .and_then(|i| self.decks.get(i))
            .map(|d| d.id)
        else {
            return;
        };
        if self.current_hangul.trim().is_empty() || self.current_meaning.trim().is_empty() {
            return;
        }
        let now = self.now();
        match db::new_card(
            &deck_id,
            &self.current_hangul,
            &self.current_meaning,
            &self.current_romanization,
            &now,
            &self.conn,
        ) {
            Ok(_) => {
                self.current_hangul.clear();
                self.current_romanization.clear();
                self.current_meaning.clear();
                self.refresh();
            }
            Err(e) => self.show_result(format!("Failed to add card: {}", e)),
        }
    }

    /// Handles collection export to a JSON file
    fn handle_export(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(DEFAULT_EXPORT_FILE_NAME)
            .add_filter("JSON files", &["json"])
            .save_file()
        else {
            return;
        };
        let now = self.now();
        match export_all_to_path(&path, &now, &self.conn) {
            Ok(blob) => self.show_result(format!(
                "Exported {} decks and {} cards.",
                blob.decks.len(),
                blob.cards.len()
            )),
            Err(e) => self.show_result(format!("Export failed: {}", e)),
        }
    }

    /// Handles collection import from a JSON file, replacing all decks and cards
    fn handle_import(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON files", &["json"])
            .pick_file()
        else {
            return;
        };
        match import_all_from_path(&path, &mut self.conn) {
            Ok(summary) => {
                if summary.settings_replaced {
                    if let Ok(settings) = db::get_settings(&self.conn) {
                        self.daily_goal_input = settings.daily_goal;
                        self.settings = settings;
                        self.theme_applied = false;
                    }
                }
                self.selected_deck_index = None;
                self.selected_cards.clear();
                self.refresh();
                self.show_result(format!(
                    "Imported {} decks with {} cards.",
                    summary.decks, summary.cards
                ));
            }
            Err(e) => self.show_result(format!(
                "Import failed: {}\n\nNothing was changed. The file must be a full export:\n{{\n  \"meta\": {{...}},\n  \"decks\": [...],\n  \"cards\": [...]\n}}",
                e
            )),
        }
    }
}
