pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use clock::{Clock, FixedClock, SimulatedClock, SystemClock};
pub use config::AppConfig;
pub use database::CardStore;
pub use error::{Error, Result};
pub use models::{
    Card, CardStats, Deck, Grade, ReviewSession, SchedulingState, Settings, build_due_queue,
    grade_and_save,
};
pub use models::sm2::{grade, grade_card, grade_with_clock, preview_intervals};
