pub mod card;
pub mod deck;
pub mod due_queue;
pub mod grade;
pub mod review_session;
pub mod scheduling_state;
pub mod settings;
pub mod sm2;
pub mod stats;

pub use card::{Card, CardBack, CardFront};
pub use deck::Deck;
pub use due_queue::{build_due_queue, build_due_queue_with_clock, grade_and_save};
pub use grade::Grade;
pub use review_session::{PromptSide, ReviewSession};
pub use scheduling_state::{INITIAL_EASE, MAX_EASE, MIN_EASE, SchedulingState};
pub use settings::{ReviewDirection, Settings, Theme, TypingTolerance};
pub use stats::CardStats;
