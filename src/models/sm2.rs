//! SM-2 (SuperMemo 2) spaced repetition grading.
//!
//! - Each card carries an easiness factor (ease) clamped to [1.3, 3.5]
//! - `again` fails the card: progress resets, one-day relearning step, lapse counted
//! - First and second successes use fixed 1 and 3 day steps without touching ease
//! - From the third success on, ease is updated and multiplies the previous interval
//! - `easy` adds a flat 1.3x bonus on top of whatever interval was chosen
//! - Due dates are whole calendar days after the start of the grading day
//!
//! Grading is a pure transform: the input state is never modified.

use super::{Card, Grade, MAX_EASE, MIN_EASE, SchedulingState};
use crate::clock::{Clock, start_of_day_plus, to_stored};
use chrono::{DateTime, TimeZone};

/// Fixed relearning step after a failure, in days
pub const RELEARN_INTERVAL: u32 = 1;
/// Interval after the first success in a row
pub const FIRST_STEP_INTERVAL: u32 = 1;
/// Interval after the second success in a row
pub const SECOND_STEP_INTERVAL: u32 = 3;
/// Multiplier applied to the interval when grading `easy`
pub const EASY_BONUS: f64 = 1.3;

/// SM-2 easiness update, rounded to two decimals and clamped.
pub fn sm2_ease(prev_ease: f64, quality: u8) -> f64 {
    let d = 5.0 - f64::from(quality);
    let ease = prev_ease + (0.1 - d * (0.08 + d * 0.02));
    round_to_hundredths(ease).clamp(MIN_EASE, MAX_EASE)
}

/// Rounds half away from zero on the exact decimal value of the double, like
/// `Number.prototype.toFixed(2)`. Scaling by 100 first would turn 1.325 (stored as
/// 1.32499...) into 132.5 and round it the wrong way.
fn round_to_hundredths(value: f64) -> f64 {
    if !value.is_finite() || value.abs() >= 1e15 {
        return value;
    }
    // 64 places cover every fractional bit of a double in this range
    let expanded = format!("{:.64}", value.abs());
    let Some((whole, fraction)) = expanded.split_once('.') else {
        return value;
    };
    let Ok(whole) = whole.parse::<i64>() else {
        return value;
    };
    let digits = fraction.as_bytes();
    let mut hundredths =
        whole * 100 + i64::from(digits[0] - b'0') * 10 + i64::from(digits[1] - b'0');
    if digits[2] >= b'5' {
        hundredths += 1;
    }
    format!("{}.{:02}", hundredths / 100, hundredths % 100)
        .parse::<f64>()
        .map_or(value, |rounded| rounded.copysign(value))
}

fn scale_interval(interval: u32, factor: f64) -> u32 {
    // f64 -> u32 casts saturate
    (f64::from(interval) * factor).round() as u32
}

/// Computes the scheduling state that follows `state` after grading it with `grade` at `now`.
pub fn grade<Tz: TimeZone>(state: &SchedulingState, grade: Grade, now: &DateTime<Tz>) -> SchedulingState {
    let quality = grade.quality();
    let mut next = state.clone();

    if grade.is_failure() {
        next.reps = 0;
        next.lapses = state.lapses.saturating_add(1);
        next.interval = RELEARN_INTERVAL;
        next.ease = sm2_ease(state.ease, quality);
    } else {
        next.reps = state.reps.saturating_add(1);
        next.interval = match next.reps {
            1 => FIRST_STEP_INTERVAL,
            2 => SECOND_STEP_INTERVAL,
            _ => {
                next.ease = sm2_ease(state.ease, quality);
                scale_interval(state.interval, next.ease).max(1)
            }
        };
        if grade == Grade::Easy {
            next.interval = scale_interval(next.interval, EASY_BONUS);
        }
    }

    next.due_at = start_of_day_plus(now, next.interval);
    next.last_grade = Some(grade);
    next
}

/// [`grade`] evaluated at the clock's current instant; pass [`SystemClock`](crate::clock::SystemClock) for wall-clock time.
pub fn grade_with_clock<C: Clock>(state: &SchedulingState, grade_value: Grade, clock: &C) -> SchedulingState {
    grade(state, grade_value, &clock.now())
}

/// Grades a card, returning the updated copy stamped with `now`.
pub fn grade_card<Tz: TimeZone>(card: &Card, grade_value: Grade, now: &DateTime<Tz>) -> Card {
    Card {
        srs: grade(&card.srs, grade_value, now),
        updated_at: to_stored(now),
        ..card.clone()
    }
}

/// Intervals that again, hard, good and easy would produce, in that order.
pub fn preview_intervals<Tz: TimeZone>(state: &SchedulingState, now: &DateTime<Tz>) -> [u32; 4] {
    Grade::ALL.map(|g| grade(state, g, now).interval)
}
