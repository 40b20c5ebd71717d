//! Clock sources and calendar-day arithmetic.
//!
//! Scheduling works in calendar days of the time zone the current instant is
//! expressed in. Stored instants are always UTC.

use chrono::{
    DateTime, Days, Local, NaiveDate, NaiveTime, SubsecRound, TimeDelta, TimeZone, Utc,
};

/// Source of the current instant.
pub trait Clock {
    type Tz: TimeZone;

    fn now(&self) -> DateTime<Self::Tz>;
}

/// Wall-clock time in the host's local zone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Always returns the same instant.
#[derive(Clone, Debug)]
pub struct FixedClock<Tz: TimeZone>(pub DateTime<Tz>);

impl<Tz: TimeZone> Clock for FixedClock<Tz> {
    type Tz = Tz;

    fn now(&self) -> DateTime<Tz> {
        self.0.clone()
    }
}

/// Wall clock shifted forward by a whole number of days.
///
/// Backs the "Next Day" button so scheduling can be tried out without waiting.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimulatedClock {
    pub offset_days: i64,
}

impl Clock for SimulatedClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        shift_days(Local::now(), self.offset_days)
    }
}

/// Moves `now` by whole calendar days, keeping its local wall-clock time.
///
/// If that wall-clock time does not exist (or is ambiguous) on the target day, the
/// instant moves by 24-hour steps instead. Out-of-range results leave `now` unchanged.
pub fn shift_days<Tz: TimeZone>(now: DateTime<Tz>, days: i64) -> DateTime<Tz> {
    let step = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        now.clone().checked_add_days(step)
    } else {
        now.clone().checked_sub_days(step)
    };
    shifted
        .or_else(|| TimeDelta::try_days(days).and_then(|delta| now.clone().checked_add_signed(delta)))
        .unwrap_or(now)
}

/// Truncates an instant to millisecond precision and converts it to UTC.
pub fn to_stored<Tz: TimeZone>(instant: &DateTime<Tz>) -> DateTime<Utc> {
    instant.with_timezone(&Utc).trunc_subsecs(3)
}

/// First instant of `date` in `tz`.
///
/// Midnight normally; when a DST gap swallows midnight the first hour that
/// exists is used instead.
fn first_instant_of<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..24).find_map(|hour| {
        let local = midnight.checked_add_signed(TimeDelta::hours(hour))?;
        tz.from_local_datetime(&local)
            .earliest()
            .map(|t| t.with_timezone(&Utc))
    })
}

/// Start of the calendar day containing `now`.
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    first_instant_of(&now.timezone(), now.date_naive()).unwrap_or_else(|| to_stored(now))
}

/// Start of the calendar day `days` after the day containing `now`.
///
/// Saturates at the latest representable instant.
pub fn start_of_day_plus<Tz: TimeZone>(now: &DateTime<Tz>, days: u32) -> DateTime<Utc> {
    now.date_naive()
        .checked_add_days(Days::new(u64::from(days)))
        .and_then(|date| first_instant_of(&now.timezone(), date))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Last millisecond of the calendar day containing `now`.
pub fn end_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    start_of_day_plus(now, 1) - TimeDelta::milliseconds(1)
}

/// `YYYY-MM-DD` key of the calendar day containing `now`.
pub fn day_key<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    now.date_naive().format("%Y-%m-%d").to_string()
}
