use std::f64::consts::TAU;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Offset, TimeDelta, TimeZone};

/// Microseconds in a nominal 24h day. Used when the next calendar day cannot
/// be represented.
const NOMINAL_DAY_MICROS: i64 = 86_400_000_000;

/// A clock indicator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Hand {
    Hour,
    Minute,
    Second,
}

impl Hand {
    pub const ALL: [Hand; 3] = [Hand::Hour, Hand::Minute, Hand::Second];

    /// Full dial revolutions completed per day on a 12-hour dial.
    pub const fn revolutions_per_day(self) -> f64 {
        match self {
            Hand::Hour => 2.0,
            Hand::Minute => 24.0,
            Hand::Second => 1440.0,
        }
    }
}

/// Angular position of the three hands, in radians accumulated since local
/// midnight.
///
/// Each field lies in `[0, revolutions_per_day * 2π)`.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ClockPosition {
    pub hours_radian: f64,
    pub minutes_radian: f64,
    pub seconds_radian: f64,
}

impl ClockPosition {
    /// Position for the current local time.
    pub fn now() -> Self {
        pointer_radians(&Local::now())
    }

    /// Position for an arbitrary instant. Same as [`pointer_radians`].
    pub fn at<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        pointer_radians(instant)
    }

    /// Accumulated angle for `hand`.
    pub fn radians(&self, hand: Hand) -> f64 {
        match hand {
            Hand::Hour => self.hours_radian,
            Hand::Minute => self.minutes_radian,
            Hand::Second => self.seconds_radian,
        }
    }

    /// Angle for `hand` folded onto a single dial turn, in degrees `[0, 360)`.
    ///
    /// 0° is twelve o'clock; angles grow clockwise.
    pub fn dial_degrees(&self, hand: Hand) -> f64 {
        let deg = self.radians(hand).rem_euclid(TAU).to_degrees();
        // rem_euclid can round up to exactly TAU for tiny negative inputs.
        if deg >= 360.0 { 0.0 } else { deg }
    }
}

/// Computes hand angles for `now`.
///
/// The day runs from local midnight to the next local midnight in `now`'s
/// time zone, so days with a DST transition are 23h or 25h long and the
/// hands still complete exactly their daily revolutions.
pub fn pointer_radians<Tz: TimeZone>(now: &DateTime<Tz>) -> ClockPosition {
    let ratio = day_passed_ratio(now);

    let angle = |hand: Hand| ratio * hand.revolutions_per_day() * TAU;

    ClockPosition {
        hours_radian: angle(Hand::Hour),
        minutes_radian: angle(Hand::Minute),
        seconds_radian: angle(Hand::Second),
    }
}

/// Fraction of `now`'s calendar day that has passed, in `[0, 1)`.
pub fn day_passed_ratio<Tz: TimeZone>(now: &DateTime<Tz>) -> f64 {
    let tz = now.timezone();
    let date = now.date_naive();

    let day_start = local_midnight(&tz, date);
    let passed = micros(now.clone().signed_duration_since(day_start.clone()));

    let length = match date.succ_opt() {
        Some(next) => {
            let day_end = local_midnight(&tz, next);
            micros(day_end.signed_duration_since(day_start))
        }
        None => NOMINAL_DAY_MICROS,
    };

    if length <= 0 {
        return 0.0;
    }

    let ratio = passed as f64 / length as f64;
    if ratio < 0.0 {
        0.0
    } else if ratio >= 1.0 {
        // Largest f64 below 1.0.
        1.0 - f64::EPSILON / 2.0
    } else {
        ratio
    }
}

/// Start of `date` in `tz`.
///
/// Ambiguous midnights resolve to the earlier instant. A midnight skipped by a
/// forward jump resolves to the first valid instant after the gap: midnight
/// read with the offset in effect before the jump.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let naive = date.and_time(NaiveTime::MIN);
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return dt;
    }

    let before_gap = tz
        .from_local_datetime(&(naive - TimeDelta::hours(12)))
        .earliest()
        .map_or(0, |dt| dt.offset().fix().local_minus_utc());
    tz.from_utc_datetime(&(naive - TimeDelta::seconds(i64::from(before_gap))))
}

fn micros(delta: TimeDelta) -> i64 {
    delta
        .num_microseconds()
        .unwrap_or_else(|| delta.num_milliseconds().saturating_mul(1000))
}
