//! # Solunar Periods
//!
//! Solunar theory places the peaks of fish activity around the moon's
//! passage over the horizon (major periods) and over the meridian (minor
//! periods). This module estimates those four daily windows from the moon's
//! age and the observer's longitude, and classifies a reference moment
//! against them.
//!
//! ## Timing model
//!
//! - **Transit**: solar noon at new moon, retarded by 24h50m per synodic
//!   month, shifted by `-longitude / 15` hours
//! - **Moonrise / moonset**: transit ∓ 6 h
//! - **Anti-transit**: transit + 12 h
//!
//! The ±6 h spacing ignores declination and latitude. Only the relative
//! placement of the four windows matters for scoring, so the simplification
//! is kept as-is.

use crate::lunar::{moon_age, SYNODIC_MONTH};
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const MINUTES_PER_DAY: u16 = 1440;

/// Half-width of a major period in hours.
pub const MAJOR_HALF_WIDTH_HOURS: f64 = 1.0;
/// Half-width of a minor period in hours.
pub const MINOR_HALF_WIDTH_HOURS: f64 = 0.5;
/// Lead time before a period start that still counts as "about to begin".
pub const NEAR_PERIOD_MINUTES: u16 = 30;

/// Local wall-clock time with minute resolution, rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    /// Clock time from hours and minutes; both wrap into a single day.
    pub fn new(hour: u32, minute: u32) -> Self {
        let total = (hour * 60 + minute) % MINUTES_PER_DAY as u32;
        ClockTime {
            minutes: total as u16,
        }
    }

    /// Clock time from a decimal hour, wrapped into `[0, 24)` and rounded to
    /// the nearest minute (14.5 → 14:30, 25.0 → 01:00, -1.0 → 23:00).
    pub fn from_decimal_hour(hour: f64) -> Self {
        let wrapped = hour.rem_euclid(24.0);
        let total = (wrapped * 60.0).round() as u32 % MINUTES_PER_DAY as u32;
        ClockTime {
            minutes: total as u16,
        }
    }

    /// Clock time of a timestamp, seconds dropped.
    pub fn of(timestamp: NaiveDateTime) -> Self {
        ClockTime::new(timestamp.hour(), timestamp.minute())
    }

    pub fn hour(&self) -> u32 {
        (self.minutes / 60) as u32
    }

    pub fn minute(&self) -> u32 {
        (self.minutes % 60) as u32
    }

    /// Minutes since midnight, 0–1439.
    pub fn minute_of_day(&self) -> u16 {
        self.minutes
    }

    /// Decimal hour, e.g. 14:30 → 14.5.
    pub fn decimal_hour(&self) -> f64 {
        self.minutes as f64 / 60.0
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("expected HH:MM, got {s:?}"))?;
        let hour: u32 = h.parse().map_err(|_| format!("bad hour in {s:?}"))?;
        let minute: u32 = m.parse().map_err(|_| format!("bad minute in {s:?}"))?;
        if hour > 23 || minute > 59 {
            return Err(format!("clock time out of range: {s:?}"));
        }
        Ok(ClockTime::new(hour, minute))
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Major periods surround moonrise/moonset, minor periods the transits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Major,
    Minor,
}

impl PeriodKind {
    pub fn half_width_hours(&self) -> f64 {
        match self {
            PeriodKind::Major => MAJOR_HALF_WIDTH_HOURS,
            PeriodKind::Minor => MINOR_HALF_WIDTH_HOURS,
        }
    }
}

/// One activity window. `end` may be earlier than `start` when the window
/// crosses midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolunarPeriod {
    pub start: ClockTime,
    pub end: ClockTime,
    pub kind: PeriodKind,
}

impl SolunarPeriod {
    /// Window of the kind's half-width on either side of `center_hour`.
    pub fn centered(center_hour: f64, kind: PeriodKind) -> Self {
        let half = kind.half_width_hours();
        SolunarPeriod {
            start: ClockTime::from_decimal_hour(center_hour - half),
            end: ClockTime::from_decimal_hour(center_hour + half),
            kind,
        }
    }

    /// Inclusive containment; an end of 00:00 means end of day.
    pub fn contains(&self, time: ClockTime) -> bool {
        is_in_time_range(self.start, self.end, time)
    }
}

/// The four daily periods and how a reference moment relates to them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolunarAssessment {
    /// Exactly four periods, ascending by start time.
    pub periods: Vec<SolunarPeriod>,
    pub is_in_major: bool,
    pub is_in_minor: bool,
    /// A period starts within the next 30 minutes (only when in none).
    pub is_near_period: bool,
    /// 100 in a major, 70 in a minor, 30 shortly before one, else 10.
    pub score: u8,
}

/// Approximate moon rise, set and transit clock times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoonTimes {
    pub rise: ClockTime,
    pub set: ClockTime,
    pub transit: ClockTime,
}

/// Decimal hour `[0, 24)` of the moon's upper culmination.
pub fn estimate_moon_transit(date: NaiveDateTime, longitude: f64) -> f64 {
    const BASE_TRANSIT_HOURS: f64 = 12.0;
    // the moon transits ~50 minutes later each day
    const RETARDATION_HOURS_PER_CYCLE: f64 = 24.0 + 50.0 / 60.0;

    let age = moon_age(date);
    let age_offset = age * RETARDATION_HOURS_PER_CYCLE / SYNODIC_MONTH;
    let lon_offset = -longitude / 15.0;

    (BASE_TRANSIT_HOURS + age_offset + lon_offset).rem_euclid(24.0)
}

/// Moon rise/set as transit ∓ 6 h. `latitude` does not affect the estimate.
pub fn moon_rise_set(date: NaiveDateTime, _latitude: f64, longitude: f64) -> MoonTimes {
    let transit = estimate_moon_transit(date, longitude);
    MoonTimes {
        rise: ClockTime::from_decimal_hour(transit - 6.0),
        set: ClockTime::from_decimal_hour(transit + 6.0),
        transit: ClockTime::from_decimal_hour(transit),
    }
}

/// Whether `now` lies in `[start, end]`, handling ranges that wrap midnight.
pub fn is_in_time_range(start: ClockTime, end: ClockTime, now: ClockTime) -> bool {
    let start_min = start.minute_of_day();
    let mut end_min = end.minute_of_day();
    let now_min = now.minute_of_day();

    if end_min == 0 && start_min > 0 {
        end_min = MINUTES_PER_DAY;
    }

    if end_min >= start_min {
        now_min >= start_min && now_min <= end_min
    } else {
        now_min >= start_min || now_min <= end_min
    }
}

/// Whether any period starts within `minutes_before` minutes after `now`
/// (exclusive of `now` itself), looking across midnight.
pub fn is_near_period(periods: &[SolunarPeriod], now: ClockTime, minutes_before: u16) -> bool {
    let now_min = now.minute_of_day();
    periods.iter().any(|period| {
        let diff = (period.start.minute_of_day() + MINUTES_PER_DAY - now_min) % MINUTES_PER_DAY;
        diff > 0 && diff <= minutes_before
    })
}

/// Build the four solunar periods for `date` and assess `reference_now`
/// against them.
///
/// Periods come from `date`'s moon age; only the clock time of
/// `reference_now` is used for the assessment, so a future day's periods can
/// be checked against the present moment. `latitude` is accepted for
/// interface stability but does not influence the timing model.
pub fn solunar_periods(
    date: NaiveDateTime,
    latitude: f64,
    longitude: f64,
    reference_now: NaiveDateTime,
) -> SolunarAssessment {
    let transit = estimate_moon_transit(date, longitude);
    let moonrise = transit - 6.0;
    let moonset = transit + 6.0;
    let anti_transit = transit + 12.0;

    let mut periods = vec![
        SolunarPeriod::centered(moonrise, PeriodKind::Major),
        SolunarPeriod::centered(moonset, PeriodKind::Major),
        SolunarPeriod::centered(transit, PeriodKind::Minor),
        SolunarPeriod::centered(anti_transit, PeriodKind::Minor),
    ];
    // stable: equal starts keep construction order
    periods.sort_by_key(|p| p.start.minute_of_day());

    let now = ClockTime::of(reference_now);
    let in_kind = |kind: PeriodKind| {
        periods
            .iter()
            .filter(|p| p.kind == kind)
            .any(|p| p.contains(now))
    };
    let is_in_major = in_kind(PeriodKind::Major);
    let is_in_minor = in_kind(PeriodKind::Minor);
    let is_near = !is_in_major && !is_in_minor && is_near_period(&periods, now, NEAR_PERIOD_MINUTES);

    let score = if is_in_major {
        100
    } else if is_in_minor {
        70
    } else if is_near {
        30
    } else {
        10
    };

    debug!(
        transit,
        latitude, longitude, score, "solunar periods computed for {}", date
    );

    SolunarAssessment {
        periods,
        is_in_major,
        is_in_minor,
        is_near_period: is_near,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 16)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn ct(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    #[test]
    fn test_clock_time_formatting() {
        assert_eq!(ClockTime::from_decimal_hour(14.5).to_string(), "14:30");
        assert_eq!(ClockTime::from_decimal_hour(25.0).to_string(), "01:00");
        assert_eq!(ClockTime::from_decimal_hour(-1.0).to_string(), "23:00");
        assert_eq!(ClockTime::from_decimal_hour(24.0).to_string(), "00:00");
        // rounding up to a full hour carries into the hour
        assert_eq!(ClockTime::from_decimal_hour(13.9999).to_string(), "14:00");
        assert_eq!(ClockTime::from_decimal_hour(23.9999).to_string(), "00:00");
    }

    #[test]
    fn test_clock_time_parse_rejects_garbage() {
        assert!("7".parse::<ClockTime>().is_err());
        assert!("24:00".parse::<ClockTime>().is_err());
        assert!("ab:cd".parse::<ClockTime>().is_err());
        assert_eq!(ct("07:05").minute_of_day(), 425);
    }

    #[test]
    fn test_time_range_plain_and_wrapping() {
        assert!(is_in_time_range(ct("10:00"), ct("12:00"), ct("10:00")));
        assert!(is_in_time_range(ct("10:00"), ct("12:00"), ct("12:00")));
        assert!(!is_in_time_range(ct("10:00"), ct("12:00"), ct("12:01")));

        assert!(is_in_time_range(ct("23:30"), ct("00:30"), ct("23:45")));
        assert!(is_in_time_range(ct("23:30"), ct("00:30"), ct("00:15")));
        assert!(!is_in_time_range(ct("23:30"), ct("00:30"), ct("01:00")));

        // 00:00 end means end of day
        assert!(is_in_time_range(ct("23:00"), ct("00:00"), ct("23:59")));
        assert!(!is_in_time_range(ct("23:00"), ct("00:00"), ct("00:30")));
    }

    #[test]
    fn test_near_period_looks_across_midnight() {
        let periods = [SolunarPeriod {
            start: ct("00:10"),
            end: ct("01:10"),
            kind: PeriodKind::Minor,
        }];
        assert!(is_near_period(&periods, ct("23:50"), 30));
        assert!(!is_near_period(&periods, ct("23:30"), 30));
        assert!(!is_near_period(&periods, ct("00:10"), 30));
    }

    #[test]
    fn test_transit_shifts_with_longitude() {
        let date = at(12, 0);
        let greenwich = estimate_moon_transit(date, 0.0);
        let east = estimate_moon_transit(date, 15.0);
        let delta = (greenwich - east).rem_euclid(24.0);
        assert!((delta - 1.0).abs() < 1e-9, "delta {delta}");
        assert!((0.0..24.0).contains(&greenwich));
    }

    #[test]
    fn test_latitude_does_not_change_periods() {
        // known limitation: only longitude enters the timing model
        let a = solunar_periods(at(8, 0), 10.0, 13.0, at(8, 0));
        let b = solunar_periods(at(8, 0), 60.0, 13.0, at(8, 0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_four_sorted_periods() {
        for hour in 0..24 {
            let assessment = solunar_periods(at(hour, 0), 47.8, 13.05, at(hour, 0));
            assert_eq!(assessment.periods.len(), 4);
            let majors = assessment
                .periods
                .iter()
                .filter(|p| p.kind == PeriodKind::Major)
                .count();
            assert_eq!(majors, 2);
            for pair in assessment.periods.windows(2) {
                assert!(pair[0].start <= pair[1].start);
            }
        }
    }

    #[test]
    fn test_score_tiers_follow_reference_time() {
        let date = at(0, 0);
        let periods = solunar_periods(date, 0.0, 0.0, date).periods;

        let major = periods.iter().find(|p| p.kind == PeriodKind::Major).unwrap();
        let inside_major = date.date().and_time(
            chrono::NaiveTime::from_hms_opt(major.start.hour(), major.start.minute(), 0).unwrap(),
        ) + chrono::Duration::minutes(30);
        let result = solunar_periods(date, 0.0, 0.0, inside_major);
        assert!(result.is_in_major);
        assert!(!result.is_in_minor);
        assert_eq!(result.score, 100);

        let minor = periods.iter().find(|p| p.kind == PeriodKind::Minor).unwrap();
        let before_minor = date.date().and_time(
            chrono::NaiveTime::from_hms_opt(minor.start.hour(), minor.start.minute(), 0).unwrap(),
        ) - chrono::Duration::minutes(10);
        let result = solunar_periods(date, 0.0, 0.0, before_minor);
        assert!(!result.is_in_major && !result.is_in_minor);
        assert!(result.is_near_period);
        assert_eq!(result.score, 30);
    }

    #[test]
    fn test_moon_rise_set_brackets_transit() {
        let times = moon_rise_set(at(6, 0), 47.8, 13.05);
        let transit = times.transit.minute_of_day() as i32;
        let rise = times.rise.minute_of_day() as i32;
        let set = times.set.minute_of_day() as i32;
        assert_eq!((transit - rise).rem_euclid(1440), 360);
        assert_eq!((set - transit).rem_euclid(1440), 360);
    }
}
