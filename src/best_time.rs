//! Best fishing window of a day.
//!
//! Every hour of the day collects points from the events that fall on or
//! next to it; the window of 2–6 consecutive hours with the highest average
//! wins. Windows do not wrap past midnight.

use crate::marine::TideEvent;
use crate::solunar::{ClockTime, PeriodKind, SolunarAssessment};
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

pub const MAJOR_PERIOD_POINTS: u32 = 40;
pub const MINOR_PERIOD_POINTS: u32 = 20;
pub const TWILIGHT_POINTS: u32 = 25;
pub const TIDE_POINTS: u32 = 15;

const MIN_WINDOW_HOURS: usize = 2;
const MAX_WINDOW_HOURS: usize = 6;

/// Highest-scoring block of whole hours; `end` is the exclusive boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestTimeWindow {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl BestTimeWindow {
    /// Whether hour `h` (0–23) lies inside the window.
    pub fn covers_hour(&self, hour: u32) -> bool {
        let start = self.start.hour();
        let end = match self.end.hour() {
            0 => 24,
            h => h,
        };
        hour >= start && hour < end
    }
}

/// Add `points` to `hour` and its neighbours, wrapping around midnight.
fn add_around(scores: &mut [u32; 24], hour: u32, points: u32) {
    for offset in [23, 0, 1] {
        scores[((hour + offset) % 24) as usize] += points;
    }
}

/// Points per hour of the day.
///
/// A solunar period marks every hour from the floor of its start to the
/// ceiling of its end, or both tails for a period crossing midnight.
/// Sunrise, sunset and every tide event mark their hour ±1.
pub fn hourly_scores(
    solunar: Option<&SolunarAssessment>,
    sunrise: Option<NaiveDateTime>,
    sunset: Option<NaiveDateTime>,
    tides: &[TideEvent],
) -> [u32; 24] {
    let mut scores = [0u32; 24];

    for period in solunar.map(|s| s.periods.as_slice()).unwrap_or(&[]) {
        let start = period.start.decimal_hour();
        let end = period.end.decimal_hour();
        let first = start.floor() as u32;
        let last = end.ceil() as u32;
        let points = match period.kind {
            PeriodKind::Major => MAJOR_PERIOD_POINTS,
            PeriodKind::Minor => MINOR_PERIOD_POINTS,
        };

        for h in 0..24u32 {
            let overlaps = (h >= first && h <= last) || (end < start && (h >= first || h <= last));
            if overlaps {
                scores[h as usize] += points;
            }
        }
    }

    for twilight in [sunrise, sunset].into_iter().flatten() {
        add_around(&mut scores, twilight.hour(), TWILIGHT_POINTS);
    }

    for tide in tides {
        add_around(&mut scores, tide.time.hour(), TIDE_POINTS);
    }

    scores
}

/// Window with the highest average over [`hourly_scores`].
///
/// Candidates are visited by ascending start, then ascending length, and
/// only a strictly higher average replaces the current best. With no
/// positive hour the result is 00:00–02:00.
pub fn calculate_best_fishing_time(
    solunar: Option<&SolunarAssessment>,
    sunrise: Option<NaiveDateTime>,
    sunset: Option<NaiveDateTime>,
    tides: &[TideEvent],
) -> BestTimeWindow {
    let scores = hourly_scores(solunar, sunrise, sunset, tides);
    best_window(&scores)
}

/// Search step of [`calculate_best_fishing_time`] over precomputed scores.
pub fn best_window(scores: &[u32; 24]) -> BestTimeWindow {
    let (mut best_start, mut best_end, mut best_avg) = (0usize, 1usize, 0.0f64);

    for start in 0..24 {
        for len in MIN_WINDOW_HOURS..=MAX_WINDOW_HOURS {
            if start + len > 24 {
                break;
            }
            let sum: u32 = scores[start..start + len].iter().sum();
            let avg = sum as f64 / len as f64;
            if avg > best_avg {
                best_avg = avg;
                best_start = start;
                best_end = start + len - 1;
            }
        }
    }

    BestTimeWindow {
        start: ClockTime::new(best_start as u32, 0),
        end: ClockTime::new(best_end as u32 + 1, 0),
    }
}
