//! Moon phase & low-precision lunar age.
//!
//! The moon's age is measured from a single known new moon using the mean
//! synodic month, so the model drifts by hours over decades and ignores
//! orbital eccentricity entirely. Accuracy: a few hours for the age, which is
//! plenty for picking one of eight phases.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;
use std::f64::consts::TAU;

/// Mean synodic month in days.
pub const SYNODIC_MONTH: f64 = 29.530_59;

/// Julian Day of the new moon of 2000-01-06 18:14 UTC.
pub const KNOWN_NEW_MOON_JD: f64 = 2_451_550.26;

/// The reference epoch carries sub-minute digits that a minute-resolution
/// Julian Day cannot express; ages this close to a full cycle count as new.
const EPOCH_TOLERANCE_DAYS: f64 = 1.0 / 1440.0;

/// One of the eight named moon phases and its fishing favourability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoonPhase {
    pub name: &'static str,
    pub emoji: &'static str,
    /// 0–100; new and full moon score highest.
    pub score: u8,
}

/// Phase table indexed by `phase_index` (0 = new, 4 = full).
pub const MOON_PHASES: [MoonPhase; 8] = [
    MoonPhase {
        name: "New Moon",
        emoji: "🌑",
        score: 100,
    },
    MoonPhase {
        name: "Waxing Crescent",
        emoji: "🌒",
        score: 60,
    },
    MoonPhase {
        name: "First Quarter",
        emoji: "🌓",
        score: 40,
    },
    MoonPhase {
        name: "Waxing Gibbous",
        emoji: "🌔",
        score: 65,
    },
    MoonPhase {
        name: "Full Moon",
        emoji: "🌕",
        score: 100,
    },
    MoonPhase {
        name: "Waning Gibbous",
        emoji: "🌖",
        score: 70,
    },
    MoonPhase {
        name: "Last Quarter",
        emoji: "🌗",
        score: 40,
    },
    MoonPhase {
        name: "Waning Crescent",
        emoji: "🌘",
        score: 65,
    },
];

/// Moon state for one moment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoonState {
    /// Phase index 0 – 7 (0 = new, 4 = full).
    pub phase_index: u8,
    pub name: &'static str,
    pub emoji: &'static str,
    /// Illuminated share of the disc, 0–100.
    pub illumination_percent: u8,
    /// Days since the last new moon, rounded to two decimals.
    pub age_days: f64,
    /// Favourability of the phase, 0–100.
    pub score: u8,
}

impl MoonState {
    /// True at new or full moon.
    pub fn is_spring_phase(&self) -> bool {
        self.phase_index == 0 || self.phase_index == 4
    }
}

/// Julian Day for a wall-clock timestamp.
///
/// Jan/Feb count as months 13/14 of the previous year and the Gregorian
/// correction `2 − A + ⌊A/4⌋` (A = ⌊Y/100⌋) is applied. Hours and minutes
/// become the fractional day; seconds are ignored.
pub fn julian_day(date: NaiveDateTime) -> f64 {
    let (mut y, mut m) = (date.year(), date.month() as i32);
    if m <= 2 {
        y -= 1;
        m += 12;
    }
    let day = date.day() as f64 + (date.hour() as f64 + date.minute() as f64 / 60.0) / 24.0;

    let a = (y as f64 / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();

    (365.25 * (y + 4716) as f64).floor() + (30.6001 * (m + 1) as f64).floor() + day + b - 1524.5
}

/// Age of the moon in days, in `[0, SYNODIC_MONTH)`.
pub fn moon_age(date: NaiveDateTime) -> f64 {
    let age = (julian_day(date) - KNOWN_NEW_MOON_JD).rem_euclid(SYNODIC_MONTH);
    if SYNODIC_MONTH - age < EPOCH_TOLERANCE_DAYS {
        0.0
    } else {
        age
    }
}

/// Phase, illumination and favourability for a wall-clock timestamp.
pub fn moon_data(date: NaiveDateTime) -> MoonState {
    let age = moon_age(date);
    let cycle = age / SYNODIC_MONTH;

    let phase_index = ((cycle * 8.0).floor() as usize % 8) as u8;
    // 0 % at new moon, 100 % at full moon
    let illumination = (50.0 * (1.0 - (TAU * cycle).cos())).round().clamp(0.0, 100.0) as u8;
    let phase = &MOON_PHASES[phase_index as usize];

    MoonState {
        phase_index,
        name: phase.name,
        emoji: phase.emoji,
        illumination_percent: illumination,
        age_days: (age * 100.0).round() / 100.0,
        score: phase.score,
    }
}
