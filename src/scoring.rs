//! # Catch Probability Scoring
//!
//! Combines moon phase, solunar timing, weather and (for coastal locations)
//! tide and wave signals into one 0–100 score.
//!
//! ## Algorithm
//!
//! 1. **Sub-scores**: every factor maps its input to 0–100 on its own
//! 2. **Weighting**: one of two fixed [`WeightProfile`]s is chosen by
//!    location; the overall score is the weighted sum over that profile's
//!    factors, whose weights add up to 1.0
//! 3. **Species modifier**: an optional [`SpeciesProfile`] nudges the score
//!    up or down depending on how well the weather matches its preferences
//! 4. **Rating**: the rounded, clamped score is looked up in [`CATCH_RATINGS`]
//!
//! Missing optional inputs map to neutral sub-scores. Scoring refuses to run
//! without a pressure trend or sunrise/sunset.

use crate::error::ForecastError;
use crate::lunar::MoonState;
use crate::marine::{known, MarineContext, TideEvent, TideKind};
use crate::solunar::SolunarAssessment;
use crate::weather::WeatherSnapshot;
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Sub-score for a factor whose input is unknown.
pub const NEUTRAL_SCORE: u8 = 70;

/// Tide sub-score when no tide event is close.
pub const MID_TIDE_SCORE: u8 = 50;

/// Species adjustments are averaged, then scaled by 0.15 on the 0–100 scale.
const SPECIES_MODIFIER_SCALE: f64 = 15.0;

/// Scoring factors. Declaration order is the breakdown order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Factor {
    MoonPhase,
    Solunar,
    Pressure,
    TimeOfDay,
    CloudCover,
    UvIndex,
    Visibility,
    Tides,
    WaveHeight,
}

impl Factor {
    /// Short label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            Factor::MoonPhase => "Moon",
            Factor::Solunar => "Solunar",
            Factor::Pressure => "Pressure",
            Factor::TimeOfDay => "Time of day",
            Factor::CloudCover => "Clouds",
            Factor::UvIndex => "UV index",
            Factor::Visibility => "Visibility",
            Factor::Tides => "Tides",
            Factor::WaveHeight => "Waves",
        }
    }
}

/// Named set of factor weights summing to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightProfile {
    pub name: &'static str,
    pub weights: &'static [(Factor, f64)],
}

/// Seven factors for locations without marine data.
pub const INLAND_WEIGHTS: WeightProfile = WeightProfile {
    name: "inland",
    weights: &[
        (Factor::MoonPhase, 0.20),
        (Factor::Solunar, 0.25),
        (Factor::Pressure, 0.18),
        (Factor::TimeOfDay, 0.12),
        (Factor::CloudCover, 0.10),
        (Factor::UvIndex, 0.08),
        (Factor::Visibility, 0.07),
    ],
};

/// Nine factors; tides and waves take a share from the others.
pub const COASTAL_WEIGHTS: WeightProfile = WeightProfile {
    name: "coastal",
    weights: &[
        (Factor::MoonPhase, 0.18),
        (Factor::Solunar, 0.22),
        (Factor::Pressure, 0.16),
        (Factor::TimeOfDay, 0.10),
        (Factor::CloudCover, 0.09),
        (Factor::UvIndex, 0.07),
        (Factor::Visibility, 0.06),
        (Factor::Tides, 0.08),
        (Factor::WaveHeight, 0.04),
    ],
};

impl WeightProfile {
    pub fn for_location(is_coastal: bool) -> &'static WeightProfile {
        if is_coastal {
            &COASTAL_WEIGHTS
        } else {
            &INLAND_WEIGHTS
        }
    }

    pub fn factors(&self) -> impl Iterator<Item = Factor> + '_ {
        self.weights.iter().map(|(f, _)| *f)
    }

    pub fn weight(&self, factor: Factor) -> Option<f64> {
        self.weights
            .iter()
            .find(|(f, _)| *f == factor)
            .map(|(_, w)| *w)
    }

    pub fn total(&self) -> f64 {
        self.weights.iter().map(|(_, w)| w).sum()
    }

    /// Σ score × weight over this profile's factors; other keys are ignored.
    pub fn weighted_sum(&self, scores: &BTreeMap<Factor, u8>) -> f64 {
        self.weights
            .iter()
            .filter_map(|(factor, weight)| scores.get(factor).map(|s| *s as f64 * weight))
            .sum()
    }
}

/// One row of the rating table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rating {
    pub min: u8,
    pub label: &'static str,
    pub color: &'static str,
    pub color_class: &'static str,
}

/// Ratings by descending threshold; the first row at or below the score wins.
pub const CATCH_RATINGS: [Rating; 4] = [
    Rating {
        min: 75,
        label: "Excellent",
        color: "#22c55e",
        color_class: "rating-excellent",
    },
    Rating {
        min: 55,
        label: "Good",
        color: "#3b82f6",
        color_class: "rating-good",
    },
    Rating {
        min: 35,
        label: "Moderate",
        color: "#f59e0b",
        color_class: "rating-moderate",
    },
    Rating {
        min: 0,
        label: "Poor",
        color: "#ef4444",
        color_class: "rating-poor",
    },
];

pub fn rating_for(score: u8) -> &'static Rating {
    CATCH_RATINGS
        .iter()
        .find(|r| score >= r.min)
        .unwrap_or(&CATCH_RATINGS[CATCH_RATINGS.len() - 1])
}

/// Preferred pressure development of a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureTrendPref {
    Falling,
    Stable,
    Rising,
    /// No preference; the dimension is skipped
    Any,
}

impl PressureTrendPref {
    pub fn matches(&self, trend: f64) -> bool {
        match self {
            PressureTrendPref::Falling => trend < -0.5,
            PressureTrendPref::Rising => trend > 0.5,
            PressureTrendPref::Stable => trend.abs() <= 0.5,
            PressureTrendPref::Any => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperaturePref {
    pub min: f64,
    pub max: f64,
    pub ideal: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressurePref {
    pub trend: PressureTrendPref,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindPref {
    /// km/h
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangePref {
    pub min: f64,
    pub max: f64,
}

/// Weather preferences; any subset may be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherPrefs {
    pub temperature: Option<TemperaturePref>,
    pub pressure: Option<PressurePref>,
    pub wind: Option<WindPref>,
    pub cloud_cover: Option<RangePref>,
}

/// A target species as far as scoring is concerned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesProfile {
    pub name: String,
    #[serde(default)]
    pub weather_prefs: WeatherPrefs,
}

impl SpeciesProfile {
    /// Signed adjustment in points, or `None` if no dimension could be
    /// evaluated. Dimensions whose weather input is unknown are skipped.
    pub fn modifier(&self, weather: &WeatherSnapshot) -> Option<f64> {
        let prefs = &self.weather_prefs;
        let mut adjustments: Vec<f64> = Vec::with_capacity(4);

        if let (Some(pref), Some(temp)) = (prefs.temperature, known(weather.temperature)) {
            adjustments.push(if temp >= pref.min && temp <= pref.max {
                if (temp - pref.ideal).abs() < 3.0 {
                    10.0
                } else {
                    5.0
                }
            } else {
                -15.0
            });
        }

        if let (Some(pref), Some(trend)) = (prefs.pressure, known(weather.pressure_trend)) {
            if pref.trend != PressureTrendPref::Any {
                adjustments.push(if pref.trend.matches(trend) { 10.0 } else { -5.0 });
            }
        }

        if let (Some(pref), Some(wind)) = (prefs.wind, known(weather.wind_speed)) {
            adjustments.push(if wind <= pref.max { 5.0 } else { -10.0 });
        }

        if let (Some(pref), Some(cloud)) = (prefs.cloud_cover, known(weather.cloud_cover)) {
            adjustments.push(if cloud >= pref.min && cloud <= pref.max {
                5.0
            } else {
                0.0
            });
        }

        if adjustments.is_empty() {
            return None;
        }
        let mean = adjustments.iter().sum::<f64>() / adjustments.len() as f64;
        Some(mean * SPECIES_MODIFIER_SCALE)
    }
}

/// Result of one scoring call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatchAssessment {
    /// 0–100
    pub overall_score: u8,
    pub rating_label: &'static str,
    pub color_hex: &'static str,
    pub color_class: &'static str,
    /// Sub-score per factor of the active weight profile
    pub breakdown: BTreeMap<Factor, u8>,
    pub is_coastal: bool,
    pub tip: String,
}

/// Falling pressure is favourable, rising pressure less so.
pub fn pressure_score(trend: f64) -> u8 {
    if trend < -2.0 {
        90
    } else if trend < -0.5 {
        70
    } else if trend > 2.0 {
        40
    } else if trend > 0.5 {
        50
    } else {
        60
    }
}

fn decimal_hour(t: NaiveDateTime) -> f64 {
    t.hour() as f64 + t.minute() as f64 / 60.0
}

/// Dawn and dusk score highest, night beats broad daylight.
pub fn time_of_day_score(now: NaiveDateTime, sunrise: NaiveDateTime, sunset: NaiveDateTime) -> u8 {
    let current = decimal_hour(now);
    let sunrise = decimal_hour(sunrise);
    let sunset = decimal_hour(sunset);

    for edge in [sunrise, sunset] {
        let diff = (current - edge).abs();
        if diff <= 1.0 {
            return 100;
        }
        if diff <= 2.0 {
            return 70;
        }
    }

    if current < sunrise - 2.0 || current > sunset + 2.0 {
        50
    } else {
        40
    }
}

/// 70 under a clear sky rising to 100 under full cover.
pub fn cloud_cover_score(cloud_cover: Option<f64>) -> u8 {
    match known(cloud_cover) {
        Some(cc) => (70.0 + cc.clamp(0.0, 100.0) * 0.3).round() as u8,
        None => NEUTRAL_SCORE,
    }
}

pub fn uv_index_score(uv_index: Option<f64>) -> u8 {
    match known(uv_index) {
        None => NEUTRAL_SCORE,
        Some(uv) if uv <= 2.0 => 100,
        Some(uv) if uv <= 5.0 => 80,
        Some(uv) if uv <= 7.0 => 60,
        Some(_) => 40,
    }
}

/// Slight haze beats perfect clarity.
pub fn visibility_score(visibility_m: Option<f64>) -> u8 {
    match known(visibility_m).map(|m| m / 1000.0) {
        None => NEUTRAL_SCORE,
        Some(km) if km > 10.0 => 60,
        Some(km) if km >= 5.0 => 80,
        Some(_) => 70,
    }
}

/// Closeness to the day's tide turns. Events are checked in order and the
/// first one within two hours decides.
pub fn tide_timing_score(tides: &[TideEvent], now: NaiveDateTime) -> u8 {
    for tide in tides {
        let diff_hours = (now - tide.time).num_seconds().abs() as f64 / 3600.0;
        if diff_hours <= 1.0 {
            return match tide.kind {
                TideKind::High => 90,
                TideKind::Low => 85,
            };
        }
        if diff_hours <= 2.0 {
            return 70;
        }
    }
    MID_TIDE_SCORE
}

/// Light chop is ideal, rough sea poor.
pub fn wave_height_score(wave_height_m: Option<f64>) -> u8 {
    match known(wave_height_m) {
        None => NEUTRAL_SCORE,
        Some(h) if h < 0.5 => 90,
        Some(h) if h <= 1.5 => 100,
        Some(h) if h <= 3.0 => 70,
        Some(_) => 30,
    }
}

/// First applicable observation, or a generic line for the score's tier.
///
/// Checked in order: pressure, moon, solunar, wind, clouds, precipitation,
/// cold.
pub fn generate_tip(
    weather: &WeatherSnapshot,
    moon: &MoonState,
    solunar: &SolunarAssessment,
    overall_score: u8,
) -> String {
    let trend = known(weather.pressure_trend);
    let wind = known(weather.wind_speed);
    let precipitation = known(weather.precipitation);

    let tip = if trend.is_some_and(|t| t < -2.0) {
        Some("Sharply falling pressure: fish are especially active right now!".to_string())
    } else if trend.is_some_and(|t| t < -0.5) {
        Some("Falling pressure tends to trigger feeding.".to_string())
    } else if trend.is_some_and(|t| t > 2.0) {
        Some("Sharply rising pressure makes fish sluggish. Try deeper water.".to_string())
    } else {
        None
    };

    let tip = tip
        .or_else(|| {
            moon.is_spring_phase()
                .then(|| format!("{}: traditionally one of the best phases for fishing.", moon.name))
        })
        .or_else(|| {
            if solunar.is_in_major {
                Some("You are inside a major solunar period: the best time is now!".to_string())
            } else if solunar.is_in_minor {
                Some("Minor solunar period in progress: good odds of a bite.".to_string())
            } else if solunar.is_near_period {
                Some("A solunar period starts soon. Get ready!".to_string())
            } else {
                None
            }
        })
        .or_else(|| match wind {
            Some(w) if w > 30.0 => Some("Strong wind: look for sheltered banks.".to_string()),
            Some(w) if w > 15.0 => Some(
                "Light to moderate wind stirs up the water, good for predators.".to_string(),
            ),
            _ => None,
        })
        .or_else(|| {
            known(weather.cloud_cover)
                .is_some_and(|cc| cc > 70.0)
                .then(|| "Overcast sky: fish are less shy and bite more readily.".to_string())
        })
        .or_else(|| match precipitation {
            Some(p) if p > 0.0 && p < 5.0 => {
                Some("Light rain can encourage feeding.".to_string())
            }
            Some(p) if p >= 5.0 => {
                Some("Heavy rain drives fish into deeper water.".to_string())
            }
            _ => None,
        })
        .or_else(|| {
            known(weather.temperature)
                .is_some_and(|t| t < 5.0)
                .then(|| "Cold water: use small baits and fish slowly.".to_string())
        });

    tip.unwrap_or_else(|| {
        let fallback = match rating_for(overall_score).min {
            75 => "Outstanding conditions: make the most of them!",
            55 => "Good conditions. Try a few different baits.",
            35 => "Moderate conditions. Patience is needed today.",
            _ => "Tough conditions, but luck can strike on days like these too.",
        };
        fallback.to_string()
    })
}

/// Score the catch probability at `now`.
///
/// The location is coastal iff `marine` is given with `is_coastal` set; then
/// tides (events on `now`'s date) and the wave height in `now`'s hour join
/// the breakdown.
pub fn calculate_catch_probability(
    weather: &WeatherSnapshot,
    moon: &MoonState,
    solunar: &SolunarAssessment,
    species: Option<&SpeciesProfile>,
    marine: Option<&MarineContext>,
    now: NaiveDateTime,
) -> Result<CatchAssessment, ForecastError> {
    let trend = known(weather.pressure_trend).ok_or(ForecastError::MissingField("pressure_trend"))?;
    let sunrise = weather.sunrise.ok_or(ForecastError::MissingField("sunrise"))?;
    let sunset = weather.sunset.ok_or(ForecastError::MissingField("sunset"))?;

    let marine = marine.filter(|m| m.is_coastal);
    let is_coastal = marine.is_some();

    let mut scores = BTreeMap::new();
    scores.insert(Factor::MoonPhase, moon.score);
    scores.insert(Factor::Solunar, solunar.score);
    scores.insert(Factor::Pressure, pressure_score(trend));
    scores.insert(Factor::TimeOfDay, time_of_day_score(now, sunrise, sunset));
    scores.insert(Factor::CloudCover, cloud_cover_score(weather.cloud_cover));
    scores.insert(Factor::UvIndex, uv_index_score(weather.uv_index));
    scores.insert(Factor::Visibility, visibility_score(weather.visibility));

    if let Some(marine) = marine {
        scores.insert(
            Factor::Tides,
            tide_timing_score(marine.tides_on(now.date()), now),
        );
        scores.insert(
            Factor::WaveHeight,
            wave_height_score(marine.wave_height_at(now)),
        );
    }

    let profile = WeightProfile::for_location(is_coastal);
    let mut overall = profile.weighted_sum(&scores);

    if let Some(modifier) = species.and_then(|s| s.modifier(weather)) {
        debug!(modifier, "applying species modifier");
        overall += modifier;
    }

    let overall_score = overall.round().clamp(0.0, 100.0) as u8;
    let rating = rating_for(overall_score);
    let tip = generate_tip(weather, moon, solunar, overall_score);

    debug!(
        profile = profile.name,
        overall_score, "catch probability scored at {}", now
    );

    Ok(CatchAssessment {
        overall_score,
        rating_label: rating.label,
        color_hex: rating.color,
        color_class: rating.color_class,
        breakdown: scores,
        is_coastal,
        tip,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lunar::moon_data;
    use crate::marine::{parse_timestamp, DailyTides};
    use crate::solunar::solunar_periods;

    fn ts(raw: &str) -> NaiveDateTime {
        parse_timestamp(raw).unwrap()
    }

    fn weather() -> WeatherSnapshot {
        WeatherSnapshot {
            temperature: Some(16.0),
            wind_speed: Some(8.0),
            pressure_trend: Some(0.0),
            cloud_cover: Some(40.0),
            precipitation: Some(0.0),
            sunrise: Some(ts("2024-06-16T05:00")),
            sunset: Some(ts("2024-06-16T21:00")),
            uv_index: Some(3.0),
            visibility: Some(20_000.0),
            ..WeatherSnapshot::default()
        }
    }

    fn solunar_at(now: NaiveDateTime) -> SolunarAssessment {
        solunar_periods(now, 47.8, 13.05, now)
    }

    #[test]
    fn test_weight_profiles_sum_to_one() {
        assert!((INLAND_WEIGHTS.total() - 1.0).abs() < 1e-9);
        assert!((COASTAL_WEIGHTS.total() - 1.0).abs() < 1e-9);
        assert_eq!(INLAND_WEIGHTS.factors().count(), 7);
        assert_eq!(COASTAL_WEIGHTS.factors().count(), 9);
        assert_eq!(COASTAL_WEIGHTS.weight(Factor::Tides), Some(0.08));
        assert_eq!(INLAND_WEIGHTS.weight(Factor::Tides), None);
    }

    #[test]
    fn test_pressure_tiers() {
        assert_eq!(pressure_score(-3.0), 90);
        assert_eq!(pressure_score(-1.0), 70);
        assert_eq!(pressure_score(0.0), 60);
        assert_eq!(pressure_score(0.5), 60);
        assert_eq!(pressure_score(1.0), 50);
        assert_eq!(pressure_score(2.5), 40);
    }

    #[test]
    fn test_time_of_day_tiers() {
        let sunrise = ts("2024-06-16T05:00");
        let sunset = ts("2024-06-16T21:00");
        assert_eq!(time_of_day_score(ts("2024-06-16T05:45"), sunrise, sunset), 100);
        assert_eq!(time_of_day_score(ts("2024-06-16T06:30"), sunrise, sunset), 70);
        assert_eq!(time_of_day_score(ts("2024-06-16T21:50"), sunrise, sunset), 100);
        assert_eq!(time_of_day_score(ts("2024-06-16T13:00"), sunrise, sunset), 40);
        assert_eq!(time_of_day_score(ts("2024-06-16T01:00"), sunrise, sunset), 50);
        assert_eq!(time_of_day_score(ts("2024-06-16T23:30"), sunrise, sunset), 50);
    }

    #[test]
    fn test_neutral_defaults_for_unknown_inputs() {
        assert_eq!(uv_index_score(None), NEUTRAL_SCORE);
        assert_eq!(uv_index_score(Some(f64::NAN)), NEUTRAL_SCORE);
        assert_eq!(visibility_score(None), NEUTRAL_SCORE);
        assert_eq!(wave_height_score(Some(f64::INFINITY)), NEUTRAL_SCORE);
        assert_eq!(cloud_cover_score(None), NEUTRAL_SCORE);
        assert_eq!(tide_timing_score(&[], ts("2024-06-16T12:00")), MID_TIDE_SCORE);
    }

    #[test]
    fn test_factor_tiers() {
        assert_eq!(cloud_cover_score(Some(0.0)), 70);
        assert_eq!(cloud_cover_score(Some(100.0)), 100);
        assert_eq!(cloud_cover_score(Some(250.0)), 100);
        assert_eq!(uv_index_score(Some(2.0)), 100);
        assert_eq!(uv_index_score(Some(6.0)), 60);
        assert_eq!(uv_index_score(Some(9.0)), 40);
        assert_eq!(visibility_score(Some(12_000.0)), 60);
        assert_eq!(visibility_score(Some(5_000.0)), 80);
        assert_eq!(visibility_score(Some(1_000.0)), 70);
        assert_eq!(wave_height_score(Some(0.2)), 90);
        assert_eq!(wave_height_score(Some(1.5)), 100);
        assert_eq!(wave_height_score(Some(2.5)), 70);
        assert_eq!(wave_height_score(Some(4.0)), 30);
    }

    #[test]
    fn test_tide_timing() {
        let tides = [
            TideEvent {
                time: ts("2024-06-16T06:00"),
                height_m: 1.4,
                kind: TideKind::High,
            },
            TideEvent {
                time: ts("2024-06-16T12:00"),
                height_m: 0.4,
                kind: TideKind::Low,
            },
        ];
        assert_eq!(tide_timing_score(&tides, ts("2024-06-16T06:40")), 90);
        assert_eq!(tide_timing_score(&tides, ts("2024-06-16T11:30")), 85);
        assert_eq!(tide_timing_score(&tides, ts("2024-06-16T13:45")), 70);
        assert_eq!(tide_timing_score(&tides, ts("2024-06-16T09:00")), 50);
    }

    #[test]
    fn test_rating_table() {
        assert_eq!(rating_for(100).label, "Excellent");
        assert_eq!(rating_for(75).label, "Excellent");
        assert_eq!(rating_for(74).label, "Good");
        assert_eq!(rating_for(35).label, "Moderate");
        assert_eq!(rating_for(34).color, "#ef4444");
        assert_eq!(rating_for(0).color_class, "rating-poor");
    }

    #[test]
    fn test_inland_breakdown_has_seven_factors() {
        let now = ts("2024-06-16T12:00");
        let moon = moon_data(now);
        let result = calculate_catch_probability(
            &weather(),
            &moon,
            &solunar_at(now),
            None,
            Some(&MarineContext::inland()),
            now,
        )
        .unwrap();
        assert!(!result.is_coastal);
        assert_eq!(result.breakdown.len(), 7);
        assert!(!result.breakdown.contains_key(&Factor::Tides));
    }

    #[test]
    fn test_coastal_breakdown_has_nine_factors() {
        let now = ts("2024-06-16T12:00");
        let marine = MarineContext {
            is_coastal: true,
            hourly: None,
            tides: vec![DailyTides {
                date: now.date(),
                tides: vec![TideEvent {
                    time: ts("2024-06-16T12:30"),
                    height_m: 1.2,
                    kind: TideKind::High,
                }],
            }],
            daily: Vec::new(),
        };
        let result = calculate_catch_probability(
            &weather(),
            &moon_data(now),
            &solunar_at(now),
            None,
            Some(&marine),
            now,
        )
        .unwrap();
        assert!(result.is_coastal);
        assert_eq!(result.breakdown.len(), 9);
        assert_eq!(result.breakdown[&Factor::Tides], 90);
        assert_eq!(result.breakdown[&Factor::WaveHeight], NEUTRAL_SCORE);
    }

    #[test]
    fn test_overall_is_weighted_sum() {
        let now = ts("2024-06-16T12:00");
        let moon = moon_data(now);
        let solunar = solunar_at(now);
        let result =
            calculate_catch_probability(&weather(), &moon, &solunar, None, None, now).unwrap();
        let expected = INLAND_WEIGHTS.weighted_sum(&result.breakdown).round() as u8;
        assert_eq!(result.overall_score, expected);
        assert_eq!(result.breakdown[&Factor::Pressure], 60);
        assert_eq!(result.breakdown[&Factor::CloudCover], 82);
        assert_eq!(result.breakdown[&Factor::UvIndex], 80);
        assert_eq!(result.breakdown[&Factor::Visibility], 60);
        assert_eq!(result.breakdown[&Factor::TimeOfDay], 40);
        assert_eq!(result.rating_label, rating_for(result.overall_score).label);
    }

    #[test]
    fn test_missing_required_fields() {
        let now = ts("2024-06-16T12:00");
        let moon = moon_data(now);
        let solunar = solunar_at(now);

        let mut no_trend = weather();
        no_trend.pressure_trend = None;
        let err = calculate_catch_probability(&no_trend, &moon, &solunar, None, None, now)
            .unwrap_err();
        assert!(matches!(err, ForecastError::MissingField("pressure_trend")));

        let mut no_sunset = weather();
        no_sunset.sunset = None;
        let err = calculate_catch_probability(&no_sunset, &moon, &solunar, None, None, now)
            .unwrap_err();
        assert!(matches!(err, ForecastError::MissingField("sunset")));
    }

    #[test]
    fn test_species_modifier() {
        let perch = SpeciesProfile {
            name: "Perch".to_string(),
            weather_prefs: WeatherPrefs {
                temperature: Some(TemperaturePref {
                    min: 10.0,
                    max: 22.0,
                    ideal: 17.0,
                }),
                pressure: Some(PressurePref {
                    trend: PressureTrendPref::Falling,
                }),
                wind: None,
                cloud_cover: None,
            },
        };
        // +10 (near ideal) and -5 (trend is stable), averaged
        assert_eq!(perch.modifier(&weather()), Some(2.5 * 15.0));

        let indifferent = SpeciesProfile {
            name: "Carp".to_string(),
            weather_prefs: WeatherPrefs {
                pressure: Some(PressurePref {
                    trend: PressureTrendPref::Any,
                }),
                ..WeatherPrefs::default()
            },
        };
        assert_eq!(indifferent.modifier(&weather()), None);

        let mut unknown_temp = weather();
        unknown_temp.temperature = None;
        let cold_lover = SpeciesProfile {
            name: "Burbot".to_string(),
            weather_prefs: WeatherPrefs {
                temperature: Some(TemperaturePref {
                    min: 0.0,
                    max: 8.0,
                    ideal: 4.0,
                }),
                ..WeatherPrefs::default()
            },
        };
        assert_eq!(cold_lover.modifier(&unknown_temp), None);
        assert_eq!(cold_lover.modifier(&weather()), Some(-15.0 * 15.0));
    }

    #[test]
    fn test_species_wind_and_cloud_adjustments() {
        let profile = |wind: Option<f64>, cloud: Option<(f64, f64)>| SpeciesProfile {
            name: "Zander".to_string(),
            weather_prefs: WeatherPrefs {
                wind: wind.map(|max| WindPref { max }),
                cloud_cover: cloud.map(|(min, max)| RangePref { min, max }),
                ..WeatherPrefs::default()
            },
        };
        // wind 8 km/h, cloud cover 40 %
        assert_eq!(profile(Some(10.0), None).modifier(&weather()), Some(5.0 * 15.0));
        assert_eq!(profile(Some(8.0), None).modifier(&weather()), Some(5.0 * 15.0));
        assert_eq!(profile(Some(5.0), None).modifier(&weather()), Some(-10.0 * 15.0));
        assert_eq!(profile(None, Some((20.0, 60.0))).modifier(&weather()), Some(5.0 * 15.0));
        assert_eq!(profile(None, Some((60.0, 100.0))).modifier(&weather()), Some(0.0));

        // an unmatched cloud range halves the wind bonus
        assert_eq!(
            profile(Some(10.0), Some((60.0, 100.0))).modifier(&weather()),
            Some(2.5 * 15.0)
        );
        assert_eq!(
            profile(Some(5.0), Some((20.0, 60.0))).modifier(&weather()),
            Some(-2.5 * 15.0)
        );

        let mut no_wind = weather();
        no_wind.wind_speed = None;
        assert_eq!(profile(Some(5.0), None).modifier(&no_wind), None);
    }

    #[test]
    fn test_species_modifier_is_clamped() {
        let now = ts("2024-06-16T12:00");
        let moon = moon_data(now);
        let solunar = solunar_at(now);
        let hater = SpeciesProfile {
            name: "Burbot".to_string(),
            weather_prefs: WeatherPrefs {
                temperature: Some(TemperaturePref {
                    min: 0.0,
                    max: 8.0,
                    ideal: 4.0,
                }),
                wind: Some(WindPref { max: 2.0 }),
                ..WeatherPrefs::default()
            },
        };
        let result =
            calculate_catch_probability(&weather(), &moon, &solunar, Some(&hater), None, now)
                .unwrap();
        assert_eq!(result.overall_score, 0);
        assert_eq!(result.rating_label, "Poor");
    }

    #[test]
    fn test_tip_priority() {
        let now = ts("2024-06-16T12:00");
        let moon = moon_data(now);
        let solunar = solunar_at(now);

        let mut dropping = weather();
        dropping.pressure_trend = Some(-3.0);
        dropping.wind_speed = Some(40.0);
        let tip = generate_tip(&dropping, &moon, &solunar, 50);
        assert!(tip.starts_with("Sharply falling pressure"));

        let quiet = SolunarAssessment {
            is_in_major: false,
            is_in_minor: false,
            is_near_period: false,
            score: 10,
            ..solunar.clone()
        };
        let mut calm_moon = moon;
        calm_moon.phase_index = 2;
        let mut windy = weather();
        windy.wind_speed = Some(40.0);
        windy.cloud_cover = Some(90.0);
        assert_eq!(
            generate_tip(&windy, &calm_moon, &quiet, 50),
            "Strong wind: look for sheltered banks."
        );

        let mut cold = weather();
        cold.temperature = Some(2.0);
        assert!(generate_tip(&cold, &calm_moon, &quiet, 50).starts_with("Cold water"));

        assert_eq!(
            generate_tip(&weather(), &calm_moon, &quiet, 80),
            "Outstanding conditions: make the most of them!"
        );
        assert_eq!(
            generate_tip(&weather(), &calm_moon, &quiet, 20),
            "Tough conditions, but luck can strike on days like these too."
        );
    }

    #[test]
    fn test_tip_priority_below_pressure() {
        let now = ts("2024-06-16T12:00");
        let quiet = SolunarAssessment {
            is_in_major: false,
            is_in_minor: false,
            is_near_period: false,
            score: 10,
            ..solunar_at(now)
        };
        let major = SolunarAssessment {
            is_in_major: true,
            score: 100,
            ..quiet.clone()
        };
        let minor = SolunarAssessment {
            is_in_minor: true,
            score: 70,
            ..quiet.clone()
        };
        let near = SolunarAssessment {
            is_near_period: true,
            score: 30,
            ..quiet.clone()
        };
        let new_moon = moon_data(ts("2000-01-06T18:14"));
        let mut calm_moon = new_moon;
        calm_moon.phase_index = 2;

        let mut windy = weather();
        windy.wind_speed = Some(40.0);
        assert_eq!(
            generate_tip(&windy, &new_moon, &major, 50),
            "New Moon: traditionally one of the best phases for fishing."
        );
        assert_eq!(
            generate_tip(&windy, &calm_moon, &major, 50),
            "You are inside a major solunar period: the best time is now!"
        );
        assert_eq!(
            generate_tip(&windy, &calm_moon, &minor, 50),
            "Minor solunar period in progress: good odds of a bite."
        );
        assert_eq!(
            generate_tip(&windy, &calm_moon, &near, 50),
            "A solunar period starts soon. Get ready!"
        );

        let mut breezy = weather();
        breezy.wind_speed = Some(20.0);
        breezy.cloud_cover = Some(90.0);
        assert!(generate_tip(&breezy, &calm_moon, &quiet, 50).starts_with("Light to moderate wind"));

        let mut wet = weather();
        wet.precipitation = Some(2.0);
        wet.temperature = Some(2.0);
        assert_eq!(
            generate_tip(&wet, &calm_moon, &quiet, 50),
            "Light rain can encourage feeding."
        );
        wet.precipitation = Some(6.0);
        assert_eq!(
            generate_tip(&wet, &calm_moon, &quiet, 50),
            "Heavy rain drives fish into deeper water."
        );
        wet.cloud_cover = Some(80.0);
        assert_eq!(
            generate_tip(&wet, &calm_moon, &quiet, 50),
            "Overcast sky: fish are less shy and bite more readily."
        );
    }
}
