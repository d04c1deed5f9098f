//! # Marine Signal Extraction
//!
//! Turns an Open-Meteo style marine payload into the signals the scorer uses:
//! per-day tide events and per-day wave summaries.
//!
//! ## Tide proxy
//!
//! The marine feed carries no sea-level series, so tides are approximated by
//! local extrema of the hourly wave height: a sample strictly above both
//! neighbours is a high, strictly below both a low. This conflates wind waves
//! with tidal elevation and is a modelling approximation, not a tide table.
//!
//! ## Timestamps
//!
//! Hourly times are local ISO-8601 without offset (`2024-06-16T03:00`). Days
//! are grouped by the date portion; samples whose time cannot be parsed are
//! skipped with a warning.

use crate::error::ForecastError;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Accepted layouts for provider timestamps.
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parse a provider timestamp such as `2024-06-16T03:00`.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, ForecastError> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| ForecastError::InvalidTimestamp(raw.to_string()))
}

/// Finite values only; NaN and infinities count as unknown.
pub(crate) fn known(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Hourly block of the marine payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarineHourly {
    #[serde(default)]
    pub time: Vec<String>,
    /// Significant wave height in metres
    #[serde(default)]
    pub wave_height: Vec<Option<f64>>,
    /// Wave period in seconds
    #[serde(default)]
    pub wave_period: Vec<Option<f64>>,
    /// Wave direction in degrees
    #[serde(default)]
    pub wave_direction: Vec<Option<f64>>,
}

impl MarineHourly {
    /// Wave height of the sample in the same date and hour as `now`.
    pub fn wave_height_at(&self, now: NaiveDateTime) -> Option<f64> {
        let idx = self.time.iter().position(|raw| {
            parse_timestamp(raw)
                .map(|t| t.date() == now.date() && t.hour() == now.hour())
                .unwrap_or(false)
        })?;
        known(self.wave_height.get(idx).copied().flatten())
    }

    /// True if at least one wave height is known.
    pub fn has_wave_data(&self) -> bool {
        self.wave_height.iter().any(|h| known(*h).is_some())
    }
}

/// Daily block of the marine payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarineDaily {
    #[serde(default)]
    pub time: Vec<NaiveDate>,
    #[serde(default)]
    pub wave_height_max: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub wave_direction_dominant: Option<Vec<Option<f64>>>,
}

/// Marine payload as delivered by the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarineResponse {
    #[serde(default)]
    pub hourly: Option<MarineHourly>,
    #[serde(default)]
    pub daily: Option<MarineDaily>,
}

impl MarineResponse {
    pub fn from_json(raw: &str) -> Result<Self, ForecastError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TideKind {
    High,
    Low,
}

/// A detected high or low water.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TideEvent {
    pub time: NaiveDateTime,
    /// Height in metres, rounded to centimetres
    pub height_m: f64,
    pub kind: TideKind,
}

/// Tide events of one calendar day, in series order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTides {
    pub date: NaiveDate,
    pub tides: Vec<TideEvent>,
}

/// Per-day wave conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarineDailySummary {
    pub date: NaiveDate,
    pub wave_height_max_m: Option<f64>,
    /// Mean of that day's hourly wave periods, rounded to 0.1 s
    pub wave_period_avg_s: Option<f64>,
    pub wave_direction_dominant_deg: Option<f64>,
}

/// Detect local wave-height extrema per calendar day.
///
/// Only interior samples of each day are candidates. A triple with any
/// unknown height is skipped but keeps its place in the day. Days without
/// extrema are omitted.
pub fn extract_tide_times(hourly: &MarineHourly) -> Vec<DailyTides> {
    // first-seen day order
    let mut days: Vec<(NaiveDate, Vec<(NaiveDateTime, Option<f64>)>)> = Vec::new();

    for (i, raw) in hourly.time.iter().enumerate() {
        let time = match parse_timestamp(raw) {
            Ok(time) => time,
            Err(err) => {
                warn!("skipping marine sample: {err}");
                continue;
            }
        };
        let height = known(hourly.wave_height.get(i).copied().flatten());
        let date = time.date();
        match days.iter_mut().find(|(d, _)| *d == date) {
            Some((_, samples)) => samples.push((time, height)),
            None => days.push((date, vec![(time, height)])),
        }
    }

    let result: Vec<DailyTides> = days
        .into_iter()
        .filter_map(|(date, samples)| {
            let tides: Vec<TideEvent> = samples
                .windows(3)
                .filter_map(|w| {
                    let (prev, (time, curr), next) = (w[0].1?, w[1], w[2].1?);
                    let curr = curr?;
                    let kind = if curr > prev && curr > next {
                        TideKind::High
                    } else if curr < prev && curr < next {
                        TideKind::Low
                    } else {
                        return None;
                    };
                    Some(TideEvent {
                        time,
                        height_m: (curr * 100.0).round() / 100.0,
                        kind,
                    })
                })
                .collect();
            (!tides.is_empty()).then_some(DailyTides { date, tides })
        })
        .collect();

    debug!("extracted tides for {} days", result.len());
    result
}

/// Summarise each daily row, averaging that date's hourly wave periods.
pub fn parse_marine_daily(response: &MarineResponse) -> Vec<MarineDailySummary> {
    let Some(daily) = &response.daily else {
        return Vec::new();
    };

    let hourly_periods: Vec<(NaiveDate, f64)> = response
        .hourly
        .as_ref()
        .map(|hourly| {
            hourly
                .time
                .iter()
                .zip(hourly.wave_period.iter())
                .filter_map(|(raw, period)| {
                    let time = parse_timestamp(raw).ok()?;
                    Some((time.date(), known(*period)?))
                })
                .collect()
        })
        .unwrap_or_default();

    let column = |values: &Option<Vec<Option<f64>>>, i: usize| {
        values
            .as_ref()
            .and_then(|v| v.get(i).copied().flatten())
            .and_then(|v| known(Some(v)))
    };

    daily
        .time
        .iter()
        .enumerate()
        .map(|(i, &date)| {
            let periods: Vec<f64> = hourly_periods
                .iter()
                .filter(|(d, _)| *d == date)
                .map(|(_, p)| *p)
                .collect();
            let wave_period_avg_s = (!periods.is_empty()).then(|| {
                let avg = periods.iter().sum::<f64>() / periods.len() as f64;
                (avg * 10.0).round() / 10.0
            });

            MarineDailySummary {
                date,
                wave_height_max_m: column(&daily.wave_height_max, i),
                wave_period_avg_s,
                wave_direction_dominant_deg: column(&daily.wave_direction_dominant, i),
            }
        })
        .collect()
}

/// Marine inputs to the scorer. `is_coastal` is trusted as given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarineContext {
    pub is_coastal: bool,
    #[serde(default)]
    pub hourly: Option<MarineHourly>,
    #[serde(default)]
    pub tides: Vec<DailyTides>,
    #[serde(default)]
    pub daily: Vec<MarineDailySummary>,
}

impl MarineContext {
    /// Context for a location without marine data.
    pub fn inland() -> Self {
        MarineContext::default()
    }

    /// Classify and digest a marine payload. A location is coastal iff the
    /// hourly wave-height series holds at least one known value.
    pub fn from_response(response: MarineResponse) -> Self {
        let has_waves = response
            .hourly
            .as_ref()
            .map(MarineHourly::has_wave_data)
            .unwrap_or(false);
        if !has_waves {
            debug!("no wave data, treating location as inland");
            return MarineContext::inland();
        }

        let daily = parse_marine_daily(&response);
        let hourly = response.hourly.unwrap_or_default();
        let tides = extract_tide_times(&hourly);

        MarineContext {
            is_coastal: true,
            hourly: Some(hourly),
            tides,
            daily,
        }
    }

    /// Tide events detected on `date`, empty if none.
    pub fn tides_on(&self, date: NaiveDate) -> &[TideEvent] {
        self.tides
            .iter()
            .find(|day| day.date == date)
            .map(|day| day.tides.as_slice())
            .unwrap_or(&[])
    }

    /// Wave height in the hour containing `now`.
    pub fn wave_height_at(&self, now: NaiveDateTime) -> Option<f64> {
        self.hourly.as_ref().and_then(|h| h.wave_height_at(now))
    }

    /// Daily summary for `date`.
    pub fn summary_on(&self, date: NaiveDate) -> Option<&MarineDailySummary> {
        self.daily.iter().find(|s| s.date == date)
    }
}
