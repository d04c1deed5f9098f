//! # Forecast Orchestration
//!
//! Ties the calculators together: one outlook for the present moment and one
//! per forecast day. All functions take `now` explicitly and never read the
//! system clock.

use crate::best_time::{best_window, hourly_scores, BestTimeWindow};
use crate::config::LocationConfig;
use crate::error::ForecastError;
use crate::lunar::{moon_data, MoonState};
use crate::marine::{MarineContext, MarineDailySummary};
use crate::scoring::{calculate_catch_probability, CatchAssessment, SpeciesProfile};
use crate::solunar::{moon_rise_set, solunar_periods, MoonTimes, SolunarAssessment};
use crate::weather::WeatherSnapshot;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, warn};

/// Conditions right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentOutlook {
    pub at: NaiveDateTime,
    pub moon: MoonState,
    pub moon_times: MoonTimes,
    pub solunar: SolunarAssessment,
    pub catch: CatchAssessment,
}

/// Outlook for one forecast day, evaluated at the current clock time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayOutlook {
    pub date: NaiveDate,
    pub moon: MoonState,
    pub moon_times: MoonTimes,
    pub solunar: SolunarAssessment,
    pub catch: CatchAssessment,
    pub best_time: BestTimeWindow,
    /// Points per hour behind `best_time`
    pub hourly_profile: [u32; 24],
    pub marine: Option<MarineDailySummary>,
}

/// Moon, solunar timing and catch probability at `now`.
pub fn current_outlook(
    weather: &WeatherSnapshot,
    location: &LocationConfig,
    species: Option<&SpeciesProfile>,
    marine: Option<&MarineContext>,
    now: NaiveDateTime,
) -> Result<CurrentOutlook, ForecastError> {
    let moon = moon_data(now);
    let moon_times = moon_rise_set(now, location.latitude, location.longitude);
    let solunar = solunar_periods(now, location.latitude, location.longitude, now);
    let catch = calculate_catch_probability(weather, &moon, &solunar, species, marine, now)?;

    Ok(CurrentOutlook {
        at: now,
        moon,
        moon_times,
        solunar,
        catch,
    })
}

/// One outlook per daily row of `weather`.
///
/// Each day is scored from an approximate snapshot (see
/// [`WeatherSnapshot::for_day`]) at that date with `now`'s clock time. Days
/// that cannot be scored, such as ones without sunrise or sunset, are logged
/// and left out.
pub fn daily_outlook(
    weather: &WeatherSnapshot,
    location: &LocationConfig,
    marine: Option<&MarineContext>,
    now: NaiveDateTime,
) -> Vec<DayOutlook> {
    weather
        .daily
        .iter()
        .filter_map(|day| {
            let at = day.date.and_time(now.time());
            let snapshot = weather.for_day(day);

            let moon = moon_data(at);
            let moon_times = moon_rise_set(at, location.latitude, location.longitude);
            let solunar = solunar_periods(at, location.latitude, location.longitude, at);
            let catch =
                match calculate_catch_probability(&snapshot, &moon, &solunar, None, marine, at) {
                    Ok(catch) => catch,
                    Err(e) => {
                        warn!("skipping outlook for {}: {}", day.date, e);
                        return None;
                    }
                };

            let tides = marine.map(|m| m.tides_on(day.date)).unwrap_or(&[]);
            let hourly_profile =
                hourly_scores(Some(&solunar), snapshot.sunrise, snapshot.sunset, tides);
            let best_time = best_window(&hourly_profile);

            debug!(
                score = catch.overall_score,
                "day outlook for {}: best {}-{}", day.date, best_time.start, best_time.end
            );

            Some(DayOutlook {
                date: day.date,
                moon,
                moon_times,
                solunar,
                catch,
                best_time,
                hourly_profile,
                marine: marine.and_then(|m| m.summary_on(day.date)).cloned(),
            })
        })
        .collect()
}
