//! # Weather Snapshot
//!
//! The scorer consumes a [`WeatherSnapshot`]: current conditions, a 3-hour
//! pressure trend and the day's sunrise/sunset. Snapshots are normally built
//! from an Open-Meteo forecast payload with [`WeatherSnapshot::from_forecast`];
//! fetching that payload is the caller's business.
//!
//! Every numeric field is optional. Unknown or non-finite values fall back to
//! neutral sub-scores, except the pressure trend and sunrise/sunset, which
//! the scorer requires.

use crate::error::ForecastError;
use crate::marine::{known, parse_timestamp};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hours of hourly forecast kept in a snapshot.
const HOURLY_WINDOW: usize = 48;

/// Hours looked back for the pressure trend.
const PRESSURE_TREND_HOURS: usize = 3;

/// Plain-language condition for a WMO weather code, as reported by
/// Open-Meteo. `None` for codes outside the table.
pub fn weather_description(code: u16) -> Option<&'static str> {
    let text = match code {
        0 => "Clear",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Rime fog",
        51 => "Light drizzle",
        53 => "Drizzle",
        55 => "Heavy drizzle",
        61 => "Light rain",
        63 => "Rain",
        65 => "Heavy rain",
        66 => "Freezing rain",
        67 => "Heavy freezing rain",
        71 => "Light snowfall",
        73 => "Snowfall",
        75 => "Heavy snowfall",
        77 => "Snow grains",
        80 => "Light rain showers",
        81 => "Rain showers",
        82 => "Heavy rain showers",
        85 => "Light snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with hail",
        99 => "Thunderstorm with heavy hail",
        _ => return None,
    };
    Some(text)
}

/// One hour of forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub time: NaiveDateTime,
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_gusts: Option<f64>,
    pub pressure: Option<f64>,
    pub uv_index: Option<f64>,
    pub visibility: Option<f64>,
    pub weather_code: Option<u16>,
}

/// One day of forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub precipitation_sum: Option<f64>,
    pub wind_speed_max: Option<f64>,
    pub wind_gusts_max: Option<f64>,
    pub uv_index_max: Option<f64>,
    pub sunrise: Option<NaiveDateTime>,
    pub sunset: Option<NaiveDateTime>,
    pub weather_code: Option<u16>,
}

/// Weather at one moment, as the scorer sees it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// °C
    pub temperature: Option<f64>,
    /// %
    pub humidity: Option<f64>,
    /// km/h
    pub wind_speed: Option<f64>,
    /// degrees
    pub wind_direction: Option<f64>,
    /// km/h
    pub wind_gusts: Option<f64>,
    /// hPa
    pub pressure: Option<f64>,
    /// hPa change over the trailing 3 hours; negative means falling
    pub pressure_trend: Option<f64>,
    /// %
    pub cloud_cover: Option<f64>,
    /// mm
    pub precipitation: Option<f64>,
    /// WMO weather code
    pub weather_code: Option<u16>,
    pub sunrise: Option<NaiveDateTime>,
    pub sunset: Option<NaiveDateTime>,
    pub uv_index: Option<f64>,
    /// metres
    pub visibility: Option<f64>,
    #[serde(default)]
    pub hourly: Vec<HourlyForecast>,
    #[serde(default)]
    pub daily: Vec<DailyForecast>,
}

/// `current` block of the forecast payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentBlock {
    pub temperature_2m: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub precipitation: Option<f64>,
    pub weather_code: Option<u16>,
    pub cloud_cover: Option<f64>,
    pub wind_speed_10m: Option<f64>,
    pub wind_direction_10m: Option<f64>,
    pub wind_gusts_10m: Option<f64>,
    pub pressure_msl: Option<f64>,
}

/// `hourly` block of the forecast payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HourlyBlock {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
    pub weather_code: Vec<Option<u16>>,
    pub cloud_cover: Vec<Option<f64>>,
    pub wind_speed_10m: Vec<Option<f64>>,
    pub wind_direction_10m: Vec<Option<f64>>,
    pub wind_gusts_10m: Vec<Option<f64>>,
    pub pressure_msl: Vec<Option<f64>>,
    pub visibility: Vec<Option<f64>>,
    pub uv_index: Vec<Option<f64>>,
}

/// `daily` block of the forecast payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyBlock {
    pub time: Vec<NaiveDate>,
    pub weather_code: Vec<Option<u16>>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_min: Vec<Option<f64>>,
    pub sunrise: Vec<Option<String>>,
    pub sunset: Vec<Option<String>>,
    pub precipitation_sum: Vec<Option<f64>>,
    pub wind_speed_10m_max: Vec<Option<f64>>,
    pub wind_gusts_10m_max: Vec<Option<f64>>,
    pub uv_index_max: Vec<Option<f64>>,
}

/// Open-Meteo forecast payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub current: CurrentBlock,
    #[serde(default)]
    pub hourly: HourlyBlock,
    #[serde(default)]
    pub daily: DailyBlock,
}

impl ForecastResponse {
    pub fn from_json(raw: &str) -> Result<Self, ForecastError> {
        Ok(serde_json::from_str(raw)?)
    }
}

fn at<T: Copy>(values: &[Option<T>], i: usize) -> Option<T> {
    values.get(i).copied().flatten()
}

fn at_f64(values: &[Option<f64>], i: usize) -> Option<f64> {
    known(at(values, i))
}

/// Index of the hourly slot for `now`: same date and hour, else the nearest.
fn current_index(times: &[Option<NaiveDateTime>], now: NaiveDateTime) -> Option<usize> {
    times
        .iter()
        .position(|t| t.is_some_and(|t| t.date() == now.date() && t.hour() == now.hour()))
        .or_else(|| {
            times
                .iter()
                .enumerate()
                .filter_map(|(i, t)| t.map(|t| (i, (t - now).num_seconds().abs())))
                .min_by_key(|&(_, diff)| diff)
                .map(|(i, _)| i)
        })
}

impl WeatherSnapshot {
    /// Snapshot for `now` from a forecast payload.
    ///
    /// The pressure trend is the pressure at `now`'s slot minus the pressure
    /// three slots earlier, rounded to 0.1 hPa; missing hourly pressures fall
    /// back to the current reading. Sunrise and sunset come from the daily row
    /// of `now`'s date, or the first row if there is none.
    pub fn from_forecast(
        response: &ForecastResponse,
        now: NaiveDateTime,
    ) -> Result<Self, ForecastError> {
        let hourly = &response.hourly;
        let times: Vec<Option<NaiveDateTime>> = hourly
            .time
            .iter()
            .map(|raw| parse_timestamp(raw).ok())
            .collect();
        let idx = current_index(&times, now).ok_or(ForecastError::MissingField("hourly.time"))?;

        let current = &response.current;
        let pressure_now = at_f64(&hourly.pressure_msl, idx).or(known(current.pressure_msl));
        let pressure_before = at_f64(
            &hourly.pressure_msl,
            idx.saturating_sub(PRESSURE_TREND_HOURS),
        )
        .or(pressure_now);
        let pressure_trend = pressure_now
            .zip(pressure_before)
            .map(|(now, before)| ((now - before) * 10.0).round() / 10.0);

        let hourly_rows: Vec<HourlyForecast> = (idx..hourly.time.len())
            .take(HOURLY_WINDOW)
            .filter_map(|i| {
                Some(HourlyForecast {
                    time: times[i]?,
                    temperature: at_f64(&hourly.temperature_2m, i),
                    precipitation: at_f64(&hourly.precipitation, i),
                    precipitation_probability: at_f64(&hourly.precipitation_probability, i),
                    cloud_cover: at_f64(&hourly.cloud_cover, i),
                    wind_speed: at_f64(&hourly.wind_speed_10m, i),
                    wind_direction: at_f64(&hourly.wind_direction_10m, i),
                    wind_gusts: at_f64(&hourly.wind_gusts_10m, i),
                    pressure: at_f64(&hourly.pressure_msl, i),
                    uv_index: at_f64(&hourly.uv_index, i),
                    visibility: at_f64(&hourly.visibility, i),
                    weather_code: at(&hourly.weather_code, i),
                })
            })
            .collect();

        let daily = &response.daily;
        let parse_opt = |raw: Option<&Option<String>>| {
            raw.and_then(|r| r.as_deref())
                .and_then(|r| parse_timestamp(r).ok())
        };
        let daily_rows: Vec<DailyForecast> = daily
            .time
            .iter()
            .enumerate()
            .map(|(i, &date)| DailyForecast {
                date,
                temp_max: at_f64(&daily.temperature_2m_max, i),
                temp_min: at_f64(&daily.temperature_2m_min, i),
                precipitation_sum: at_f64(&daily.precipitation_sum, i),
                wind_speed_max: at_f64(&daily.wind_speed_10m_max, i),
                wind_gusts_max: at_f64(&daily.wind_gusts_10m_max, i),
                uv_index_max: at_f64(&daily.uv_index_max, i),
                sunrise: parse_opt(daily.sunrise.get(i)),
                sunset: parse_opt(daily.sunset.get(i)),
                weather_code: at(&daily.weather_code, i),
            })
            .collect();

        let today = daily_rows
            .iter()
            .find(|d| d.date == now.date())
            .or(daily_rows.first());

        debug!(idx, ?pressure_trend, "weather snapshot built for {}", now);

        Ok(WeatherSnapshot {
            temperature: known(current.temperature_2m),
            humidity: known(current.relative_humidity_2m),
            wind_speed: known(current.wind_speed_10m),
            wind_direction: known(current.wind_direction_10m),
            wind_gusts: known(current.wind_gusts_10m).or(at_f64(&hourly.wind_gusts_10m, idx)),
            pressure: known(current.pressure_msl),
            pressure_trend,
            cloud_cover: known(current.cloud_cover),
            precipitation: known(current.precipitation),
            weather_code: current.weather_code,
            sunrise: today.and_then(|d| d.sunrise),
            sunset: today.and_then(|d| d.sunset),
            uv_index: at_f64(&hourly.uv_index, idx),
            visibility: at_f64(&hourly.visibility, idx),
            hourly: hourly_rows,
            daily: daily_rows,
        })
    }

    /// Approximate whole-day conditions from a daily row, carrying over the
    /// current pressure trend.
    pub fn for_day(&self, day: &DailyForecast) -> Self {
        let temperature = day
            .temp_max
            .zip(day.temp_min)
            .map(|(max, min)| (max + min) / 2.0);
        WeatherSnapshot {
            temperature,
            pressure_trend: self.pressure_trend,
            cloud_cover: Some(50.0),
            wind_speed: day.wind_speed_max.map(|w| w * 0.6),
            precipitation: day.precipitation_sum,
            sunrise: day.sunrise,
            sunset: day.sunset,
            weather_code: day.weather_code,
            ..WeatherSnapshot::default()
        }
    }
}
