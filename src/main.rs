//! # Catch Forecast Application Entry Point
//!
//! Reads Open-Meteo forecast (and optionally marine) JSON from files, scores
//! the current moment and the coming days, and prints a text report or JSON.
//! This is the only place the system clock is read.

use anyhow::Context;
use catch_forecast_lib::config::Config;
use catch_forecast_lib::marine::{parse_timestamp, MarineResponse};
use catch_forecast_lib::renderer::draw_ascii;
use catch_forecast_lib::weather::ForecastResponse;
use catch_forecast_lib::{current_outlook, daily_outlook, MarineContext, WeatherSnapshot};
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "catch-forecast", version, about = "Fishing catch forecast from weather data")]
struct Args {
    /// Open-Meteo forecast JSON
    weather: PathBuf,

    /// Open-Meteo marine JSON; without it the location is scored as inland
    #[arg(long)]
    marine: Option<PathBuf>,

    /// Configuration file [default: catch-forecast.toml]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reference time as YYYY-MM-DDTHH:MM (local); defaults to now
    #[arg(long, value_parser = parse_now)]
    now: Option<NaiveDateTime>,

    /// Print JSON instead of the text report
    #[arg(long)]
    json: bool,
}

fn parse_now(raw: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(raw).map_err(|e| e.to_string())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    location: &'a catch_forecast_lib::config::LocationConfig,
    weather: &'a WeatherSnapshot,
    current: &'a catch_forecast_lib::CurrentOutlook,
    days: &'a [catch_forecast_lib::DayOutlook],
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn load_marine(path: Option<&Path>) -> anyhow::Result<MarineContext> {
    let Some(path) = path else {
        return Ok(MarineContext::inland());
    };
    let response = MarineResponse::from_json(&read_file(path)?)
        .with_context(|| format!("parsing marine data from {}", path.display()))?;
    let context = MarineContext::from_response(response);
    if !context.is_coastal {
        warn!("marine file has no wave heights, scoring as inland");
    }
    Ok(context)
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    let now = args.now.unwrap_or_else(|| Local::now().naive_local());
    info!(%now, location = %config.location.name, "building forecast");

    let forecast = ForecastResponse::from_json(&read_file(&args.weather)?)
        .with_context(|| format!("parsing forecast from {}", args.weather.display()))?;
    let mut weather =
        WeatherSnapshot::from_forecast(&forecast, now).context("building weather snapshot")?;
    weather.daily.truncate(config.forecast.days);

    let marine = load_marine(args.marine.as_deref())?;

    let current = current_outlook(
        &weather,
        &config.location,
        config.forecast.species.as_ref(),
        Some(&marine),
        now,
    )
    .context("scoring current conditions")?;
    let days = daily_outlook(&weather, &config.location, Some(&marine), now);
    if days.len() < weather.daily.len() {
        warn!(
            skipped = weather.daily.len() - days.len(),
            "some forecast days could not be scored"
        );
    }

    if args.json {
        let report = JsonReport {
            location: &config.location,
            weather: &weather,
            current: &current,
            days: &days,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        draw_ascii(&config.location, &weather, &current, &days);
    }

    Ok(())
}
