//! # Report Rendering
//!
//! Plain-text rendering of outlooks for the terminal. The day chart plots the
//! hourly profile behind the best-time search as a bar grid, with the chosen
//! window highlighted.

use crate::config::LocationConfig;
use crate::forecast::{CurrentOutlook, DayOutlook};
use crate::scoring::CatchAssessment;
use crate::weather::{weather_description, WeatherSnapshot};
use std::fmt::Write;

const CHART_ROWS: usize = 8;
const Y_AXIS_WIDTH: usize = 5;
const SCORE_BAR_WIDTH: usize = 20;

/// Fixed-width bar for a 0–100 score.
fn score_bar(score: u8) -> String {
    let filled = (score as usize * SCORE_BAR_WIDTH + 50) / 100;
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(SCORE_BAR_WIDTH - filled)
    )
}

fn format_optional(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.1} {}", v, unit),
        _ => "--".to_string(),
    }
}

fn describe(code: Option<u16>) -> &'static str {
    code.and_then(weather_description).unwrap_or("Unknown conditions")
}

fn write_breakdown(out: &mut String, catch: &CatchAssessment) {
    for (factor, score) in &catch.breakdown {
        let _ = writeln!(
            out,
            "  {:<12}{} {:>3}",
            factor.label(),
            score_bar(*score),
            score
        );
    }
}

/// Bar grid of the hourly profile, one column per hour. Hours inside the
/// best window are drawn with `█`, all others with `▒`.
pub fn render_hourly_chart(day: &DayOutlook) -> String {
    let profile = &day.hourly_profile;
    let max = profile.iter().copied().max().unwrap_or(0).max(1);
    let mut grid = vec![vec![' '; Y_AXIS_WIDTH + 24 * 2]; CHART_ROWS];

    for (row, line) in grid.iter_mut().enumerate() {
        let level = CHART_ROWS - row;
        if row == 0 || row == CHART_ROWS - 1 {
            let value = max as usize * level / CHART_ROWS;
            let label = format!("{:>width$}", value, width = Y_AXIS_WIDTH - 1);
            for (i, ch) in label.chars().enumerate().take(Y_AXIS_WIDTH - 1) {
                line[i] = ch;
            }
        }
        line[Y_AXIS_WIDTH - 1] = '│';

        for (hour, points) in profile.iter().enumerate() {
            // bar height in rows, rounded up so any positive hour shows
            let height = (*points as usize * CHART_ROWS).div_ceil(max as usize);
            if height >= level {
                let mark = if day.best_time.covers_hour(hour as u32) {
                    '█'
                } else {
                    '▒'
                };
                line[Y_AXIS_WIDTH + hour * 2] = mark;
            }
        }
    }

    let mut out = String::new();
    for row in grid {
        let _ = writeln!(out, "{}", row.into_iter().collect::<String>().trim_end());
    }

    let padding = " ".repeat(Y_AXIS_WIDTH);
    let markers: String = (0..24)
        .map(|h| if h % 6 == 0 { "| " } else { "  " })
        .collect();
    let _ = writeln!(out, "{}{}", padding, markers.trim_end());
    let _ = writeln!(
        out,
        "{}{:<12}{:<12}{:<12}{:<12}",
        padding, "00", "06", "12", "18"
    );
    out
}

/// Full plain-text report.
pub fn render_report(
    location: &LocationConfig,
    weather: &WeatherSnapshot,
    current: &CurrentOutlook,
    days: &[DayOutlook],
) -> String {
    let mut out = String::new();
    let catch = &current.catch;

    let _ = writeln!(
        out,
        "Catch forecast for {} ({:.4}, {:.4})",
        location.name, location.latitude, location.longitude
    );
    let _ = writeln!(out, "{}", current.at.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "Now: {} / 100  {}  [{}]",
        catch.overall_score,
        catch.rating_label,
        if catch.is_coastal { "coastal" } else { "inland" }
    );
    write_breakdown(&mut out, catch);
    let _ = writeln!(out, "Tip: {}", catch.tip);
    let _ = writeln!(out);

    let moon = &current.moon;
    let _ = writeln!(
        out,
        "Moon: {} {} ({}% lit, {:.1} days old)",
        moon.emoji, moon.name, moon.illumination_percent, moon.age_days
    );
    let _ = writeln!(
        out,
        "Moonrise ~{}  transit ~{}  moonset ~{}",
        current.moon_times.rise, current.moon_times.transit, current.moon_times.set
    );
    let periods: Vec<String> = current
        .solunar
        .periods
        .iter()
        .map(|p| format!("{:?} {}-{}", p.kind, p.start, p.end))
        .collect();
    let _ = writeln!(out, "Solunar: {}", periods.join(", "));
    let _ = writeln!(
        out,
        "Weather: {}, {}, wind {}, pressure trend {}, clouds {}",
        describe(weather.weather_code),
        format_optional(weather.temperature, "°C"),
        format_optional(weather.wind_speed, "km/h"),
        format_optional(weather.pressure_trend, "hPa/3h"),
        format_optional(weather.cloud_cover, "%"),
    );

    for day in days {
        let code = weather
            .daily
            .iter()
            .find(|d| d.date == day.date)
            .and_then(|d| d.weather_code);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}  {} {:>3} / 100  {}  best {}-{}  {}",
            day.date.format("%a %d.%m."),
            day.moon.emoji,
            day.catch.overall_score,
            day.catch.rating_label,
            day.best_time.start,
            day.best_time.end,
            describe(code)
        );
        if let Some(marine) = &day.marine {
            let _ = writeln!(
                out,
                "  Waves: max {}, period {}",
                format_optional(marine.wave_height_max_m, "m"),
                format_optional(marine.wave_period_avg_s, "s")
            );
        }
        out.push_str(&render_hourly_chart(day));
    }

    out
}

/// Print the report to stdout.
pub fn draw_ascii(
    location: &LocationConfig,
    weather: &WeatherSnapshot,
    current: &CurrentOutlook,
    days: &[DayOutlook],
) {
    print!("{}", render_report(location, weather, current, days));
}
