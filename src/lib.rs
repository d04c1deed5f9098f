//! # Catch Forecast Core Library
//!
//! Estimates how likely fish are to bite at a given place and time, from the
//! moon, solunar timing, weather and (at the coast) tides and waves.
//!
//! ## Design Philosophy
//!
//! ### Pure calculators
//! Every calculation takes its inputs explicitly, including the reference
//! time, and returns a value. Nothing reads the system clock, the network or
//! the filesystem except [`config`], so two calls with equal inputs give
//! equal results.
//!
//! ### Degrade, don't fail
//! Unknown or non-finite inputs map to neutral sub-scores. The only errors
//! are caller contract violations such as scoring without a pressure trend;
//! see [`ForecastError`].
//!
//! ### Tables as data
//! Moon phases, weight profiles and the rating scale are constant tables
//! ([`lunar::MOON_PHASES`], [`scoring::INLAND_WEIGHTS`],
//! [`scoring::COASTAL_WEIGHTS`], [`scoring::CATCH_RATINGS`]).
//!
//! ## Data Flow
//! 1. **Parse**: Open-Meteo forecast JSON → [`WeatherSnapshot`]; marine JSON
//!    → [`MarineContext`] (tide events, daily wave summaries)
//! 2. **Calculate**: moon state, solunar periods, catch probability
//! 3. **Plan**: per-day outlooks with the best fishing window
//!
//! # Example
//! ```
//! use catch_forecast_lib::{lunar::moon_data, solunar::solunar_periods};
//! use chrono::NaiveDate;
//!
//! let now = NaiveDate::from_ymd_opt(2024, 6, 16)
//!     .unwrap()
//!     .and_hms_opt(21, 0, 0)
//!     .unwrap();
//! let moon = moon_data(now);
//! assert!(moon.illumination_percent <= 100);
//!
//! let solunar = solunar_periods(now, 47.8, 13.05, now);
//! assert_eq!(solunar.periods.len(), 4);
//! ```

pub mod best_time;
pub mod config;
pub mod error;
pub mod forecast;
pub mod lunar;
pub mod marine;
pub mod renderer;
pub mod scoring;
pub mod solunar;
pub mod weather;

pub use error::ForecastError;
pub use forecast::{current_outlook, daily_outlook, CurrentOutlook, DayOutlook};
pub use marine::MarineContext;
pub use scoring::{calculate_catch_probability, CatchAssessment, SpeciesProfile};
pub use weather::WeatherSnapshot;
