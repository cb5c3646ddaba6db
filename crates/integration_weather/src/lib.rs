//! Open-Meteo weather integration
//!
//! Client for the Open-Meteo customer APIs (<https://open-meteo.com>):
//! current conditions, daily forecasts, historical observations and
//! place search. Requests are authenticated with an `apikey` parameter.

pub mod client;
mod models;

pub use client::{OpenMeteoClient, WeatherClient, WeatherConfig, WeatherError, archive_start};
pub use models::{CurrentWeather, DailyForecast, DailyObservation, Place, WeatherCondition};
