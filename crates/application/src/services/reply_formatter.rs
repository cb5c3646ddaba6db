//! Reply text for weather results
//!
//! Pure functions from provider data to the message shown to the user.
//! All figures are metric.

use std::fmt::Write as _;

use chrono::NaiveDate;
use domain::ResolvedLocation;

use crate::ports::{CurrentConditions, DailySummary, HistoricalObservation, WeatherCondition};

/// Broad weather picture used to pick a narrative sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outlook {
    Haze,
    Cloud,
    Rain,
    Snow,
    Storm,
    Clear,
    Unknown,
}

impl From<WeatherCondition> for Outlook {
    fn from(condition: WeatherCondition) -> Self {
        match condition {
            WeatherCondition::Fog => Self::Haze,
            WeatherCondition::PartlyCloudy | WeatherCondition::Overcast => Self::Cloud,
            WeatherCondition::Drizzle
            | WeatherCondition::LightRain
            | WeatherCondition::ModerateRain
            | WeatherCondition::HeavyRain => Self::Rain,
            WeatherCondition::Snow => Self::Snow,
            WeatherCondition::Thunderstorm => Self::Storm,
            WeatherCondition::ClearSky | WeatherCondition::MainlyClear => Self::Clear,
            WeatherCondition::Unknown => Self::Unknown,
        }
    }
}

fn narrative(condition: WeatherCondition) -> &'static str {
    match Outlook::from(condition) {
        Outlook::Haze => {
            "Visibility may be poor, so take care on the roads and consider limiting time outdoors if you are sensitive to air quality."
        },
        Outlook::Cloud => {
            "The cloud cover keeps direct sunshine at bay; a light layer and an umbrella would not go amiss."
        },
        Outlook::Rain => "Expect wet conditions, so bring an umbrella or a waterproof jacket.",
        Outlook::Snow => "Snow is likely, so dress warmly and allow extra time for travel.",
        Outlook::Storm => {
            "Thunderstorms are possible; stay indoors during lightning and avoid open ground."
        },
        Outlook::Clear => "Clear skies should make for a pleasant time outdoors; sunscreen is a good idea.",
        Outlook::Unknown => "Conditions are hard to call, so be prepared for changes.",
    }
}

/// Past-tense counterpart of [`narrative`] for observed days
fn past_narrative(condition: WeatherCondition) -> &'static str {
    match Outlook::from(condition) {
        Outlook::Haze => "It was a murky day with poor visibility.",
        Outlook::Cloud => "Clouds kept the sun hidden for much of the day.",
        Outlook::Rain => "It was a wet day, so anyone outdoors would have needed an umbrella.",
        Outlook::Snow => "Snow fell, making it a day for warm clothes and slow travel.",
        Outlook::Storm => "Thunderstorms passed through, so it was a day to stay indoors.",
        Outlook::Clear => "Skies were clear, making it a fine day to be outside.",
        Outlook::Unknown => "The recorded conditions do not give a clear picture of the day.",
    }
}

/// Warning appended for large places where weather can differ across the area
fn large_area_note(location: &ResolvedLocation) -> Option<String> {
    location.is_large_area().then(|| {
        format!(
            "Note: {} covers a large area, so conditions may vary across it.",
            location.name()
        )
    })
}

/// 16-point compass label for a wind direction in degrees
fn compass(degrees: u16) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let index = ((u32::from(degrees % 360) * 100 + 1125) / 2250) % 16;
    POINTS[index as usize]
}

fn finish(mut message: String, sentence: &str, location: &ResolvedLocation) -> String {
    message.push_str("\n\n");
    message.push_str(sentence);
    if let Some(note) = large_area_note(location) {
        message.push_str("\n\n");
        message.push_str(&note);
    }
    message
}

/// Reply for current conditions
#[must_use]
pub fn format_current(location: &ResolvedLocation, current: &CurrentConditions) -> String {
    let mut message = format!(
        "Current weather in {location} (as of {}): {}, {:.1}°C (feels like {:.1}°C).\n\
         Humidity: {}%, Pressure: {:.0} hPa, Wind: {:.1} km/h",
        current.observed_at.format("%H:%M"),
        current.condition,
        current.temperature,
        current.apparent_temperature,
        current.humidity,
        current.pressure,
        current.wind_speed,
    );
    if let Some(direction) = current.wind_direction {
        let _ = write!(message, " from the {}", compass(direction));
    }
    message.push('.');
    finish(message, narrative(current.condition), location)
}

fn day_line(day: &DailySummary) -> String {
    let mut line = format!(
        "{}, {:.1}°C to {:.1}°C",
        day.condition, day.temperature_min, day.temperature_max
    );
    if let Some(chance) = day.precipitation_probability {
        let _ = write!(line, ", {chance}% chance of precipitation");
    }
    if day.precipitation_sum > 0.0 {
        let _ = write!(line, ", {:.1} mm expected", day.precipitation_sum);
    }
    if let Some(wind) = day.wind_speed_max {
        let _ = write!(line, ", wind up to {wind:.1} km/h");
    }
    line
}

fn relative_day(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n => format!("in {n} days"),
    }
}

/// Reply for one or more forecast days
///
/// `days` must be non-empty and ordered by date.
#[must_use]
pub fn format_forecast(location: &ResolvedLocation, days: &[DailySummary], today: NaiveDate) -> String {
    match days {
        [] => format!("No forecast is available for {location}."),
        [day] => {
            let message = format!(
                "Weather in {location} {} ({}): {}.",
                relative_day(day.date, today),
                day.date.format("%A %-d %B"),
                day_line(day)
            );
            finish(message, narrative(day.condition), location)
        },
        [first, .., last] => {
            let mut message = format!(
                "Forecast for {location}, {} to {}:",
                first.date.format("%-d %B"),
                last.date.format("%-d %B")
            );
            for day in days {
                let _ = write!(message, "\n- {}: {}", day.date.format("%a %-d %b"), day_line(day));
            }
            let dominant = days
                .iter()
                .map(|d| d.condition)
                .find(WeatherCondition::is_wet)
                .unwrap_or(first.condition);
            finish(message, narrative(dominant), location)
        },
    }
}

/// Reply for a past day
#[must_use]
pub fn format_historical(location: &ResolvedLocation, observed: &HistoricalObservation) -> String {
    let mut message = format!(
        "Weather in {location} on {}: {}, {:.1}°C to {:.1}°C",
        observed.date.format("%A %-d %B %Y"),
        observed.condition,
        observed.temperature_min,
        observed.temperature_max,
    );
    if let Some(mean) = observed.temperature_mean {
        let _ = write!(message, " (mean {mean:.1}°C)");
    }
    let _ = write!(message, ".\nPrecipitation: {:.1} mm", observed.precipitation_sum);
    if let Some(wind) = observed.wind_speed_max {
        let _ = write!(message, ", Max wind: {wind:.1} km/h");
    }
    message.push('.');
    finish(message, past_narrative(observed.condition), location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{GeoLocation, LocationSource};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn berlin() -> ResolvedLocation {
        ResolvedLocation::new(
            "Berlin",
            GeoLocation::new(52.52, 13.41).unwrap(),
            LocationSource::Geocoded,
        )
        .with_country("Germany")
        .with_population(3_426_354)
    }

    fn village() -> ResolvedLocation {
        ResolvedLocation::new(
            "Hallstatt",
            GeoLocation::new(47.56, 13.65).unwrap(),
            LocationSource::Geocoded,
        )
        .with_population(750)
    }

    fn day(date: NaiveDate, condition: WeatherCondition) -> DailySummary {
        DailySummary {
            date,
            temperature_max: 25.0,
            temperature_min: 15.0,
            condition,
            precipitation_probability: Some(60),
            precipitation_sum: 2.5,
            wind_speed_max: Some(18.0),
        }
    }

    #[test]
    fn compass_points() {
        assert_eq!(compass(0), "N");
        assert_eq!(compass(45), "NE");
        assert_eq!(compass(180), "S");
        assert_eq!(compass(225), "SW");
        assert_eq!(compass(350), "N");
        assert_eq!(compass(360), "N");
    }

    #[test]
    fn current_reply_lists_all_figures() {
        let current = CurrentConditions {
            temperature: 24.34,
            apparent_temperature: 25.1,
            humidity: 60,
            pressure: 1013.2,
            wind_speed: 12.0,
            wind_direction: Some(225),
            condition: WeatherCondition::PartlyCloudy,
            observed_at: date(2024, 6, 10).and_hms_opt(14, 0, 0).unwrap(),
        };
        let message = format_current(&village(), &current);
        assert!(message.starts_with("Current weather in Hallstatt (as of 14:00): Partly cloudy, 24.3°C"));
        assert!(message.contains("feels like 25.1°C"));
        assert!(message.contains("Humidity: 60%"));
        assert!(message.contains("Pressure: 1013 hPa"));
        assert!(message.contains("Wind: 12.0 km/h from the SW."));
        assert!(message.contains("cloud cover"));
        assert!(!message.contains("large area"));
    }

    #[test]
    fn large_city_gets_area_warning() {
        let current = CurrentConditions {
            temperature: 20.0,
            apparent_temperature: 20.0,
            humidity: 50,
            pressure: 1010.0,
            wind_speed: 5.0,
            wind_direction: None,
            condition: WeatherCondition::ClearSky,
            observed_at: date(2024, 6, 10).and_hms_opt(9, 30, 0).unwrap(),
        };
        let message = format_current(&berlin(), &current);
        assert!(message.contains("Berlin, Germany"));
        assert!(message.contains("Note: Berlin covers a large area"));
        assert!(message.contains("Wind: 5.0 km/h."));
    }

    #[test]
    fn single_future_day_uses_in_n_days() {
        let today = date(2024, 6, 10);
        let message = format_forecast(
            &village(),
            &[day(date(2024, 6, 13), WeatherCondition::LightRain)],
            today,
        );
        assert!(message.starts_with("Weather in Hallstatt in 3 days (Thursday 13 June): Light rain"));
        assert!(message.contains("60% chance of precipitation"));
        assert!(message.contains("2.5 mm expected"));
        assert!(message.contains("umbrella"));
    }

    #[test]
    fn single_day_today_and_tomorrow() {
        let today = date(2024, 6, 10);
        let message = format_forecast(&village(), &[day(today, WeatherCondition::Snow)], today);
        assert!(message.contains("Hallstatt today (Monday 10 June)"));

        let message = format_forecast(
            &village(),
            &[day(date(2024, 6, 11), WeatherCondition::Snow)],
            today,
        );
        assert!(message.contains("Hallstatt tomorrow (Tuesday 11 June)"));
    }

    #[test]
    fn multi_day_forecast_has_line_per_day() {
        let today = date(2024, 6, 10);
        let days = [
            day(date(2024, 6, 15), WeatherCondition::ClearSky),
            day(date(2024, 6, 16), WeatherCondition::Thunderstorm),
        ];
        let message = format_forecast(&village(), &days, today);
        assert!(message.starts_with("Forecast for Hallstatt, 15 June to 16 June:"));
        assert!(message.contains("\n- Sat 15 Jun: Clear sky"));
        assert!(message.contains("\n- Sun 16 Jun: Thunderstorm"));
        assert!(message.contains("Thunderstorms are possible"));
    }

    #[test]
    fn empty_forecast_message() {
        let message = format_forecast(&village(), &[], date(2024, 6, 10));
        assert_eq!(message, "No forecast is available for Hallstatt.");
    }

    #[test]
    fn historical_reply() {
        let observed = HistoricalObservation {
            date: date(2024, 6, 7),
            temperature_max: 28.4,
            temperature_min: 19.2,
            temperature_mean: Some(23.5),
            precipitation_sum: 0.0,
            wind_speed_max: Some(14.8),
            condition: WeatherCondition::MainlyClear,
        };
        let message = format_historical(&village(), &observed);
        assert_eq!(
            message,
            "Weather in Hallstatt on Friday 7 June 2024: Mainly clear, 19.2°C to 28.4°C (mean 23.5°C).\n\
             Precipitation: 0.0 mm, Max wind: 14.8 km/h.\n\n\
             Skies were clear, making it a fine day to be outside."
        );
    }

    #[test]
    fn historical_reply_on_wet_day_in_large_city() {
        let observed = HistoricalObservation {
            date: date(2024, 6, 7),
            temperature_max: 17.0,
            temperature_min: 11.5,
            temperature_mean: None,
            precipitation_sum: 12.3,
            wind_speed_max: None,
            condition: WeatherCondition::HeavyRain,
        };
        let message = format_historical(&berlin(), &observed);
        assert!(message.contains("It was a wet day"));
        assert!(!message.contains("bring an umbrella"));
        assert!(message.ends_with("conditions may vary across it."));
    }

    #[test]
    fn past_narrative_is_past_tense() {
        assert!(past_narrative(WeatherCondition::Snow).starts_with("Snow fell"));
        assert!(past_narrative(WeatherCondition::Thunderstorm).contains("passed through"));
    }

    #[test]
    fn fog_uses_haze_narrative() {
        assert!(narrative(WeatherCondition::Fog).contains("Visibility"));
    }
}
