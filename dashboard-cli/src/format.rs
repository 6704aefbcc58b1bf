//! Human-friendly output formatting for the dashboard.

use chrono::DateTime;
use dashboard_core::model::{
    CurrentWeather, DailyForecast, HourlyForecast, Location, WeatherCondition, WeatherData,
};

pub fn format_temperature(temp: f64) -> String {
    format!("{}\u{b0}C", temp.round() as i64)
}

/// Wind speed arrives in m/s; shown as km/h.
pub fn format_wind_speed(mps: f64) -> String {
    format!("{} km/h", (mps * 3.6).round() as i64)
}

pub fn format_precipitation(pop: f64) -> String {
    format!("{}%", (pop * 100.0).round() as i64)
}

pub fn uv_description(uvi: f64) -> &'static str {
    if uvi >= 11.0 {
        "Extreme"
    } else if uvi >= 8.0 {
        "Very High"
    } else if uvi >= 6.0 {
        "High"
    } else if uvi >= 3.0 {
        "Moderate"
    } else {
        "Low"
    }
}

/// Emoji for an OpenWeather icon token.
pub fn weather_icon(icon: &str) -> &'static str {
    match icon {
        "01d" => "\u{2600}\u{fe0f}",
        "01n" => "\u{1f319}",
        "02d" => "\u{1f324}\u{fe0f}",
        "02n" | "03d" | "03n" | "04d" | "04n" => "\u{2601}\u{fe0f}",
        "09d" | "09n" | "10n" => "\u{1f327}\u{fe0f}",
        "10d" => "\u{1f326}\u{fe0f}",
        "11d" | "11n" => "\u{26c8}\u{fe0f}",
        "13d" | "13n" => "\u{1f328}\u{fe0f}",
        "50d" | "50n" => "\u{1f32b}\u{fe0f}",
        _ => "\u{2753}",
    }
}

/// Unix seconds to a `Wed, Nov 15` style date.
pub fn format_date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%a, %b %-d").to_string())
        .unwrap_or_else(|| "Invalid date".to_string())
}

/// Unix seconds to a `07:45` style clock reading (UTC).
pub fn format_clock(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

fn headline(conditions: &[WeatherCondition]) -> String {
    conditions
        .first()
        .map(|c| format!("{} {}", c.description, weather_icon(&c.icon)))
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn render_dashboard(location: &Location, data: &WeatherData) -> String {
    let mut out = String::new();
    out.push_str(&render_current(location, &data.current));
    out.push('\n');
    out.push_str(&render_hourly(&data.hourly));
    out.push('\n');
    out.push_str(&render_daily(&data.daily));

    if let Some(alerts) = &data.alerts {
        for alert in alerts {
            out.push_str(&format!(
                "\nALERT [{:?}] {}: {}\n",
                alert.severity, alert.event, alert.description
            ));
        }
    }

    out
}

pub fn render_current(location: &Location, current: &CurrentWeather) -> String {
    let place = if location.country.is_empty() {
        location.name.clone()
    } else {
        format!("{}, {}", location.name, location.country)
    };

    let mut out = format!("{place}\n");
    out.push_str(&format!("  Conditions: {}\n", headline(&current.weather)));
    out.push_str(&format!(
        "  Temperature: {} (feels like {})\n",
        format_temperature(current.temp),
        format_temperature(current.feels_like)
    ));
    out.push_str(&format!("  Humidity: {}%\n", current.humidity));
    out.push_str(&format!("  Wind: {}\n", format_wind_speed(current.wind_speed)));
    out.push_str(&format!("  Pressure: {} hPa\n", current.pressure));
    out.push_str(&format!("  Visibility: {} m\n", current.visibility));
    out.push_str(&format!("  Cloud cover: {}%\n", current.clouds));
    out.push_str(&format!(
        "  Dew point: {}\n",
        format_temperature(current.dew_point)
    ));
    out.push_str(&format!(
        "  UV index: {} ({})\n",
        current.uvi.round() as i64,
        uv_description(current.uvi)
    ));
    out.push_str(&format!(
        "  Sunrise: {}  Sunset: {}\n",
        format_clock(current.sunrise),
        format_clock(current.sunset)
    ));
    out
}

pub fn render_hourly(hourly: &[HourlyForecast]) -> String {
    let mut out = String::from("Next 24 hours:\n");
    for slot in hourly {
        out.push_str(&format!(
            "  {}  {:>5}  {}  precip {}\n",
            format_clock(slot.dt),
            format_temperature(slot.temp),
            headline(&slot.weather),
            format_precipitation(slot.pop)
        ));
    }
    out
}

pub fn render_daily(daily: &[DailyForecast]) -> String {
    let mut out = String::from("5-day forecast:\n");
    for day in daily {
        out.push_str(&format!(
            "  {}  {} (low {}, high {})  {}  precip {}\n",
            format_date(day.dt),
            format_temperature(day.temp.day),
            format_temperature(day.temp.min),
            format_temperature(day.temp.max),
            headline(&day.weather),
            format_precipitation(day.pop)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_is_rounded_with_unit() {
        assert_eq!(format_temperature(12.3), "12\u{b0}C");
        assert_eq!(format_temperature(-0.6), "-1\u{b0}C");
    }

    #[test]
    fn wind_speed_converts_to_kmh() {
        assert_eq!(format_wind_speed(5.0), "18 km/h");
        assert_eq!(format_wind_speed(0.0), "0 km/h");
    }

    #[test]
    fn precipitation_is_a_percentage() {
        assert_eq!(format_precipitation(0.0), "0%");
        assert_eq!(format_precipitation(0.35), "35%");
        assert_eq!(format_precipitation(1.0), "100%");
    }

    #[test]
    fn uv_descriptions_follow_the_standard_bands() {
        assert_eq!(uv_description(0.0), "Low");
        assert_eq!(uv_description(3.0), "Moderate");
        assert_eq!(uv_description(6.0), "High");
        assert_eq!(uv_description(8.0), "Very High");
        assert_eq!(uv_description(11.0), "Extreme");
    }

    #[test]
    fn unknown_icon_token_gets_a_placeholder() {
        assert_eq!(weather_icon("01d"), "\u{2600}\u{fe0f}");
        assert_eq!(weather_icon("zz"), "\u{2753}");
    }

    #[test]
    fn dates_and_clocks_render_in_utc() {
        // 2023-11-14 22:13:20 UTC
        assert_eq!(format_date(1_700_000_000), "Tue, Nov 14");
        assert_eq!(format_clock(1_700_000_000), "22:13");
    }
}
