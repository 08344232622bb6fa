use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::model::{Coordinates, CurrentSample, DailyEntry};

use super::WeatherProvider;

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Upper bound on any single provider request. The API does not document a
/// latency guarantee, so a stuck request would otherwise hang the session.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Open-Meteo client. No API key required; all values in metric units.
#[derive(Debug, Clone, Default)]
pub struct OpenMeteoProvider {
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    async fn fetch(&self, url: &str, query: &[(&str, String)], what: &str) -> Result<String> {
        let res = self
            .http
            .get(url)
            .query(query)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Open-Meteo ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read Open-Meteo {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    latitude: f64,
    longitude: f64,
}

// `results` is omitted entirely when nothing matched.
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeoResult>>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<NaiveDate>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    weathercode: Vec<u16>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherBlock {
    temperature: f64,
    weathercode: u16,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current_weather: CurrentWeatherBlock,
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn geocode(&self, city: &str) -> Result<Option<Coordinates>> {
        let query = [
            ("name", city.to_string()),
            ("count", "1".to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];

        let body = self.fetch(GEOCODING_URL, &query, "geocoding").await?;
        parse_geocoding_body(&body)
    }

    async fn daily_forecast(
        &self,
        coordinates: Coordinates,
        days: u8,
    ) -> Result<Vec<DailyEntry>> {
        let query = [
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            (
                "daily",
                "temperature_2m_max,temperature_2m_min,weathercode".to_string(),
            ),
            ("timezone", "auto".to_string()),
            ("forecast_days", days.to_string()),
        ];

        let body = self.fetch(FORECAST_URL, &query, "forecast").await?;
        parse_forecast_body(&body)
    }

    async fn current(&self, coordinates: Coordinates) -> Result<CurrentSample> {
        let query = [
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("current_weather", "true".to_string()),
        ];

        let body = self.fetch(FORECAST_URL, &query, "current weather").await?;

        let parsed: CurrentResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo current JSON")?;

        Ok(CurrentSample {
            temperature: parsed.current_weather.temperature,
            condition_code: parsed.current_weather.weathercode,
            // The API reports observation time in the station's local zone
            // without an offset; the fetch instant is close enough.
            observed_at: Utc::now(),
        })
    }
}

fn parse_geocoding_body(body: &str) -> Result<Option<Coordinates>> {
    let parsed: GeocodingResponse =
        serde_json::from_str(body).context("Failed to parse Open-Meteo geocoding JSON")?;

    Ok(parsed
        .results
        .unwrap_or_default()
        .into_iter()
        .next()
        .map(|r| Coordinates {
            latitude: r.latitude,
            longitude: r.longitude,
        }))
}

fn parse_forecast_body(body: &str) -> Result<Vec<DailyEntry>> {
    let parsed: ForecastResponse =
        serde_json::from_str(body).context("Failed to parse Open-Meteo forecast JSON")?;

    let daily = parsed.daily;
    let len = daily.time.len();
    if daily.temperature_2m_max.len() != len
        || daily.temperature_2m_min.len() != len
        || daily.weathercode.len() != len
    {
        return Err(anyhow!(
            "Open-Meteo forecast response has mismatched daily series lengths"
        ));
    }

    Ok(daily
        .time
        .into_iter()
        .enumerate()
        .map(|(i, date)| DailyEntry {
            date,
            temperature_max: daily.temperature_2m_max[i],
            temperature_min: daily.temperature_2m_min[i],
            condition_code: daily.weathercode[i],
        })
        .collect())
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    // Error bodies are arbitrary bytes-as-UTF-8; cutting mid-character would
    // panic, so back up to the nearest boundary.
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocoding_body_with_results_yields_first_match() {
        let body = r#"{"results":[
            {"name":"Lisbon","latitude":38.71667,"longitude":-9.13333},
            {"name":"Lisbon NH","latitude":44.2,"longitude":-71.9}
        ]}"#;

        let coords = parse_geocoding_body(body).expect("parse").expect("match");
        assert!((coords.latitude - 38.71667).abs() < 1e-9);
        assert!((coords.longitude + 9.13333).abs() < 1e-9);
    }

    #[test]
    fn geocoding_body_without_results_is_not_found() {
        let body = r#"{"generationtime_ms":0.5}"#;
        let coords = parse_geocoding_body(body).expect("parse");
        assert!(coords.is_none());
    }

    #[test]
    fn forecast_body_zips_daily_series() {
        let body = r#"{"daily":{
            "time":["2026-08-24","2026-08-25"],
            "temperature_2m_max":[28.1,24.0],
            "temperature_2m_min":[17.3,16.2],
            "weathercode":[0,61]
        }}"#;

        let entries = parse_forecast_body(body).expect("parse");
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].date,
            NaiveDate::from_ymd_opt(2026, 8, 24).expect("valid date")
        );
        assert_eq!(entries[0].condition_code, 0);
        assert_eq!(entries[1].condition_code, 61);
        assert!((entries[1].temperature_min - 16.2).abs() < 1e-9);
    }

    #[test]
    fn truncated_error_body_stops_at_a_char_boundary() {
        // 199 ASCII bytes put the cut point inside the first 'é'.
        let mut body = "x".repeat(199);
        body.push_str("éé");

        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 203);

        // Short bodies pass through untouched.
        assert_eq!(truncate_body("être"), "être");
    }

    #[test]
    fn forecast_body_with_mismatched_lengths_is_an_error() {
        let body = r#"{"daily":{
            "time":["2026-08-24","2026-08-25"],
            "temperature_2m_max":[28.1],
            "temperature_2m_min":[17.3,16.2],
            "weathercode":[0,61]
        }}"#;

        let err = parse_forecast_body(body).unwrap_err();
        assert!(err.to_string().contains("mismatched"));
    }
}
