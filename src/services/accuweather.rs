//! AccuWeather client.
//!
//! Implements the location and forecast traits on top of the AccuWeather
//! Core Weather API (location search, daily forecasts, current conditions
//! and the 1-hour hourly forecast).
//! See: https://developer.accuweather.com/apis

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::errors::{AppError, SourceError};
use crate::helpers::{calendar_date, clamped_percent, percent_or_zero};
use crate::models::{CurrentConditions, ForecastDay, Horizon};
use crate::services::source::{ForecastSource, LocationResolver, ResolvedLocation};

/// Client for the AccuWeather API.
#[derive(Debug, Clone)]
pub struct AccuWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
}

// --- AccuWeather JSON response types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwLocation {
    key: String,
    geo_position: AwGeoPosition,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwGeoPosition {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwDailyResponse {
    daily_forecasts: Vec<AwDailyForecast>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwDailyForecast {
    date: String,
    temperature: AwTemperatureRange,
    day: Option<AwHalfDay>,
    night: Option<AwHalfDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwTemperatureRange {
    minimum: AwValue,
    maximum: AwValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwHalfDay {
    precipitation_probability: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwValue {
    value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwCurrentConditions {
    weather_text: String,
    temperature: AwMetricValue,
    wind: AwWind,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwMetricValue {
    metric: AwValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwWind {
    speed: AwMetricValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwHourlyForecast {
    precipitation_probability: Option<f64>,
}

impl AccuWeatherClient {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        })
    }

    /// GET `{base_url}{path}` and return the raw body.
    ///
    /// Connection failures, timeouts and non-success statuses are all
    /// transport errors; decoding is left to the caller.
    async fn get_body(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, SourceError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("AccuWeather GET {}", path);

        let response = self
            .client
            .get(&url)
            .query(&[("apikey", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::Transport(format!("AccuWeather request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Transport(format!(
                "AccuWeather returned HTTP {} for {}",
                response.status(),
                path
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SourceError::Transport(format!("AccuWeather body read failed: {}", e)))?;

        Ok(body.to_vec())
    }
}

fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, SourceError> {
    serde_json::from_slice(body)
        .map_err(|e| {
            SourceError::MalformedResponse(format!("AccuWeather {} response: {}", what, e))
        })
}

/// Pick the best (first) location search hit.
fn parse_location(body: &[u8], name: &str) -> Result<ResolvedLocation, SourceError> {
    let hits: Vec<AwLocation> = decode(body, "location search")?;
    let best = hits
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::NotFound(name.to_string()))?;

    Ok(ResolvedLocation {
        identifier: best.key,
        latitude: best.geo_position.latitude,
        longitude: best.geo_position.longitude,
    })
}

/// Convert a daily forecast response into exactly `horizon.days()` records,
/// ordered by date.
fn parse_daily_forecast(body: &[u8], horizon: Horizon) -> Result<Vec<ForecastDay>, SourceError> {
    let response: AwDailyResponse = decode(body, "daily forecast")?;

    let mut days = response
        .daily_forecasts
        .into_iter()
        .map(|d| {
            let date = calendar_date(&d.date).ok_or_else(|| {
                SourceError::MalformedResponse(format!("Unparseable forecast date '{}'", d.date))
            })?;
            Ok(ForecastDay {
                date,
                max_temp_c: d.temperature.maximum.value,
                min_temp_c: d.temperature.minimum.value,
                day_precipitation_probability: percent_or_zero(
                    d.day.and_then(|h| h.precipitation_probability),
                ),
                night_precipitation_probability: percent_or_zero(
                    d.night.and_then(|h| h.precipitation_probability),
                ),
            })
        })
        .collect::<Result<Vec<_>, SourceError>>()?;

    if days.len() < horizon.days() {
        return Err(SourceError::MalformedResponse(format!(
            "Expected {} forecast days, got {}",
            horizon.days(),
            days.len()
        )));
    }

    days.sort_by_key(|d| d.date);
    days.truncate(horizon.days());
    Ok(days)
}

/// Combine the current-conditions record with the next hour's precipitation
/// probability (0 when the hourly list is empty).
///
/// The probability is clamped but not rounded; it feeds threshold checks.
fn parse_current_conditions(
    current_body: &[u8],
    hourly_body: &[u8],
) -> Result<CurrentConditions, SourceError> {
    let records: Vec<AwCurrentConditions> = decode(current_body, "current conditions")?;
    let current = records.into_iter().next().ok_or_else(|| {
        SourceError::MalformedResponse("AccuWeather returned no current conditions".to_string())
    })?;

    let hourly: Vec<AwHourlyForecast> = decode(hourly_body, "hourly forecast")?;
    let precipitation_probability =
        clamped_percent(hourly.first().and_then(|h| h.precipitation_probability));

    Ok(CurrentConditions {
        temperature_c: current.temperature.metric.value,
        wind_speed_kmh: current.wind.speed.metric.value,
        precipitation_probability,
        weather_text: current.weather_text,
    })
}

/// AccuWeather only offers fixed-length daily products; 3 days are cut from 5.
fn daily_product(horizon: Horizon) -> &'static str {
    match horizon {
        Horizon::One => "1day",
        Horizon::Three | Horizon::Five => "5day",
    }
}

#[async_trait]
impl LocationResolver for AccuWeatherClient {
    async fn resolve_location(&self, name: &str) -> Result<ResolvedLocation, SourceError> {
        let body = self
            .get_body(
                "/locations/v1/cities/search",
                &[("q", name), ("language", self.language.as_str())],
            )
            .await?;
        parse_location(&body, name)
    }
}

#[async_trait]
impl ForecastSource for AccuWeatherClient {
    async fn fetch_daily_forecast(
        &self,
        identifier: &str,
        horizon: Horizon,
    ) -> Result<Vec<ForecastDay>, SourceError> {
        let path = format!("/forecasts/v1/daily/{}/{}", daily_product(horizon), identifier);
        let body = self
            .get_body(&path, &[("metric", "true"), ("details", "true")])
            .await?;
        parse_daily_forecast(&body, horizon)
    }

    async fn fetch_current_conditions(
        &self,
        identifier: &str,
    ) -> Result<CurrentConditions, SourceError> {
        let current_path = format!("/currentconditions/v1/{}", identifier);
        let hourly_path = format!("/forecasts/v1/hourly/1hour/{}", identifier);

        let (current_body, hourly_body) = futures::future::try_join(
            self.get_body(&current_path, &[("details", "true")]),
            self.get_body(&hourly_path, &[("metric", "true")]),
        )
        .await?;

        parse_current_conditions(&current_body, &hourly_body)
    }
}
