//! Single-place weather check.
//!
//! - GET /api/v1/weather/:city

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::{AppError, ErrorResponse};
use crate::models::{CurrentConditions, Horizon, Place, Warning};
use crate::routes::AppState;
use crate::services::classifier::classify_conditions;

/// Current weather and its severity label for one place.
#[derive(Debug, Serialize, ToSchema)]
pub struct CityWeatherResponse {
    /// The resolved place
    pub place: Place,
    /// Current conditions used for the label
    pub current: CurrentConditions,
    /// Severity label (e.g. "cold and dry")
    pub severity: String,
}

/// Get the current weather and severity label for a single place.
///
/// Runs the same pipeline as a one-place route, so the place name is trimmed
/// and the precipitation probability comes from the next-hour forecast.
#[utoipa::path(
    get,
    path = "/api/v1/weather/{city}",
    tag = "Weather",
    params(
        ("city" = String, Path, description = "Place name, e.g. \"Moscow\""),
    ),
    responses(
        (status = 200, description = "Current weather for the place", body = CityWeatherResponse),
        (status = 400, description = "Blank place name", body = ErrorResponse),
        (status = 404, description = "Place could not be resolved", body = ErrorResponse),
        (status = 502, description = "Weather data unavailable upstream", body = ErrorResponse),
    )
)]
pub async fn get_city_weather(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<CityWeatherResponse>, AppError> {
    let (dataset, warnings) = state.aggregator.aggregate(&[city], Horizon::One).await?;

    let Some(stop) = dataset.stops().first() else {
        return Err(match warnings.first() {
            Some(Warning::PlaceUnresolved(name)) => {
                AppError::NotFound(format!("Location '{}' not found", name))
            }
            Some(w @ Warning::ForecastUnavailable(_)) => {
                AppError::ExternalServiceError(w.to_string())
            }
            None => AppError::InternalError("Single-place route produced no result".to_string()),
        });
    };

    Ok(Json(CityWeatherResponse {
        place: stop.place.clone(),
        current: stop.current.clone(),
        severity: classify_conditions(&stop.current).to_string(),
    }))
}
