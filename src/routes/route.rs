//! Route weather endpoint.
//!
//! - POST /api/v1/route

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{AppError, ErrorResponse};
use crate::models::{Horizon, Place, Warning};
use crate::routes::AppState;
use crate::services::classifier::classify_conditions;
use crate::services::visualization::{
    build_route_geometry, build_series, Metric, PlaceSeries, RouteGeometry, SeriesSet,
};

fn default_horizon_days() -> u32 {
    1
}

/// Request body for POST /api/v1/route.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RouteRequest {
    /// Place names in travel order
    pub places: Vec<String>,
    /// Forecast horizon in days: 1, 3 or 5 (anything else is treated as 1)
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    /// Metric for the chart series (defaults to maxTemp)
    #[serde(default)]
    pub metric: Metric,
}

/// A place that could not be included in the route.
#[derive(Debug, Serialize, ToSchema)]
pub struct WarningItem {
    /// "place_unresolved" or "forecast_unavailable"
    pub kind: String,
    /// Place name as entered
    pub place: String,
    /// Human-readable message
    pub message: String,
}

impl From<&Warning> for WarningItem {
    fn from(w: &Warning) -> Self {
        Self {
            kind: w.kind().to_string(),
            place: w.place().to_string(),
            message: w.to_string(),
        }
    }
}

/// Severity label of one place on the route.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceSeverity {
    pub place: String,
    /// Severity label (e.g. "warm and fair")
    pub severity: String,
}

/// Response type for POST /api/v1/route.
#[derive(Debug, Serialize, ToSchema)]
pub struct RouteResponse {
    /// Horizon actually used, in days
    pub horizon_days: u32,
    /// Metric of `series`
    pub metric: Metric,
    /// Places that made it onto the route, in travel order
    pub places: Vec<Place>,
    /// Places that were dropped, in input order
    pub warnings: Vec<WarningItem>,
    /// Severity label per place, in travel order
    pub severities: Vec<PlaceSeverity>,
    /// Chart series, one per place, in travel order
    #[schema(value_type = Vec<PlaceSeries>)]
    pub series: SeriesSet,
    /// Map polyline, hover texts and centre
    pub geometry: RouteGeometry,
}

/// Aggregate weather along a route.
///
/// Resolves every place concurrently, drops the ones that fail (reporting
/// them as warnings) and returns chart series, map geometry and a severity
/// label per remaining place. Fails only when no usable place name is given.
#[utoipa::path(
    post,
    path = "/api/v1/route",
    tag = "Route",
    request_body = RouteRequest,
    responses(
        (status = 200, description = "Route weather, possibly partial", body = RouteResponse),
        (status = 400, description = "No usable place names", body = ErrorResponse),
    )
)]
pub async fn build_route(
    State(state): State<AppState>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<RouteResponse>, AppError> {
    let horizon = Horizon::from_days(request.horizon_days);
    let (dataset, warnings) = state.aggregator.aggregate(&request.places, horizon).await?;

    let severities = dataset
        .stops()
        .iter()
        .map(|stop| PlaceSeverity {
            place: stop.place.name.clone(),
            severity: classify_conditions(&stop.current).to_string(),
        })
        .collect();

    Ok(Json(RouteResponse {
        horizon_days: dataset.horizon().into(),
        metric: request.metric,
        places: dataset.places().cloned().collect(),
        warnings: warnings.iter().map(WarningItem::from).collect(),
        severities,
        series: build_series(&dataset, request.metric),
        geometry: build_route_geometry(&dataset),
    }))
}
