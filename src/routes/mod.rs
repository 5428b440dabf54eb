pub mod health;
pub mod route;
pub mod weather;

use axum::routing::{get, post};
use axum::Router;

use crate::services::aggregator::RouteAggregator;

/// Shared application state for the weather endpoints.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) aggregator: RouteAggregator,
}

/// Weather and route endpoints, with state applied.
pub(crate) fn weather_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/weather/:city", get(weather::get_city_weather))
        .route("/api/v1/route", post(route::build_route))
        .with_state(state)
}
