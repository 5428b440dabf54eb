// Route Weather API v0.1
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod helpers;
mod models;
mod routes;
mod services;

use config::AppConfig;
use routes::AppState;
use services::accuweather::AccuWeatherClient;
use services::aggregator::RouteAggregator;

/// Route Weather API OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Route Weather API",
        version = "0.1.0",
        description = "Weather along a travel route. Resolves an ordered list of place \
            names through AccuWeather, labels the current conditions of each place \
            by severity and returns route-ordered forecast series and map geometry \
            for charting.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Weather", description = "Single-place weather check"),
        (name = "Route", description = "Weather aggregated along a route"),
    ),
    paths(
        routes::health::health_check,
        routes::weather::get_city_weather,
        routes::route::build_route,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::weather::CityWeatherResponse,
            routes::route::RouteRequest,
            routes::route::RouteResponse,
            routes::route::WarningItem,
            routes::route::PlaceSeverity,
            models::Place,
            models::ForecastDay,
            models::CurrentConditions,
            services::visualization::Metric,
            services::visualization::PlaceSeries,
            services::visualization::SeriesPoint,
            services::visualization::RouteGeometry,
            services::visualization::Coordinate,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "route_weather_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let client = match AccuWeatherClient::new(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!("Failed to create AccuWeather client: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Using AccuWeather at {} (language {}, timeout {:?})",
        config.base_url,
        config.language,
        config.request_timeout
    );

    // The client backs both the resolver and the forecast source
    let app_state = AppState {
        aggregator: RouteAggregator::new(client.clone(), client, config.request_timeout),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any);

    let health_routes = Router::new().route("/api/v1/health", get(routes::health::health_check));

    let app = Router::new()
        .merge(health_routes)
        .merge(routes::weather_router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
