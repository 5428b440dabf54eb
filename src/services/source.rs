//! Narrow interfaces to the external weather collaborators.
//!
//! The aggregator only talks to these traits; `AccuWeatherClient` is the
//! production implementation, tests use in-memory fakes.

use async_trait::async_trait;

use crate::errors::SourceError;
use crate::models::{CurrentConditions, ForecastDay, Horizon};

/// Result of geocoding a place name.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub identifier: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[async_trait]
pub trait LocationResolver: Send + Sync {
    async fn resolve_location(&self, name: &str) -> Result<ResolvedLocation, SourceError>;
}

#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Daily forecast records ordered by date, `horizon.days()` long.
    async fn fetch_daily_forecast(
        &self,
        identifier: &str,
        horizon: Horizon,
    ) -> Result<Vec<ForecastDay>, SourceError>;

    async fn fetch_current_conditions(
        &self,
        identifier: &str,
    ) -> Result<CurrentConditions, SourceError>;
}
