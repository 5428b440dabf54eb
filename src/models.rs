//! Request-scoped domain types shared by the aggregator, the classifier and
//! the visualization builder.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

/// A geocoded location derived from a user-entered name.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Place {
    /// Name as entered by the user (trimmed)
    pub name: String,
    /// Opaque location key of the upstream weather provider
    pub identifier: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

/// One day of a daily forecast.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ForecastDay {
    /// Calendar date (time of day discarded)
    pub date: NaiveDate,
    /// Maximum temperature in Celsius
    pub max_temp_c: f64,
    /// Minimum temperature in Celsius
    pub min_temp_c: f64,
    /// Daytime precipitation probability in percent (0–100)
    pub day_precipitation_probability: u8,
    /// Night-time precipitation probability in percent (0–100)
    pub night_precipitation_probability: u8,
}

/// Current weather at a place, the classifier's input.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CurrentConditions {
    /// Air temperature in Celsius
    pub temperature_c: f64,
    /// Wind speed in km/h
    pub wind_speed_kmh: f64,
    /// Precipitation probability of the next hour in percent (0–100, not rounded)
    pub precipitation_probability: f64,
    /// Short description from the provider (e.g. "Light snow")
    pub weather_text: String,
}

/// Number of forecast days requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u32")]
pub enum Horizon {
    One,
    Three,
    Five,
}

impl Horizon {
    /// Map a requested day count to a horizon. Anything other than 1, 3 or 5
    /// falls back to a single day.
    pub fn from_days(days: u32) -> Self {
        match days {
            3 => Horizon::Three,
            5 => Horizon::Five,
            1 => Horizon::One,
            other => {
                tracing::debug!("Unsupported horizon {} days, using 1", other);
                Horizon::One
            }
        }
    }

    pub fn days(self) -> usize {
        match self {
            Horizon::One => 1,
            Horizon::Three => 3,
            Horizon::Five => 5,
        }
    }
}

impl From<Horizon> for u32 {
    fn from(h: Horizon) -> Self {
        h.days() as u32
    }
}

/// A place on the route together with everything fetched for it.
///
/// A stop only exists when both the forecast and the current conditions
/// were fetched successfully.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStop {
    pub place: Place,
    pub forecast: Vec<ForecastDay>,
    pub current: CurrentConditions,
}

/// The aggregated route: stops in the order the user entered them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDataset {
    horizon: Horizon,
    stops: Vec<RouteStop>,
}

impl RouteDataset {
    pub fn new(horizon: Horizon) -> Self {
        Self {
            horizon,
            stops: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, stop: RouteStop) {
        self.stops.push(stop);
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    pub fn stops(&self) -> &[RouteStop] {
        &self.stops
    }

    /// Places in route order.
    pub fn places(&self) -> impl Iterator<Item = &Place> {
        self.stops.iter().map(|s| &s.place)
    }

    #[allow(dead_code)] // Handlers iterate stops in order; lookups serve tests
    pub fn forecast_for(&self, identifier: &str) -> Option<&[ForecastDay]> {
        self.stops
            .iter()
            .find(|s| s.place.identifier == identifier)
            .map(|s| s.forecast.as_slice())
    }

    #[allow(dead_code)] // Handlers iterate stops in order; lookups serve tests
    pub fn current_for(&self, identifier: &str) -> Option<&CurrentConditions> {
        self.stops
            .iter()
            .find(|s| s.place.identifier == identifier)
            .map(|s| &s.current)
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// A non-fatal per-place failure recorded next to a partial result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    PlaceUnresolved(String),
    ForecastUnavailable(String),
}

impl Warning {
    pub fn kind(&self) -> &'static str {
        match self {
            Warning::PlaceUnresolved(_) => "place_unresolved",
            Warning::ForecastUnavailable(_) => "forecast_unavailable",
        }
    }

    pub fn place(&self) -> &str {
        match self {
            Warning::PlaceUnresolved(name) | Warning::ForecastUnavailable(name) => name,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::PlaceUnresolved(name) => write!(f, "Could not find location '{}'", name),
            Warning::ForecastUnavailable(name) => {
                write!(f, "Weather data for '{}' is unavailable", name)
            }
        }
    }
}
