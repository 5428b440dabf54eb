//! Chart and map views of an aggregated route.
//!
//! Both views are derived from the same `RouteDataset` and keep its place
//! order. The map polyline in particular is the travel route itself, so
//! nothing here ever re-sorts places.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::helpers::date_label;
use crate::models::{ForecastDay, RouteDataset};

/// Map centre used when the route is empty (Moscow).
pub const FALLBACK_CENTER: Coordinate = Coordinate {
    latitude: 55.7558,
    longitude: 37.6173,
};

/// Hover text for a place without forecast days.
pub const NO_DATA_MARKER: &str = "no data";

/// Forecast value plotted in the time-series chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    #[default]
    MaxTemp,
    MinTemp,
    DayPrecip,
    NightPrecip,
}

impl Metric {
    fn value_of(self, day: &ForecastDay) -> f64 {
        match self {
            Metric::MaxTemp => day.max_temp_c,
            Metric::MinTemp => day.min_temp_c,
            Metric::DayPrecip => f64::from(day.day_precipitation_probability),
            Metric::NightPrecip => f64::from(day.night_precipitation_probability),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::MaxTemp => "maxTemp",
            Metric::MinTemp => "minTemp",
            Metric::DayPrecip => "dayPrecip",
            Metric::NightPrecip => "nightPrecip",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maxTemp" => Ok(Metric::MaxTemp),
            "minTemp" => Ok(Metric::MinTemp),
            "dayPrecip" => Ok(Metric::DayPrecip),
            "nightPrecip" => Ok(Metric::NightPrecip),
            other => Err(format!(
                "Unknown metric '{}', expected one of maxTemp, minTemp, dayPrecip, nightPrecip",
                other
            )),
        }
    }
}

/// A single chart point.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SeriesPoint {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    pub value: f64,
}

/// The time series of one place.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PlaceSeries {
    pub place: String,
    pub points: Vec<SeriesPoint>,
}

/// Per-place series in route order, addressable by place name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SeriesSet {
    series: Vec<PlaceSeries>,
}

impl SeriesSet {
    #[allow(dead_code)] // Handlers serialize the whole set; lookups serve tests
    pub fn get(&self, place: &str) -> Option<&[SeriesPoint]> {
        self.series
            .iter()
            .find(|s| s.place == place)
            .map(|s| s.points.as_slice())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Ordered map geometry of a route.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RouteGeometry {
    /// Polyline vertices in route order
    pub coordinates: Vec<Coordinate>,
    /// One hover text per vertex, same order
    pub hover_texts: Vec<String>,
    /// Initial map view centre
    pub center: Coordinate,
}

/// Build one series per place for `metric`, one point per forecast day.
pub fn build_series(dataset: &RouteDataset, metric: Metric) -> SeriesSet {
    let series = dataset
        .stops()
        .iter()
        .map(|stop| PlaceSeries {
            place: stop.place.name.clone(),
            points: stop
                .forecast
                .iter()
                .map(|day| SeriesPoint {
                    date: date_label(day.date),
                    value: metric.value_of(day),
                })
                .collect(),
        })
        .collect();

    SeriesSet { series }
}

fn hover_text(name: &str, forecast: &[ForecastDay]) -> String {
    match forecast.first() {
        Some(day) => format!(
            "{}: max {:.1}°C, min {:.1}°C, day precip {}%, night precip {}%",
            name,
            day.max_temp_c,
            day.min_temp_c,
            day.day_precipitation_probability,
            day.night_precipitation_probability
        ),
        None => format!("{}: {}", name, NO_DATA_MARKER),
    }
}

/// Build the route polyline, its hover texts and the initial map centre.
pub fn build_route_geometry(dataset: &RouteDataset) -> RouteGeometry {
    let coordinates: Vec<Coordinate> = dataset
        .places()
        .map(|p| Coordinate {
            latitude: p.latitude,
            longitude: p.longitude,
        })
        .collect();

    let hover_texts = dataset
        .stops()
        .iter()
        .map(|stop| hover_text(&stop.place.name, &stop.forecast))
        .collect();

    let center = coordinates.first().copied().unwrap_or(FALLBACK_CENTER);

    RouteGeometry {
        coordinates,
        hover_texts,
        center,
    }
}
