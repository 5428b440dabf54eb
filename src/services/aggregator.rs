//! Route aggregation.
//!
//! Resolves every place on a route, then fetches forecast and current
//! conditions for each distinct location. Both phases run concurrently (one
//! future per place, joined with `join_all`) and are reassembled in input
//! order. A failure for one place never aborts the others: it is downgraded
//! to a `Warning` and the place is left out of the dataset.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{AppError, SourceError};
use crate::models::{Horizon, Place, RouteDataset, RouteStop, Warning};
use crate::services::source::{ForecastSource, LocationResolver, ResolvedLocation};

#[derive(Clone)]
pub struct RouteAggregator {
    resolver: Arc<dyn LocationResolver>,
    source: Arc<dyn ForecastSource>,
    /// Upper bound for each individual external call.
    call_timeout: Duration,
}

/// Trim names, drop blanks and keep only the first occurrence of each name.
fn normalize_names(places: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    places
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .filter(|p| seen.insert(p.to_string()))
        .map(str::to_string)
        .collect()
}

impl RouteAggregator {
    pub fn new(
        resolver: Arc<dyn LocationResolver>,
        source: Arc<dyn ForecastSource>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            source,
            call_timeout,
        }
    }

    /// Build the route dataset for `places`, in their input order.
    ///
    /// Fails only with `AppError::NoValidInput` when no usable name remains
    /// after trimming; every per-place failure is reported as a warning.
    pub async fn aggregate(
        &self,
        places: &[String],
        horizon: Horizon,
    ) -> Result<(RouteDataset, Vec<Warning>), AppError> {
        let names = normalize_names(places);
        if names.is_empty() {
            return Err(AppError::NoValidInput);
        }

        // join_all yields outcomes by input position, whatever the completion order.
        let resolved =
            futures::future::join_all(names.iter().map(|name| self.resolve_place(name))).await;

        // One slot per name; `None` marks a place that resolved to a location
        // already on the route.
        let mut slots: Vec<Option<Result<RouteStop, Warning>>> = Vec::with_capacity(names.len());
        let mut pending = Vec::new();
        let mut seen = HashSet::new();

        for (name, outcome) in names.iter().zip(resolved) {
            match outcome {
                Ok(location) if !seen.insert(location.identifier.clone()) => {
                    tracing::debug!(
                        "'{}' resolves to location {} already on the route, skipping",
                        name,
                        location.identifier
                    );
                    slots.push(None);
                }
                Ok(location) => {
                    pending.push((slots.len(), name, location));
                    slots.push(None);
                }
                Err(warning) => slots.push(Some(Err(warning))),
            }
        }

        let fetches = pending.into_iter().map(|(slot, name, location)| async move {
            (slot, self.fetch_place(name, location, horizon).await)
        });
        for (slot, outcome) in futures::future::join_all(fetches).await {
            slots[slot] = Some(outcome);
        }

        let mut dataset = RouteDataset::new(horizon);
        let mut warnings = Vec::new();

        for outcome in slots.into_iter().flatten() {
            match outcome {
                Ok(stop) => dataset.push(stop),
                Err(warning) => warnings.push(warning),
            }
        }

        if dataset.is_empty() {
            tracing::warn!("No place of {} could be aggregated", names.len());
        }

        tracing::info!(
            "Aggregated route: {} of {} places, {} warnings, horizon {} days",
            dataset.len(),
            names.len(),
            warnings.len(),
            horizon.days()
        );

        Ok((dataset, warnings))
    }

    async fn resolve_place(&self, name: &str) -> Result<ResolvedLocation, Warning> {
        self.bounded(self.resolver.resolve_location(name))
            .await
            .map_err(|e| {
                tracing::warn!("Could not resolve '{}': {}", name, e);
                Warning::PlaceUnresolved(name.to_string())
            })
    }

    /// Fetch the forecast and current conditions of a resolved place. All or
    /// nothing.
    async fn fetch_place(
        &self,
        name: &str,
        location: ResolvedLocation,
        horizon: Horizon,
    ) -> Result<RouteStop, Warning> {
        let (forecast, current) = futures::future::try_join(
            self.bounded(self.source.fetch_daily_forecast(&location.identifier, horizon)),
            self.bounded(self.source.fetch_current_conditions(&location.identifier)),
        )
        .await
        .map_err(|e| {
            tracing::warn!(
                "Weather for '{}' (location {}) unavailable: {}",
                name,
                location.identifier,
                e
            );
            Warning::ForecastUnavailable(name.to_string())
        })?;

        Ok(RouteStop {
            place: Place {
                name: name.to_string(),
                identifier: location.identifier,
                latitude: location.latitude,
                longitude: location.longitude,
            },
            forecast,
            current,
        })
    }

    /// Apply the per-call timeout; an elapsed timeout is a transport failure.
    async fn bounded<T, F>(&self, call: F) -> Result<T, SourceError>
    where
        F: Future<Output = Result<T, SourceError>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Transport(format!(
                "call timed out after {} ms",
                self.call_timeout.as_millis()
            ))),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{CurrentConditions, ForecastDay};
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, NaiveDate};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    /// In-memory stand-in for the weather provider.
    #[derive(Default)]
    pub(crate) struct FakeWeather {
        locations: HashMap<String, Result<ResolvedLocation, SourceError>>,
        broken_forecasts: HashSet<String>,
        broken_current: HashSet<String>,
        delays_ms: HashMap<String, u64>,
        resolve_calls: AtomicUsize,
        forecast_calls: AtomicUsize,
    }

    impl FakeWeather {
        pub(crate) fn with_places(names: &[&str]) -> Self {
            let mut fake = Self::default();
            for (i, name) in names.iter().enumerate() {
                let (lat, lon) = (40.0 + i as f64, 10.0 + i as f64);
                fake = fake.with_place(name, &format!("id-{}", name), lat, lon);
            }
            fake
        }

        pub(crate) fn with_place(
            mut self,
            name: &str,
            identifier: &str,
            lat: f64,
            lon: f64,
        ) -> Self {
            self.locations.insert(
                name.to_string(),
                Ok(ResolvedLocation {
                    identifier: identifier.to_string(),
                    latitude: lat,
                    longitude: lon,
                }),
            );
            self
        }

        pub(crate) fn with_resolve_error(mut self, name: &str, err: SourceError) -> Self {
            self.locations.insert(name.to_string(), Err(err));
            self
        }

        pub(crate) fn with_broken_forecast(mut self, identifier: &str) -> Self {
            self.broken_forecasts.insert(identifier.to_string());
            self
        }

        pub(crate) fn with_broken_current(mut self, identifier: &str) -> Self {
            self.broken_current.insert(identifier.to_string());
            self
        }

        fn with_delay(mut self, name: &str, ms: u64) -> Self {
            self.delays_ms.insert(name.to_string(), ms);
            self
        }

        fn temperature_for(identifier: &str) -> f64 {
            identifier.len() as f64
        }
    }

    #[async_trait]
    impl LocationResolver for FakeWeather {
        async fn resolve_location(&self, name: &str) -> Result<ResolvedLocation, SourceError> {
            self.resolve_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(ms) = self.delays_ms.get(name) {
                tokio::time::sleep(std::time::Duration::from_millis(*ms)).await;
            }
            self.locations
                .get(name)
                .cloned()
                .unwrap_or_else(|| Err(SourceError::NotFound(name.to_string())))
        }
    }

    #[async_trait]
    impl ForecastSource for FakeWeather {
        async fn fetch_daily_forecast(
            &self,
            identifier: &str,
            horizon: Horizon,
        ) -> Result<Vec<ForecastDay>, SourceError> {
            self.forecast_calls.fetch_add(1, Ordering::SeqCst);
            if self.broken_forecasts.contains(identifier) {
                return Err(SourceError::MalformedResponse("missing DailyForecasts".to_string()));
            }
            let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
            let t = Self::temperature_for(identifier);
            Ok((0..horizon.days())
                .map(|i| ForecastDay {
                    date: start + ChronoDuration::days(i as i64),
                    max_temp_c: t + i as f64,
                    min_temp_c: t - 10.0 + i as f64,
                    day_precipitation_probability: (10 * i) as u8,
                    night_precipitation_probability: (10 * i + 5) as u8,
                })
                .collect())
        }

        async fn fetch_current_conditions(
            &self,
            identifier: &str,
        ) -> Result<CurrentConditions, SourceError> {
            if self.broken_current.contains(identifier) {
                return Err(SourceError::Transport("connection reset".to_string()));
            }
            Ok(CurrentConditions {
                temperature_c: Self::temperature_for(identifier),
                wind_speed_kmh: 12.0,
                precipitation_probability: 30.0,
                weather_text: "Partly cloudy".to_string(),
            })
        }
    }

    pub(crate) fn aggregator_for(fake: FakeWeather) -> (RouteAggregator, Arc<FakeWeather>) {
        let fake = Arc::new(fake);
        let aggregator =
            RouteAggregator::new(fake.clone(), fake.clone(), Duration::from_millis(500));
        (aggregator, fake)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn order(dataset: &RouteDataset) -> Vec<String> {
        dataset.places().map(|p| p.name.clone()).collect()
    }

    #[test]
    fn test_normalize_names_trims_and_drops_blanks() {
        let normalized = normalize_names(&names(&["  Moscow ", "", "   ", "Paris"]));
        assert_eq!(normalized, vec!["Moscow", "Paris"]);
    }

    #[test]
    fn test_normalize_names_keeps_first_duplicate() {
        let normalized = normalize_names(&names(&["Paris", "Moscow", " Paris"]));
        assert_eq!(normalized, vec!["Paris", "Moscow"]);
    }

    #[tokio::test]
    async fn test_empty_input_is_no_valid_input() {
        let (aggregator, _) = aggregator_for(FakeWeather::default());
        let result = aggregator.aggregate(&names(&["", "  "]), Horizon::One).await;
        assert!(matches!(assert_err!(result), AppError::NoValidInput));

        let result = aggregator.aggregate(&[], Horizon::One).await;
        assert!(matches!(result, Err(AppError::NoValidInput)));
    }

    #[tokio::test]
    async fn test_order_preserved_when_all_succeed() {
        let input = ["Tver", "Moscow", "Berlin", "Amsterdam", "Paris"];
        let (aggregator, _) = aggregator_for(FakeWeather::with_places(&input));

        let (dataset, warnings) =
            assert_ok!(aggregator.aggregate(&names(&input), Horizon::Three).await);

        assert_eq!(order(&dataset), names(&input));
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn test_order_independent_of_completion_order() {
        let input = ["Slow", "Medium", "Fast"];
        let fake = FakeWeather::with_places(&input)
            .with_delay("Slow", 120)
            .with_delay("Medium", 60);
        let (aggregator, _) = aggregator_for(fake);

        let (dataset, _) = aggregator.aggregate(&names(&input), Horizon::One).await.unwrap();
        assert_eq!(order(&dataset), names(&input));
    }

    #[tokio::test]
    async fn test_partial_resolution_failure() {
        let fake = FakeWeather::with_places(&["A", "C"])
            .with_resolve_error("B", SourceError::NotFound("B".to_string()));
        let (aggregator, _) = aggregator_for(fake);

        let (dataset, warnings) = aggregator
            .aggregate(&names(&["A", "B", "C"]), Horizon::One)
            .await
            .unwrap();

        assert_eq!(order(&dataset), vec!["A", "C"]);
        assert_eq!(warnings, vec![Warning::PlaceUnresolved("B".to_string())]);
    }

    #[tokio::test]
    async fn test_transport_error_on_resolve_is_unresolved() {
        let fake = FakeWeather::with_places(&["A"])
            .with_resolve_error("B", SourceError::Transport("dns failure".to_string()));
        let (aggregator, _) = aggregator_for(fake);

        let (dataset, warnings) = aggregator
            .aggregate(&names(&["A", "B"]), Horizon::One)
            .await
            .unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(warnings, vec![Warning::PlaceUnresolved("B".to_string())]);
    }

    #[tokio::test]
    async fn test_moscow_unknownville_paris_scenario() {
        let (aggregator, _) = aggregator_for(FakeWeather::with_places(&["Moscow", "Paris"]));

        let (dataset, warnings) = aggregator
            .aggregate(&names(&["Moscow", "Unknownville", "Paris"]), Horizon::from_days(3))
            .await
            .unwrap();

        assert_eq!(order(&dataset), vec!["Moscow", "Paris"]);
        assert_eq!(warnings, vec![Warning::PlaceUnresolved("Unknownville".to_string())]);
        for stop in dataset.stops() {
            assert_eq!(stop.forecast.len(), 3);
        }
    }

    #[tokio::test]
    async fn test_forecast_failure_drops_place_entirely() {
        let fake = FakeWeather::with_places(&["A", "B", "C"]).with_broken_forecast("id-B");
        let (aggregator, _) = aggregator_for(fake);

        let (dataset, warnings) = aggregator
            .aggregate(&names(&["A", "B", "C"]), Horizon::Five)
            .await
            .unwrap();

        assert_eq!(order(&dataset), vec!["A", "C"]);
        assert!(dataset.forecast_for("id-B").is_none());
        assert!(dataset.current_for("id-B").is_none());
        assert_eq!(warnings, vec![Warning::ForecastUnavailable("B".to_string())]);
    }

    #[tokio::test]
    async fn test_current_conditions_failure_drops_place_entirely() {
        let fake = FakeWeather::with_places(&["A", "B"]).with_broken_current("id-A");
        let (aggregator, _) = aggregator_for(fake);

        let (dataset, warnings) = aggregator
            .aggregate(&names(&["A", "B"]), Horizon::One)
            .await
            .unwrap();

        assert_eq!(order(&dataset), vec!["B"]);
        assert!(dataset.forecast_for("id-A").is_none());
        assert_eq!(warnings, vec![Warning::ForecastUnavailable("A".to_string())]);
    }

    #[tokio::test]
    async fn test_slow_place_times_out_without_blocking_siblings() {
        let fake = FakeWeather::with_places(&["A", "Stuck", "C"]).with_delay("Stuck", 2_000);
        let (aggregator, _) = aggregator_for(fake);

        let (dataset, warnings) = aggregator
            .aggregate(&names(&["A", "Stuck", "C"]), Horizon::One)
            .await
            .unwrap();

        assert_eq!(order(&dataset), vec!["A", "C"]);
        assert_eq!(warnings, vec![Warning::PlaceUnresolved("Stuck".to_string())]);
    }

    #[tokio::test]
    async fn test_warnings_follow_input_order() {
        let fake = FakeWeather::with_places(&["A", "C"]).with_broken_forecast("id-C");
        let (aggregator, _) = aggregator_for(fake);

        let (_, warnings) = aggregator
            .aggregate(&names(&["Z", "A", "C", "Y"]), Horizon::One)
            .await
            .unwrap();

        assert_eq!(
            warnings,
            vec![
                Warning::PlaceUnresolved("Z".to_string()),
                Warning::ForecastUnavailable("C".to_string()),
                Warning::PlaceUnresolved("Y".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_retries_after_failure() {
        let fake = FakeWeather::with_places(&["A"]).with_broken_forecast("id-A");
        let (aggregator, fake) = aggregator_for(fake);

        let _ = aggregator.aggregate(&names(&["A", "B"]), Horizon::One).await.unwrap();

        assert_eq!(fake.resolve_calls.load(Ordering::SeqCst), 2);
        assert_eq!(fake.forecast_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_duplicate_names_processed_once() {
        let (aggregator, fake) = aggregator_for(FakeWeather::with_places(&["Paris", "Moscow"]));

        let (dataset, warnings) = aggregator
            .aggregate(&names(&["Paris", "Moscow", "Paris "]), Horizon::One)
            .await
            .unwrap();

        assert_eq!(order(&dataset), vec!["Paris", "Moscow"]);
        assert!(warnings.is_empty());
        assert_eq!(fake.resolve_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_names_resolving_to_same_location_kept_once() {
        let fake = FakeWeather::default()
            .with_place("Moscow", "294021", 55.75, 37.62)
            .with_place("Москва", "294021", 55.75, 37.62)
            .with_place("Paris", "623", 48.86, 2.34);
        let (aggregator, fake) = aggregator_for(fake);

        let (dataset, warnings) = aggregator
            .aggregate(&names(&["Moscow", "Paris", "Москва"]), Horizon::One)
            .await
            .unwrap();

        assert_eq!(order(&dataset), vec!["Moscow", "Paris"]);
        assert!(warnings.is_empty());
        assert_eq!(fake.resolve_calls.load(Ordering::SeqCst), 3);
        // The repeated location is dropped before any forecast is fetched
        assert_eq!(fake.forecast_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_aggregate_is_idempotent() {
        let input = names(&["Moscow", "Nowhere", "Paris", "Berlin"]);
        let fake = FakeWeather::with_places(&["Moscow", "Paris", "Berlin"]);
        let (aggregator, _) = aggregator_for(fake);

        let (first, first_warnings) = aggregator.aggregate(&input, Horizon::Five).await.unwrap();
        let (second, second_warnings) = aggregator.aggregate(&input, Horizon::Five).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first_warnings, second_warnings);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_place_keeps_trimmed_user_name_and_coordinates() {
        let fake = FakeWeather::default().with_place("Moscow", "294021", 55.75, 37.62);
        let (aggregator, _) = aggregator_for(fake);

        let (dataset, _) = aggregator
            .aggregate(&names(&["  Moscow  "]), Horizon::One)
            .await
            .unwrap();

        let place = dataset.places().next().unwrap();
        assert_eq!(place.name, "Moscow");
        assert_eq!(place.identifier, "294021");
        assert_eq!(place.latitude, 55.75);
        assert_eq!(place.longitude, 37.62);
    }
}
