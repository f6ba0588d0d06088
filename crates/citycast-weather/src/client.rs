//! Per-city weather queries on top of [`QueryCache`].

use futures::future::FutureExt;
use std::sync::Arc;

use crate::cache::{Endpoint, Fetcher, QueryCache, QueryHandle, QueryKey};
use crate::forecast::DayWindow;
use crate::provider::WeatherSource;
use crate::types::{HourlyForecast, Units, WeatherSnapshot};

type DayWindowFn = Arc<dyn Fn() -> DayWindow + Send + Sync>;

/// Entry point for the two weather queries.
///
/// Cheap to clone; clones share caches.
#[derive(Clone)]
pub struct WeatherClient {
    source: Arc<dyn WeatherSource>,
    units: Units,
    current: QueryCache<WeatherSnapshot>,
    hourly: QueryCache<HourlyForecast>,
    day_window: DayWindowFn,
}

impl WeatherClient {
    pub fn new(source: Arc<dyn WeatherSource>, units: Units) -> Self {
        Self {
            source,
            units,
            current: QueryCache::new(),
            hourly: QueryCache::new(),
            day_window: Arc::new(DayWindow::today),
        }
    }

    /// Override how "today" is determined for forecast filtering
    pub fn with_day_window(mut self, day_window: impl Fn() -> DayWindow + Send + Sync + 'static) -> Self {
        self.day_window = Arc::new(day_window);
        self
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn key(&self, endpoint: Endpoint, city: &str) -> QueryKey {
        QueryKey::new(endpoint, city, self.units)
    }

    /// Current weather for `city`. An empty name is skipped and stays idle.
    pub fn current_weather(&self, city: &str) -> QueryHandle<WeatherSnapshot> {
        if city.is_empty() {
            return self.current.skipped();
        }
        self.current
            .query(self.key(Endpoint::CurrentWeather, city), self.current_fetcher(city))
    }

    /// Today's forecast for `city`.
    ///
    /// Resolves the city's coordinates through the current-weather cache
    /// first; a failure there fails the forecast without a second call.
    pub fn hourly_forecast(&self, city: &str) -> QueryHandle<HourlyForecast> {
        if city.is_empty() {
            return self.hourly.skipped();
        }
        self.hourly
            .query(self.key(Endpoint::HourlyForecast, city), self.hourly_fetcher(city))
    }

    pub fn current_cache(&self) -> &QueryCache<WeatherSnapshot> {
        &self.current
    }

    pub fn hourly_cache(&self) -> &QueryCache<HourlyForecast> {
        &self.hourly
    }

    fn current_fetcher(&self, city: &str) -> Fetcher<WeatherSnapshot> {
        let source = Arc::clone(&self.source);
        let units = self.units;
        let city = city.to_string();
        Arc::new(move || source.current_weather(&city, units))
    }

    fn hourly_fetcher(&self, city: &str) -> Fetcher<HourlyForecast> {
        let source = Arc::clone(&self.source);
        let units = self.units;
        let current = self.current.clone();
        let current_key = self.key(Endpoint::CurrentWeather, city);
        let current_fetcher = self.current_fetcher(city);
        let day_window = Arc::clone(&self.day_window);

        Arc::new(move || {
            let source = Arc::clone(&source);
            let current = current.clone();
            let current_key = current_key.clone();
            let current_fetcher = Arc::clone(&current_fetcher);
            let day_window = Arc::clone(&day_window);

            async move {
                let snapshot = current.fetch(&current_key, &current_fetcher).await?;
                let forecast = source.forecast(snapshot.coordinates, units).await?;
                let window = day_window();
                let today = forecast.restricted_to(&window);
                tracing::debug!(
                    city = %current_key.city,
                    points = today.points.len(),
                    "Forecast restricted to today"
                );
                Ok(today)
            }
            .boxed()
        })
    }
}
