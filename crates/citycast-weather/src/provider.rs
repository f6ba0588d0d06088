//! OpenWeatherMap 2.5 client.
//!
//! Two calls: current weather by city name and the 3-hourly forecast by
//! coordinates. Both map the provider payload into crate types.

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::types::{
    Condition, Coordinates, HourlyForecast, HourlyPoint, Measurements, Units, WeatherError,
    WeatherSnapshot,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Anything that can answer the two weather queries.
///
/// Futures are `'static` so the query cache can run them on spawned tasks.
pub trait WeatherSource: Send + Sync + 'static {
    fn current_weather(
        &self,
        city: &str,
        units: Units,
    ) -> BoxFuture<'static, Result<WeatherSnapshot, WeatherError>>;

    fn forecast(
        &self,
        coordinates: Coordinates,
        units: Units,
    ) -> BoxFuture<'static, Result<HourlyForecast, WeatherError>>;
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherProvider {
    pub fn new(api_key: Option<String>) -> Result<Self, WeatherError> {
        Self::with_options(
            DEFAULT_BASE_URL,
            api_key,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_options(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn params(&self, units: Units, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        params.push(("units", units.as_query().to_string()));
        if let Some(key) = &self.api_key {
            params.push(("appid", key.clone()));
        }
        params
    }
}

impl WeatherSource for WeatherProvider {
    fn current_weather(
        &self,
        city: &str,
        units: Units,
    ) -> BoxFuture<'static, Result<WeatherSnapshot, WeatherError>> {
        let client = Arc::clone(&self.client);
        let url = self.endpoint("weather");
        let params = self.params(units, vec![("q", city.to_string())]);
        let city = city.to_string();

        async move {
            tracing::debug!(city = %city, "Fetching current weather");
            let payload: OwmCurrent = get_json(&client, &url, &params).await?;
            payload.into_snapshot()
        }
        .boxed()
    }

    fn forecast(
        &self,
        coordinates: Coordinates,
        units: Units,
    ) -> BoxFuture<'static, Result<HourlyForecast, WeatherError>> {
        let client = Arc::clone(&self.client);
        let url = self.endpoint("forecast");
        let params = self.params(
            units,
            vec![
                ("lat", coordinates.lat.to_string()),
                ("lon", coordinates.lon.to_string()),
            ],
        );

        async move {
            tracing::debug!(lat = coordinates.lat, lon = coordinates.lon, "Fetching forecast");
            let payload: OwmForecast = get_json(&client, &url, &params).await?;
            payload.into_forecast()
        }
        .boxed()
    }
}

async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    params: &[(&'static str, String)],
) -> Result<T, WeatherError> {
    let response = client.get(url).query(params).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = provider_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
        tracing::debug!("Provider returned status {}: {}", status, message);
        return Err(WeatherError::Status {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))
}

/// Extract `message` from an OpenWeatherMap error body
fn provider_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct OwmErrorBody {
        message: Option<String>,
    }

    serde_json::from_str::<OwmErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
}

fn timestamp(dt: i64) -> Result<DateTime<Utc>, WeatherError> {
    DateTime::from_timestamp(dt, 0)
        .ok_or_else(|| WeatherError::Parse(format!("timestamp out of range: {}", dt)))
}

// --- OpenWeatherMap JSON response types ---

#[derive(Debug, Deserialize)]
struct OwmCurrent {
    name: String,
    dt: i64,
    coord: OwmCoord,
    #[serde(default)]
    weather: Vec<OwmWeather>,
    main: OwmMain,
    wind: OwmWind,
    #[serde(default)]
    sys: Option<OwmSys>,
}

#[derive(Debug, Deserialize)]
struct OwmCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    id: i32,
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmForecast {
    list: Vec<OwmForecastItem>,
    city: OwmCity,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    dt: i64,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmWeather>,
    wind: OwmWind,
}

#[derive(Debug, Deserialize)]
struct OwmCity {
    name: String,
    country: Option<String>,
}

impl From<OwmMain> for Measurements {
    fn from(m: OwmMain) -> Self {
        Self {
            temperature: m.temp,
            feels_like: m.feels_like,
            temp_min: m.temp_min,
            temp_max: m.temp_max,
            humidity: m.humidity,
            pressure: m.pressure,
        }
    }
}

fn first_condition(weather: Vec<OwmWeather>) -> Option<Condition> {
    weather.into_iter().next().map(|w| Condition {
        code: w.id,
        main: w.main,
        description: w.description,
        icon: w.icon,
    })
}

impl OwmCurrent {
    fn into_snapshot(self) -> Result<WeatherSnapshot, WeatherError> {
        Ok(WeatherSnapshot {
            observed_at: timestamp(self.dt)?,
            city: self.name,
            country: self.sys.and_then(|s| s.country).filter(|c| !c.is_empty()),
            coordinates: Coordinates {
                lat: self.coord.lat,
                lon: self.coord.lon,
            },
            measurements: self.main.into(),
            wind_speed: self.wind.speed,
            condition: first_condition(self.weather),
        })
    }
}

impl OwmForecast {
    fn into_forecast(self) -> Result<HourlyForecast, WeatherError> {
        let points = self
            .list
            .into_iter()
            .map(|item| {
                Ok(HourlyPoint {
                    time: timestamp(item.dt)?,
                    measurements: item.main.into(),
                    wind_speed: item.wind.speed,
                    condition: first_condition(item.weather),
                })
            })
            .collect::<Result<Vec<_>, WeatherError>>()?;

        Ok(HourlyForecast {
            city: self.city.name,
            country: self.city.country.filter(|c| !c.is_empty()),
            points,
        })
    }
}
