//! Integration tests for WeatherProvider and WeatherClient using wiremock.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use citycast_weather::{
    DayWindow, Units, WeatherClient, WeatherError, WeatherProvider, WeatherSource,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn current_body(city: &str) -> serde_json::Value {
    serde_json::json!({
        "id": 703448,
        "name": city,
        "dt": 1_792_000_000,
        "coord": { "lat": 50.45, "lon": 30.52 },
        "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" }],
        "main": {
            "temp": 7.6, "feels_like": 5.2, "temp_min": 6.1, "temp_max": 8.9,
            "humidity": 87, "pressure": 1009
        },
        "wind": { "speed": 5.7 },
        "sys": { "country": "UA" }
    })
}

fn forecast_item(dt: i64, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "dt": dt,
        "main": {
            "temp": temp, "feels_like": temp - 1.0, "temp_min": temp, "temp_max": temp,
            "humidity": 80, "pressure": 1010
        },
        "weather": [{ "id": 804, "main": "Clouds", "description": "overcast clouds", "icon": "04d" }],
        "wind": { "speed": 3.2 }
    })
}

fn test_window() -> DayWindow {
    let start = Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();
    DayWindow {
        start,
        end: start + chrono::Duration::hours(24),
    }
}

fn provider(server: &MockServer) -> WeatherProvider {
    WeatherProvider::with_options(
        &server.uri(),
        Some("test-key".to_string()),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_current_weather_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Kyiv"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Kyiv")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let snapshot = provider(&mock_server)
        .current_weather("Kyiv", Units::Metric)
        .await
        .unwrap();

    assert_eq!(snapshot.city, "Kyiv");
    assert_eq!(snapshot.country.as_deref(), Some("UA"));
    assert_eq!(snapshot.measurements.temperature, 7.6);
    assert_eq!(snapshot.measurements.pressure, 1009);
    assert_eq!(snapshot.wind_speed, 5.7);
    assert_eq!(
        snapshot.condition.map(|c| c.description).as_deref(),
        Some("light rain")
    );
}

#[tokio::test]
async fn test_current_weather_city_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server)
        .current_weather("Atlantis", Units::Metric)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("city not found"), "{}", err);
}

#[tokio::test]
async fn test_current_weather_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server)
        .current_weather("Kyiv", Units::Metric)
        .await
        .unwrap_err();

    assert!(
        matches!(err, WeatherError::Status { status: 502, .. }),
        "unexpected error: {:?}",
        err
    );
}

#[tokio::test]
async fn test_current_weather_malformed_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Kyiv"
        })))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server)
        .current_weather("Kyiv", Units::Metric)
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::Parse(_)), "unexpected error: {:?}", err);
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_body("Kyiv"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let provider = WeatherProvider::with_options(
        &mock_server.uri(),
        Some("test-key".to_string()),
        Duration::from_millis(100),
    )
    .unwrap();
    let client = WeatherClient::new(Arc::new(provider), Units::Metric);

    let state = client.current_weather("Kyiv").settled().await;

    assert!(state.is_error());
    assert_eq!(state.error, Some(WeatherError::Timeout));
}

#[tokio::test]
async fn test_concurrent_queries_issue_one_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Kyiv"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_body("Kyiv"))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = WeatherClient::new(Arc::new(provider(&mock_server)), Units::Metric);

    let first = client.current_weather("Kyiv");
    let second = client.current_weather("Kyiv");
    let (a, b) = tokio::join!(first.settled(), second.settled());

    let a = a.data.unwrap();
    let b = b.data.unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.city, "Kyiv");
}

#[tokio::test]
async fn test_hourly_forecast_two_step_fetch() {
    let mock_server = MockServer::start().await;
    let start = test_window().start.timestamp();

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Kyiv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Kyiv")))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("lat", "50.45"))
        .and(query_param("lon", "30.52"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cod": "200",
            "list": [
                forecast_item(start, 4.0),
                forecast_item(start + 9 * 3600, 8.0),
                forecast_item(start + 23 * 3600, 5.0),
                forecast_item(start + 25 * 3600, 3.0),
            ],
            "city": { "id": 703448, "name": "Kyiv", "country": "UA" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = WeatherClient::new(Arc::new(provider(&mock_server)), Units::Metric)
        .with_day_window(test_window);

    let state = client.hourly_forecast("Kyiv").settled().await;
    let forecast = state.data.unwrap();
    assert_eq!(forecast.city, "Kyiv");
    assert_eq!(forecast.points.len(), 3);
    assert_eq!(forecast.points[1].measurements.temperature, 8.0);

    // The coordinates lookup populated the current-weather cache too
    assert!(client.current_weather("Kyiv").state().is_success());
}

#[tokio::test]
async fn test_hourly_forecast_skips_second_step_on_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = WeatherClient::new(Arc::new(provider(&mock_server)), Units::Metric);
    let state = client.hourly_forecast("Atlantis").settled().await;

    assert!(state.is_error());
    assert!(state.error.unwrap().is_not_found());
}
