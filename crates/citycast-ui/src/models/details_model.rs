//! Detail view for the selected city: full reading plus today's chart.

use chrono::TimeZone;
use citycast_weather::{HourlyForecast, QueryState, QueryStatus, WeatherSnapshot};

use super::{condition_text, error_hint, round_display, ChartModel};

pub const LOADING_TEXT: &str = "Loading...";
pub const FORECAST_LOADING_TEXT: &str = "Loading forecast...";
pub const FORECAST_ERROR_TEXT: &str = "Failed to load hourly forecast";

#[derive(Debug, Clone, PartialEq)]
pub struct DetailReading {
    pub name: String,
    pub country: Option<String>,
    pub temperature: i64,
    pub temp_min: i64,
    pub temp_max: i64,
    pub description: Option<String>,
    pub humidity: u8,
    pub pressure: u32,
    pub wind_speed: f64,
}

impl From<&WeatherSnapshot> for DetailReading {
    fn from(snapshot: &WeatherSnapshot) -> Self {
        let m = &snapshot.measurements;
        Self {
            name: snapshot.city.clone(),
            country: snapshot.country.clone(),
            temperature: round_display(m.temperature),
            temp_min: round_display(m.temp_min),
            temp_max: round_display(m.temp_max),
            description: snapshot.condition.as_ref().map(condition_text),
            humidity: m.humidity,
            pressure: m.pressure,
            wind_speed: snapshot.wind_speed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForecastSection {
    /// No forecast request made
    Hidden,
    Loading,
    Error,
    Chart(ChartModel),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailsBody {
    Loading,
    Error { hint: &'static str },
    NoData,
    Ready {
        reading: DetailReading,
        forecast: ForecastSection,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailsModel {
    pub city: String,
    pub body: DetailsBody,
    pub is_fetching: bool,
}

impl DetailsModel {
    /// Combine both query states; chart labels use the `tz` wall clock
    pub fn from_states<Tz: TimeZone>(
        city: &str,
        current: &QueryState<WeatherSnapshot>,
        hourly: &QueryState<HourlyForecast>,
        tz: &Tz,
    ) -> Self {
        let body = match (current.status, &current.data) {
            (QueryStatus::Loading, _) => DetailsBody::Loading,
            (QueryStatus::Success, Some(data)) => DetailsBody::Ready {
                reading: DetailReading::from(data.as_ref()),
                forecast: forecast_section(hourly, tz),
            },
            (QueryStatus::Error, _) => DetailsBody::Error {
                hint: error_hint(current.error.as_ref()),
            },
            _ => DetailsBody::NoData,
        };

        Self {
            city: city.to_string(),
            body,
            is_fetching: current.is_fetching || hourly.is_fetching,
        }
    }

    pub fn header(&self) -> String {
        format!("Detailed weather: {}", self.city)
    }
}

fn forecast_section<Tz: TimeZone>(hourly: &QueryState<HourlyForecast>, tz: &Tz) -> ForecastSection {
    match (hourly.status, &hourly.data) {
        (QueryStatus::Loading, _) => ForecastSection::Loading,
        (QueryStatus::Success, Some(forecast)) => {
            ForecastSection::Chart(ChartModel::from_points(&forecast.points, tz))
        }
        (QueryStatus::Error, _) => ForecastSection::Error,
        _ => ForecastSection::Hidden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardBody, CardModel, ERROR_TEXT};
    use chrono::Utc;
    use citycast_weather::{Coordinates, HourlyPoint, Measurements, WeatherError};
    use std::sync::Arc;

    fn measurements(temperature: f64) -> Measurements {
        Measurements {
            temperature,
            feels_like: temperature - 2.0,
            temp_min: temperature - 1.4,
            temp_max: temperature + 1.5,
            humidity: 70,
            pressure: 1015,
        }
    }

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            city: "Kyiv".into(),
            country: Some("UA".into()),
            coordinates: Coordinates { lat: 50.45, lon: 30.52 },
            measurements: measurements(10.2),
            wind_speed: 4.1,
            condition: None,
            observed_at: Utc::now(),
        }
    }

    fn current(status: QueryStatus, data: Option<WeatherSnapshot>) -> QueryState<WeatherSnapshot> {
        QueryState {
            status,
            data: data.map(Arc::new),
            error: None,
            is_fetching: status == QueryStatus::Loading,
            updated_at: None,
        }
    }

    fn hourly(
        status: QueryStatus,
        data: Option<HourlyForecast>,
        error: Option<WeatherError>,
    ) -> QueryState<HourlyForecast> {
        QueryState {
            status,
            data: data.map(Arc::new),
            error,
            is_fetching: status == QueryStatus::Loading,
            updated_at: None,
        }
    }

    #[test]
    fn header_names_city() {
        let model = DetailsModel::from_states("Kyiv", &QueryState::idle(), &QueryState::idle(), &Utc);
        assert_eq!(model.header(), "Detailed weather: Kyiv");
        assert_eq!(model.body, DetailsBody::NoData);
    }

    #[test]
    fn loading_current() {
        let model = DetailsModel::from_states(
            "Kyiv",
            &current(QueryStatus::Loading, None),
            &hourly(QueryStatus::Loading, None, None),
            &Utc,
        );
        assert_eq!(model.body, DetailsBody::Loading);
        assert!(model.is_fetching);
    }

    #[test]
    fn ready_with_forecast_error() {
        let model = DetailsModel::from_states(
            "Kyiv",
            &current(QueryStatus::Success, Some(snapshot())),
            &hourly(QueryStatus::Error, None, Some(WeatherError::Parse("bad".into()))),
            &Utc,
        );

        let DetailsBody::Ready { reading, forecast } = model.body else {
            panic!("expected ready body");
        };
        assert_eq!(reading.temperature, 10);
        assert_eq!(reading.temp_min, 9);
        assert_eq!(reading.temp_max, 12);
        assert_eq!(reading.pressure, 1015);
        assert_eq!(forecast, ForecastSection::Error);
    }

    #[test]
    fn ready_with_chart() {
        let time = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let forecast = HourlyForecast {
            city: "Kyiv".into(),
            country: Some("UA".into()),
            points: vec![HourlyPoint {
                time,
                measurements: measurements(3.5),
                wind_speed: 2.0,
                condition: None,
            }],
        };
        let model = DetailsModel::from_states(
            "Kyiv",
            &current(QueryStatus::Success, Some(snapshot())),
            &hourly(QueryStatus::Success, Some(forecast), None),
            &Utc,
        );

        let DetailsBody::Ready { forecast, .. } = model.body else {
            panic!("expected ready body");
        };
        let ForecastSection::Chart(chart) = forecast else {
            panic!("expected chart");
        };
        assert_eq!(chart.points[0].label, "9:00");
        assert_eq!(chart.points[0].temperature, 4);
    }

    #[test]
    fn current_error() {
        let model = DetailsModel::from_states(
            "Atlantis",
            &current(QueryStatus::Error, None),
            &hourly(QueryStatus::Error, None, None),
            &Utc,
        );
        assert_eq!(model.body, DetailsBody::Error { hint: ERROR_TEXT });
    }

    #[test]
    fn not_found_hint_matches_card() {
        let mut state = current(QueryStatus::Error, None);
        state.error = Some(WeatherError::Status {
            status: 404,
            message: "city not found".into(),
        });

        let details = DetailsModel::from_states("Atlantis", &state, &QueryState::idle(), &Utc);
        let card = CardModel::from_state("Atlantis", &state);

        let DetailsBody::Error { hint } = details.body else {
            panic!("expected error body");
        };
        assert_eq!(hint, "Failed to load data. Check the city name.");
        assert_eq!(card.body, CardBody::Error { hint });
    }
}
