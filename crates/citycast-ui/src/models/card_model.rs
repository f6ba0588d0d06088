//! Summary card for one city in the list view.

use citycast_weather::{QueryState, QueryStatus, WeatherSnapshot};

use super::{condition_text, error_hint, round_display};

pub const LOADING_TEXT: &str = "Loading weather...";
pub const NO_DATA_TEXT: &str = "No data available.";

#[derive(Debug, Clone, PartialEq)]
pub struct CardReading {
    pub temperature: i64,
    pub feels_like: i64,
    pub description: Option<String>,
    pub humidity: u8,
    pub wind_speed: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CardBody {
    Loading,
    /// No value to show; `hint` says why
    Error { hint: &'static str },
    Ready(CardReading),
    NoData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardModel {
    pub city: String,
    pub country: Option<String>,
    pub body: CardBody,
    pub is_fetching: bool,
}

impl CardModel {
    pub fn from_state(city: &str, state: &QueryState<WeatherSnapshot>) -> Self {
        let body = match (state.status, &state.data, &state.error) {
            (QueryStatus::Loading, _, _) => CardBody::Loading,
            // Stale data wins over a failed refresh
            (QueryStatus::Success, Some(data), _) => CardBody::Ready(CardReading {
                temperature: round_display(data.measurements.temperature),
                feels_like: round_display(data.measurements.feels_like),
                description: data.condition.as_ref().map(condition_text),
                humidity: data.measurements.humidity,
                wind_speed: data.wind_speed,
            }),
            (QueryStatus::Error, _, error) => CardBody::Error {
                hint: error_hint(error.as_ref()),
            },
            _ => CardBody::NoData,
        };

        Self {
            city: city.to_string(),
            country: state.data.as_ref().and_then(|d| d.country.clone()),
            body,
            is_fetching: state.is_fetching,
        }
    }

    /// Label of the force-refresh action
    pub fn update_label(&self) -> &'static str {
        if self.is_fetching {
            "Updating..."
        } else {
            "Update now"
        }
    }
}
