//! View models: plain data derived from page state and query results.

use citycast_weather::{Condition, WeatherError};

use crate::error_mapping;

pub mod card_model;
pub mod chart_model;
pub mod details_model;
pub mod page_model;

pub use card_model::{CardBody, CardModel, CardReading};
pub use chart_model::{ChartModel, ChartPoint};
pub use details_model::{DetailReading, DetailsBody, DetailsModel, ForecastSection};
pub use page_model::{PageBody, PageModel, PageSnapshot, ViewState};

/// Shown when a query failed without recording why
pub const ERROR_TEXT: &str = "Failed to load data.";

/// Inline text for a failed query, shared by the card and detail views
pub(crate) fn error_hint(error: Option<&WeatherError>) -> &'static str {
    error
        .map(|e| error_mapping::weather_error(e).user_message())
        .unwrap_or(ERROR_TEXT)
}

/// Provider description, or the category name when the provider sent none
pub(crate) fn condition_text(condition: &Condition) -> String {
    if condition.description.trim().is_empty() {
        condition.category().description().to_string()
    } else {
        condition.description.clone()
    }
}

/// Round half toward positive infinity
pub(crate) fn round_display(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
