//! Weather data for citycast
//!
//! OpenWeatherMap client plus a per-city query cache that deduplicates
//! concurrent requests and keeps the last good value across failed refreshes.

pub mod cache;
pub mod client;
pub mod forecast;
pub mod provider;
pub mod types;

pub use cache::{Endpoint, QueryCache, QueryHandle, QueryKey, QueryState, QueryStatus};
pub use client::WeatherClient;
pub use forecast::{filter_to_window, DayWindow};
pub use provider::{WeatherProvider, WeatherSource};
pub use types::*;
