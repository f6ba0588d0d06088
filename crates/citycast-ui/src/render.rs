//! Plain-text rendering of a [`PageSnapshot`] for the terminal front-end.

use std::fmt::Write;

use citycast_weather::Units;

use crate::models::card_model;
use crate::models::chart_model::EMPTY_CHART_TEXT;
use crate::models::details_model;
use crate::models::page_model::EMPTY_LIST_TEXT;
use crate::models::{
    CardBody, CardModel, ChartModel, DetailsBody, DetailsModel, ForecastSection, PageBody,
    PageSnapshot,
};

/// Width of the longest chart bar
const BAR_WIDTH: i64 = 30;

pub fn render(snapshot: &PageSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", snapshot.title);
    if let Some(notice) = snapshot.notice {
        let _ = writeln!(out, "! {}", notice);
    }
    out.push('\n');

    match &snapshot.body {
        PageBody::Empty => {
            let _ = writeln!(out, "{}", EMPTY_LIST_TEXT);
        }
        PageBody::Cards(cards) => {
            for card in cards {
                render_card(&mut out, card, snapshot.units);
                out.push('\n');
            }
        }
        PageBody::Details(details) => render_details(&mut out, details, snapshot.units),
    }

    out
}

fn render_card(out: &mut String, card: &CardModel, units: Units) {
    let title = match &card.country {
        Some(country) => format!("{}, {}", card.city, country),
        None => card.city.clone(),
    };
    let _ = writeln!(out, "{:<40}[{}]", title, card.update_label());

    let t = units.temperature_suffix();
    match &card.body {
        CardBody::Loading => {
            let _ = writeln!(out, "  {}", card_model::LOADING_TEXT);
        }
        CardBody::Error { hint } => {
            let _ = writeln!(out, "  {}", hint);
        }
        CardBody::NoData => {
            let _ = writeln!(out, "  {}", card_model::NO_DATA_TEXT);
        }
        CardBody::Ready(reading) => {
            let _ = write!(
                out,
                "  {}{} (feels like {}{})",
                reading.temperature, t, reading.feels_like, t
            );
            if let Some(description) = &reading.description {
                let _ = write!(out, "  {}", description);
            }
            let _ = writeln!(
                out,
                "\n  Humidity: {}%  Wind: {} {}",
                reading.humidity,
                reading.wind_speed,
                units.wind_suffix()
            );
        }
    }
}

fn render_details(out: &mut String, details: &DetailsModel, units: Units) {
    let _ = writeln!(out, "{}", details.header());
    if details.is_fetching {
        let _ = writeln!(out, "(updating)");
    }

    let t = units.temperature_suffix();
    match &details.body {
        DetailsBody::Loading => {
            let _ = writeln!(out, "{}", details_model::LOADING_TEXT);
        }
        DetailsBody::Error { hint } => {
            let _ = writeln!(out, "{}", hint);
        }
        DetailsBody::NoData => {
            let _ = writeln!(out, "{}", card_model::NO_DATA_TEXT);
        }
        DetailsBody::Ready { reading, forecast } => {
            match &reading.country {
                Some(country) => {
                    let _ = writeln!(out, "{}, {}", reading.name, country);
                }
                None => {
                    let _ = writeln!(out, "{}", reading.name);
                }
            }
            let _ = writeln!(
                out,
                "Temperature: {}{} (min {}{} / max {}{})",
                reading.temperature, t, reading.temp_min, t, reading.temp_max, t
            );
            if let Some(description) = &reading.description {
                let _ = writeln!(out, "Conditions: {}", description);
            }
            let _ = writeln!(out, "Humidity: {}%", reading.humidity);
            let _ = writeln!(out, "Pressure: {} hPa", reading.pressure);
            let _ = writeln!(out, "Wind: {} {}", reading.wind_speed, units.wind_suffix());
            out.push('\n');
            render_forecast(out, forecast, t);
        }
    }
}

fn render_forecast(out: &mut String, forecast: &ForecastSection, suffix: &str) {
    match forecast {
        ForecastSection::Hidden => {}
        ForecastSection::Loading => {
            let _ = writeln!(out, "{}", details_model::FORECAST_LOADING_TEXT);
        }
        ForecastSection::Error => {
            let _ = writeln!(out, "{}", details_model::FORECAST_ERROR_TEXT);
        }
        ForecastSection::Chart(chart) => render_chart(out, chart, suffix),
    }
}

fn render_chart(out: &mut String, chart: &ChartModel, suffix: &str) {
    let _ = writeln!(out, "Today:");
    if chart.is_empty() {
        let _ = writeln!(out, "  {}", EMPTY_CHART_TEXT);
        return;
    }

    let min = chart.points.iter().map(|p| p.temperature).min().unwrap_or(0);
    let max = chart.points.iter().map(|p| p.temperature).max().unwrap_or(0);
    let span = (max - min).max(1);

    for (index, point) in chart.points.iter().enumerate() {
        let bar = 1 + (point.temperature - min) * (BAR_WIDTH - 1) / span;
        let _ = writeln!(
            out,
            "  {:>5} {:>4}{} {}",
            chart.tick_label(index).unwrap_or(""),
            point.temperature,
            suffix,
            "#".repeat(bar as usize)
        );
    }
}
