//! Today's temperature series for the detail view.

use chrono::{TimeZone, Timelike};
use citycast_weather::HourlyPoint;

use super::round_display;

pub const EMPTY_CHART_TEXT: &str = "No data to display the graph";

/// Above this many points only whole hours and the ends get a tick label
const ALL_TICKS_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPoint {
    pub label: String,
    pub temperature: i64,
    pub hours: u32,
    pub minutes: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartModel {
    pub points: Vec<ChartPoint>,
}

impl ChartModel {
    /// Build chart points with labels in the `tz` wall clock
    pub fn from_points<Tz: TimeZone>(points: &[HourlyPoint], tz: &Tz) -> Self {
        let points = points
            .iter()
            .map(|p| {
                let local = p.time.with_timezone(tz);
                let (hours, minutes) = (local.hour(), local.minute());
                let label = if minutes == 0 {
                    format!("{}:00", hours)
                } else {
                    format!("{:02}:{:02}", hours, minutes)
                };
                ChartPoint {
                    label,
                    temperature: round_display(p.measurements.temperature),
                    hours,
                    minutes,
                }
            })
            .collect();

        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axis label for the point at `index`, if it gets one
    pub fn tick_label(&self, index: usize) -> Option<&str> {
        let point = self.points.get(index)?;
        let len = self.points.len();
        let shown = len <= ALL_TICKS_LIMIT
            || point.minutes == 0
            || index == 0
            || index + 1 == len;
        shown.then_some(point.label.as_str())
    }
}
