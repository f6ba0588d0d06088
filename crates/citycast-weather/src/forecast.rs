//! Restricting a forecast series to the current local calendar day.

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Timelike, Utc};

use crate::types::{HourlyForecast, HourlyPoint};

/// Half-open interval `[start, start + 24h)` beginning at local midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Window for the calendar day containing `now`, in `now`'s time zone
    pub fn containing<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let midnight = now.date_naive().and_time(NaiveTime::MIN);
        let start = match now.timezone().from_local_datetime(&midnight).earliest() {
            Some(start) => start.with_timezone(&Utc),
            // Midnight skipped by a DST jump
            None => {
                now.with_timezone(&Utc)
                    - Duration::seconds(i64::from(now.num_seconds_from_midnight()))
            }
        };

        Self {
            start,
            end: start + Duration::hours(24),
        }
    }

    /// Window for today in the system time zone
    pub fn today() -> Self {
        Self::containing(&Local::now())
    }

    pub fn contains(&self, time: &DateTime<Utc>) -> bool {
        *time >= self.start && *time < self.end
    }
}

/// Keep only points inside `window`, preserving order
pub fn filter_to_window(points: Vec<HourlyPoint>, window: &DayWindow) -> Vec<HourlyPoint> {
    points
        .into_iter()
        .filter(|p| window.contains(&p.time))
        .collect()
}

impl HourlyForecast {
    pub fn restricted_to(self, window: &DayWindow) -> Self {
        Self {
            points: filter_to_window(self.points, window),
            ..self
        }
    }
}
