//! Keyed request cache with in-flight deduplication.
//!
//! Each key owns at most one in-flight request, held as a [`Shared`] future so
//! any number of subscribers can await the same network call. Requests run on
//! spawned tokio tasks and record their outcome into the entry on completion,
//! whether or not anyone is awaiting them.
//!
//! A failed refresh keeps the last successful value: consumers see stale data
//! plus the error instead of losing what they had.

use chrono::{DateTime, Utc};
use futures::future::{self, BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::types::{Units, WeatherError};

/// Outcome of one request, shared between subscribers
pub type FetchResult<T> = Result<Arc<T>, WeatherError>;

/// Produces a fresh request future each time the cache needs one
pub type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, WeatherError>> + Send + Sync>;

type SharedFetch<T> = Shared<BoxFuture<'static, FetchResult<T>>>;

/// Logical provider call a key refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CurrentWeather,
    HourlyForecast,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub endpoint: Endpoint,
    pub city: String,
    pub units: Units,
}

impl QueryKey {
    pub fn new(endpoint: Endpoint, city: impl Into<String>, units: Units) -> Self {
        Self {
            endpoint,
            city: city.into(),
            units,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({}, {})", self.endpoint, self.city, self.units.as_query())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Skipped or never requested
    Idle,
    /// First request outstanding, nothing cached yet
    Loading,
    /// A value is available (possibly stale if a refresh failed)
    Success,
    /// No value and the last request failed
    Error,
}

/// Point-in-time view of one cache entry
#[derive(Debug)]
pub struct QueryState<T> {
    pub status: QueryStatus,
    pub data: Option<Arc<T>>,
    pub error: Option<WeatherError>,
    /// A request (initial or background) is outstanding
    pub is_fetching: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            is_fetching: self.is_fetching,
            updated_at: self.updated_at,
        }
    }
}

impl<T> QueryState<T> {
    pub fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            is_fetching: false,
            updated_at: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }
}

struct Entry<T> {
    data: Option<Arc<T>>,
    error: Option<WeatherError>,
    in_flight: Option<SharedFetch<T>>,
    /// Bumped for every request started; only the current one may write back
    generation: u64,
    subscribers: usize,
    updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            in_flight: None,
            generation: 0,
            subscribers: 0,
            updated_at: None,
        }
    }
}

impl<T> Entry<T> {
    fn state(&self) -> QueryState<T> {
        let status = match (&self.data, &self.in_flight, &self.error) {
            (Some(_), _, _) => QueryStatus::Success,
            (None, Some(_), _) => QueryStatus::Loading,
            (None, None, Some(_)) => QueryStatus::Error,
            (None, None, None) => QueryStatus::Idle,
        };

        QueryState {
            status,
            data: self.data.clone(),
            error: self.error.clone(),
            is_fetching: self.in_flight.is_some(),
            updated_at: self.updated_at,
        }
    }
}

/// Session-lifetime cache of one data kind. Entries are never evicted.
pub struct QueryCache<T> {
    entries: Arc<Mutex<HashMap<QueryKey, Entry<T>>>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<T: Send + Sync + 'static> QueryCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `key`, starting a request unless a value is cached or
    /// one is already in flight.
    ///
    /// Must be called within a tokio runtime.
    pub fn query(&self, key: QueryKey, fetcher: Fetcher<T>) -> QueryHandle<T> {
        self.entries.lock().entry(key.clone()).or_default().subscribers += 1;
        drop(self.start(&key, false, &fetcher));

        QueryHandle {
            cache: self.clone(),
            target: Some((key, fetcher)),
        }
    }

    /// A handle that never fetches and always reports `Idle`
    pub fn skipped(&self) -> QueryHandle<T> {
        QueryHandle {
            cache: self.clone(),
            target: None,
        }
    }

    /// Resolve `key` without subscribing: the cached value if present,
    /// otherwise the in-flight request or a new one.
    pub async fn fetch(&self, key: &QueryKey, fetcher: &Fetcher<T>) -> FetchResult<T> {
        self.start(key, false, fetcher).await
    }

    pub fn state(&self, key: &QueryKey) -> QueryState<T> {
        self.entries
            .lock()
            .get(key)
            .map(Entry::state)
            .unwrap_or_else(QueryState::idle)
    }

    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.entries.lock().get(key).map_or(0, |e| e.subscribers)
    }

    pub fn is_in_flight(&self, key: &QueryKey) -> bool {
        self.entries
            .lock()
            .get(key)
            .is_some_and(|e| e.in_flight.is_some())
    }

    /// Number of keys with an outstanding request
    pub fn in_flight_count(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|e| e.in_flight.is_some())
            .count()
    }

    fn in_flight(&self, key: &QueryKey) -> Option<SharedFetch<T>> {
        self.entries.lock().get(key).and_then(|e| e.in_flight.clone())
    }

    fn start(&self, key: &QueryKey, force: bool, fetcher: &Fetcher<T>) -> SharedFetch<T> {
        let mut entries = self.entries.lock();
        let entry = entries.entry(key.clone()).or_default();

        if let Some(in_flight) = &entry.in_flight {
            tracing::debug!(key = %key, "Joining in-flight request");
            return in_flight.clone();
        }

        if !force {
            if let Some(data) = &entry.data {
                tracing::trace!(key = %key, "Serving cached value");
                return future::ready(Ok(Arc::clone(data))).boxed().shared();
            }
        }

        entry.generation += 1;
        let generation = entry.generation;
        tracing::debug!(key = %key, generation, force, "Starting request");

        let request = fetcher();
        let task_entries = Arc::clone(&self.entries);
        let task_key = key.clone();
        let task = tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(request).catch_unwind().await {
                Ok(result) => result.map(Arc::new),
                Err(payload) => Err(WeatherError::Task(panic_message(&*payload))),
            };
            record(&task_entries, &task_key, generation, &outcome);
            outcome
        });

        let join_entries = Arc::clone(&self.entries);
        let join_key = key.clone();
        let shared = async move {
            match task.await {
                Ok(outcome) => outcome,
                // Task cancelled by runtime shutdown
                Err(e) => {
                    let outcome = Err(WeatherError::Task(e.to_string()));
                    record(&join_entries, &join_key, generation, &outcome);
                    outcome
                }
            }
        }
        .boxed()
        .shared();

        entry.in_flight = Some(shared.clone());
        shared
    }

    fn unsubscribe(&self, key: &QueryKey) {
        if let Some(entry) = self.entries.lock().get_mut(key) {
            entry.subscribers = entry.subscribers.saturating_sub(1);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let reason = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause");
    format!("request panicked: {}", reason)
}

/// Apply a finished request to its entry if it is still the current one
fn record<T>(
    entries: &Mutex<HashMap<QueryKey, Entry<T>>>,
    key: &QueryKey,
    generation: u64,
    outcome: &FetchResult<T>,
) {
    let mut entries = entries.lock();
    let Some(entry) = entries.get_mut(key) else {
        return;
    };

    if entry.generation != generation {
        tracing::debug!(
            key = %key,
            generation,
            current = entry.generation,
            "Discarding superseded response"
        );
        return;
    }

    entry.in_flight = None;
    match outcome {
        Ok(data) => {
            entry.data = Some(Arc::clone(data));
            entry.error = None;
            entry.updated_at = Some(Utc::now());
            tracing::debug!(key = %key, "Request succeeded");
        }
        Err(e) => {
            if entry.data.is_some() {
                tracing::warn!(key = %key, "Refresh failed, keeping last value: {}", e);
            } else {
                tracing::warn!(key = %key, "Request failed: {}", e);
            }
            entry.error = Some(e.clone());
        }
    }
}

/// A subscriber's view of one key.
///
/// Dropping the handle stops observing; it does not cancel the request.
pub struct QueryHandle<T: Send + Sync + 'static> {
    cache: QueryCache<T>,
    target: Option<(QueryKey, Fetcher<T>)>,
}

impl<T: Send + Sync + 'static> QueryHandle<T> {
    pub fn key(&self) -> Option<&QueryKey> {
        self.target.as_ref().map(|(key, _)| key)
    }

    pub fn state(&self) -> QueryState<T> {
        match &self.target {
            Some((key, _)) => self.cache.state(key),
            None => QueryState::idle(),
        }
    }

    /// Force a background refresh; joins the current request if one is
    /// already outstanding.
    pub fn refetch(&self) {
        if let Some((key, fetcher)) = &self.target {
            drop(self.cache.start(key, true, fetcher));
        }
    }

    /// Wait for the outstanding request, if any, then report the state
    pub async fn settled(&self) -> QueryState<T> {
        if let Some((key, _)) = &self.target {
            if let Some(in_flight) = self.cache.in_flight(key) {
                let _ = in_flight.await;
            }
        }
        self.state()
    }
}

impl<T: Send + Sync + 'static> Drop for QueryHandle<T> {
    fn drop(&mut self) {
        if let Some((key, _)) = &self.target {
            self.cache.unsubscribe(key);
        }
    }
}
