//! Page-level view controller: the tracked cities, the add-city draft and
//! which view is showing.
//!
//! Holds one weather subscription per visible city. In the list view every
//! city has a current-weather subscription; in the detail view only the
//! selected city is observed, for both current weather and today's forecast.
//! Subscriptions are plain [`QueryHandle`]s, so switching views never cancels
//! a request, and coming back to a city is served from cache.

use chrono::{Local, TimeZone};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;

use citycast_services::{AddOutcome, City, CityList, KvBackend};
use citycast_weather::{
    HourlyForecast, QueryHandle, QueryState, Units, WeatherClient, WeatherSnapshot,
};

use super::{CardModel, DetailsModel};
use crate::error_mapping;

pub const PAGE_TITLE: &str = "Weather App";
pub const EMPTY_LIST_TEXT: &str = "No cities added yet. Add your first city above.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    List,
    Detail(City),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageBody {
    Empty,
    Cards(Vec<CardModel>),
    Details(DetailsModel),
}

/// Everything a front-end needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    pub title: &'static str,
    pub draft: String,
    pub units: Units,
    pub body: PageBody,
    /// Non-fatal problem from the last action, e.g. a failed save
    pub notice: Option<&'static str>,
}

struct DetailQueries {
    city: City,
    current: QueryHandle<WeatherSnapshot>,
    hourly: QueryHandle<HourlyForecast>,
}

pub struct PageModel {
    store: Arc<dyn KvBackend>,
    client: WeatherClient,
    cities: CityList,
    draft: String,
    view: ViewState,
    notice: Option<&'static str>,
    cards: HashMap<City, QueryHandle<WeatherSnapshot>>,
    detail: Option<DetailQueries>,
}

impl PageModel {
    /// Load the stored list and subscribe each city's card.
    ///
    /// Must be called within a tokio runtime. Loading never writes back.
    pub fn new(store: Arc<dyn KvBackend>, client: WeatherClient) -> Self {
        let cities = CityList::load(store.as_ref());
        tracing::info!(count = cities.len(), "Loaded city list");

        let mut page = Self {
            store,
            client,
            cities,
            draft: String::new(),
            view: ViewState::List,
            notice: None,
            cards: HashMap::new(),
            detail: None,
        };
        page.sync_subscriptions();
        page
    }

    pub fn cities(&self) -> &CityList {
        &self.cities
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Add the draft as a city.
    ///
    /// The draft is cleared unless it was blank, including when the city is
    /// already tracked.
    pub fn add_city(&mut self) -> AddOutcome {
        self.notice = None;
        let outcome = self.cities.add(&self.draft);

        match outcome {
            AddOutcome::Blank => return outcome,
            AddOutcome::Duplicate => {
                tracing::debug!(city = %self.draft.trim(), "City already tracked");
            }
            AddOutcome::Added => {
                tracing::info!(city = %self.draft.trim(), "Added city");
                self.persist();
                self.sync_subscriptions();
            }
        }

        self.draft.clear();
        outcome
    }

    /// Stop tracking `name`. Returns to the list if it was the open city.
    pub fn remove_city(&mut self, name: &str) -> bool {
        self.notice = None;
        if !self.cities.remove(name) {
            return false;
        }

        tracing::info!(city = %name, "Removed city");
        self.persist();

        if matches!(&self.view, ViewState::Detail(city) if city.as_str() == name) {
            self.view = ViewState::List;
        }
        self.sync_subscriptions();
        true
    }

    /// Open the detail view for a tracked city
    pub fn select_city(&mut self, name: &str) -> bool {
        let Some(city) = self.cities.iter().find(|c| c.as_str() == name).cloned() else {
            return false;
        };

        self.view = ViewState::Detail(city);
        self.sync_subscriptions();
        true
    }

    pub fn clear_selection(&mut self) {
        self.view = ViewState::List;
        self.sync_subscriptions();
    }

    /// Force a refetch of `name`'s current weather, and of its forecast when
    /// it is the open city.
    pub fn refresh_city(&mut self, name: &str) -> bool {
        if !self.cities.contains(name) {
            return false;
        }

        match &self.detail {
            Some(detail) if detail.city.as_str() == name => {
                detail.current.refetch();
                detail.hourly.refetch();
            }
            _ => match self.cards.get(name) {
                Some(handle) => handle.refetch(),
                None => self.client.current_weather(name).refetch(),
            },
        }
        tracing::debug!(city = %name, "Refresh requested");
        true
    }

    pub fn refresh_all(&mut self) {
        let names: Vec<String> = self.cities.iter().map(|c| c.to_string()).collect();
        for name in names {
            self.refresh_city(&name);
        }
    }

    /// Wait until every visible query has no request outstanding
    pub async fn settle(&self) {
        join_all(self.cards.values().map(|h| h.settled())).await;
        if let Some(detail) = &self.detail {
            detail.current.settled().await;
            detail.hourly.settled().await;
        }
    }

    pub fn snapshot(&self) -> PageSnapshot {
        self.snapshot_in(&Local)
    }

    /// Like [`snapshot`](Self::snapshot) with chart times in `tz`
    pub fn snapshot_in<Tz: TimeZone>(&self, tz: &Tz) -> PageSnapshot {
        let body = match &self.detail {
            Some(detail) => PageBody::Details(DetailsModel::from_states(
                detail.city.as_str(),
                &detail.current.state(),
                &detail.hourly.state(),
                tz,
            )),
            None if self.cities.is_empty() => PageBody::Empty,
            None => PageBody::Cards(
                self.cities
                    .iter()
                    .map(|city| {
                        let state = self
                            .cards
                            .get(city)
                            .map(QueryHandle::state)
                            .unwrap_or_else(QueryState::idle);
                        CardModel::from_state(city.as_str(), &state)
                    })
                    .collect(),
            ),
        };

        PageSnapshot {
            title: PAGE_TITLE,
            draft: self.draft.clone(),
            units: self.client.units(),
            body,
            notice: self.notice,
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.cities.persist(self.store.as_ref()) {
            let err = error_mapping::storage_error(e);
            tracing::error!("Failed to save city list: {}", err);
            self.notice = Some(err.user_message());
        }
    }

    fn sync_subscriptions(&mut self) {
        match &self.view {
            ViewState::List => {
                self.detail = None;
                self.cards.retain(|city, _| self.cities.contains(city.as_str()));
                for city in self.cities.iter() {
                    if !self.cards.contains_key(city) {
                        let handle = self.client.current_weather(city.as_str());
                        self.cards.insert(city.clone(), handle);
                    }
                }
            }
            ViewState::Detail(city) => {
                self.cards.clear();
                if self.detail.as_ref().is_some_and(|d| &d.city == city) {
                    return;
                }
                self.detail = Some(DetailQueries {
                    city: city.clone(),
                    current: self.client.current_weather(city.as_str()),
                    hourly: self.client.hourly_forecast(city.as_str()),
                });
            }
        }
    }
}
