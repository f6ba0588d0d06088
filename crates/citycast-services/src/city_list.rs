//! The tracked city list and its persistence.
//!
//! Stored as one JSON array of strings under [`STORAGE_KEY`]. Anything
//! unreadable there is treated as an empty list, never repaired.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::kv_backend::{KvBackend, KvBackendError, KvBackendResult};

/// Storage key holding the JSON array of city names
pub const STORAGE_KEY: &str = "weather_cities";

/// A tracked location name: trimmed, non-empty, compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct City(String);

impl City {
    /// Trim `raw`; `None` if nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for City {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for City {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// What `CityList::add` did with its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// Already tracked (exact match); list unchanged
    Duplicate,
    /// Empty after trimming; list unchanged
    Blank,
}

/// Ordered, duplicate-free list of cities
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityList {
    cities: Vec<City>,
}

impl CityList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the list from `store`. Never fails: a missing key, a read error
    /// or malformed content all give an empty list.
    pub fn load(store: &dyn KvBackend) -> Self {
        match store.get(STORAGE_KEY) {
            Ok(Some(raw)) => Self::from_json(&raw),
            Ok(None) => Self::new(),
            Err(e) => {
                tracing::warn!("Failed to read city list, starting empty: {}", e);
                Self::new()
            }
        }
    }

    /// Lenient parse of the stored JSON
    pub fn from_json(raw: &str) -> Self {
        let names: Vec<String> = match serde_json::from_str(raw) {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!("Stored city list is malformed, starting empty: {}", e);
                return Self::new();
            }
        };

        let mut list = Self::new();
        for name in &names {
            if list.add(name) != AddOutcome::Added {
                tracing::debug!("Dropping stored entry {:?}", name);
            }
        }
        list
    }

    /// Append `name` (trimmed) unless it is blank or already present
    pub fn add(&mut self, name: &str) -> AddOutcome {
        let Some(city) = City::parse(name) else {
            return AddOutcome::Blank;
        };

        if self.cities.contains(&city) {
            return AddOutcome::Duplicate;
        }

        self.cities.push(city);
        AddOutcome::Added
    }

    /// Remove `name` if present; returns whether the list changed
    pub fn remove(&mut self, name: &str) -> bool {
        match self.cities.iter().position(|c| c.as_str() == name) {
            Some(index) => {
                self.cities.remove(index);
                true
            }
            None => false,
        }
    }

    /// Write the list to `store` as a JSON array
    pub fn persist(&self, store: &dyn KvBackend) -> KvBackendResult<()> {
        let json = self.to_json()?;
        store.set(STORAGE_KEY, &json)?;
        tracing::debug!(count = self.cities.len(), "Persisted city list");
        Ok(())
    }

    pub fn to_json(&self) -> KvBackendResult<String> {
        serde_json::to_string(&self.cities).map_err(|e| KvBackendError::Other(e.into()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cities.iter().any(|c| c.as_str() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &City> {
        self.cities.iter()
    }

    pub fn as_slice(&self) -> &[City] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv_backend::MemoryKvStore;

    fn names(list: &CityList) -> Vec<&str> {
        list.iter().map(City::as_str).collect()
    }

    #[test]
    fn test_city_parse_trims() {
        assert_eq!(City::parse("  Kyiv ").unwrap().as_str(), "Kyiv");
        assert!(City::parse("   ").is_none());
        assert!(City::parse("").is_none());
    }

    #[test]
    fn test_add_appends_in_order() {
        let mut list = CityList::new();
        assert_eq!(list.add("Kyiv"), AddOutcome::Added);
        assert_eq!(list.add(" London "), AddOutcome::Added);
        assert_eq!(names(&list), vec!["Kyiv", "London"]);
    }

    #[test]
    fn test_add_blank_is_noop() {
        let mut list = CityList::new();
        assert_eq!(list.add("   "), AddOutcome::Blank);
        assert!(list.is_empty());
    }

    #[test]
    fn test_add_duplicate_is_case_sensitive() {
        let mut list = CityList::new();
        list.add("Kyiv");
        assert_eq!(list.add("Kyiv"), AddOutcome::Duplicate);
        assert_eq!(list.add(" Kyiv"), AddOutcome::Duplicate);
        assert_eq!(list.add("kyiv"), AddOutcome::Added);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut list = CityList::new();
        list.add("Kyiv");
        list.add("London");

        assert!(list.remove("Kyiv"));
        assert!(!list.remove("Kyiv"));
        assert_eq!(names(&list), vec!["London"]);
    }

    #[test]
    fn test_load_absent_key_is_empty() {
        let store = MemoryKvStore::new();
        assert!(CityList::load(&store).is_empty());
    }

    #[test]
    fn test_load_not_json_is_empty() {
        let store = MemoryKvStore::with_value(STORAGE_KEY, "not json");
        assert!(CityList::load(&store).is_empty());
    }

    #[test]
    fn test_load_object_is_empty() {
        let store = MemoryKvStore::with_value(STORAGE_KEY, "{}");
        assert!(CityList::load(&store).is_empty());
    }

    #[test]
    fn test_load_non_string_array_is_empty() {
        let store = MemoryKvStore::with_value(STORAGE_KEY, "[1, 2, 3]");
        assert!(CityList::load(&store).is_empty());
    }

    #[test]
    fn test_load_drops_blank_and_duplicate_entries() {
        let store = MemoryKvStore::with_value(STORAGE_KEY, r#"["Kyiv", " ", "London", "Kyiv"]"#);
        let list = CityList::load(&store);
        assert_eq!(names(&list), vec!["Kyiv", "London"]);
    }

    #[test]
    fn test_persist_writes_json_array() {
        let store = MemoryKvStore::new();
        let mut list = CityList::new();
        list.add("Kyiv");
        list.add("London");
        list.persist(&store).unwrap();

        assert_eq!(
            store.get(STORAGE_KEY).unwrap().as_deref(),
            Some(r#"["Kyiv","London"]"#)
        );
        assert_eq!(CityList::load(&store), list);
    }

    #[test]
    fn test_persist_empty_list() {
        let store = MemoryKvStore::with_value(STORAGE_KEY, r#"["Kyiv"]"#);
        CityList::new().persist(&store).unwrap();
        assert_eq!(store.get(STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    }
}
