//! Web search shortcut with a persisted engine choice.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use todaydo_core::store::keys;
use todaydo_core::{KvStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    #[default]
    Google,
    Naver,
    Baidu,
}

impl SearchEngine {
    pub const ALL: [SearchEngine; 3] = [Self::Google, Self::Naver, Self::Baidu];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Naver => "Naver",
            Self::Baidu => "Baidu",
        }
    }

    /// The engine after this one, wrapping around (Tab in the search box).
    pub fn next(&self) -> Self {
        let index = Self::ALL.iter().position(|e| e == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    fn url_prefix(&self) -> &'static str {
        match self {
            Self::Google => "https://www.google.com/search?q=",
            Self::Naver => "https://search.naver.com/search.naver?query=",
            Self::Baidu => "https://www.baidu.com/s?wd=",
        }
    }

    /// Search URL for `query`, or `None` when the query is blank.
    pub fn search_url(&self, query: &str) -> Option<String> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        Some(format!("{}{}", self.url_prefix(), urlencoding::encode(query)))
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "naver" => Ok(Self::Naver),
            "baidu" => Ok(Self::Baidu),
            other => Err(format!("Unknown search engine: {}", other)),
        }
    }
}

/// Engine preference stored under `today-do-search-engine`.
#[derive(Debug, Clone)]
pub struct SearchPreference {
    store: KvStore,
}

impl SearchPreference {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    pub fn engine(&self) -> SearchEngine {
        self.store.get(keys::SEARCH_ENGINE, SearchEngine::default())
    }

    pub fn set_engine(&self, engine: SearchEngine) -> Result<(), StoreError> {
        self.store.set(keys::SEARCH_ENGINE, &engine)
    }

    /// Switch to the next engine and remember it.
    pub fn cycle(&self) -> Result<SearchEngine, StoreError> {
        let next = self.engine().next();
        self.set_engine(next)?;
        Ok(next)
    }

    /// URL for `query` with the preferred engine.
    pub fn search_url(&self, query: &str) -> Option<String> {
        self.engine().search_url(query)
    }
}
