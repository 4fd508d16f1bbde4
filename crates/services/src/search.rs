use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use crate::config::ServicesConfig;
use crate::error::LookupError;
use crate::geocoding::Geocoder;
use crate::model::SearchResult;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Empty query: nothing to show.
    Idle,
    /// Inline validation message; no request was made.
    Hint(String),
    Results(Vec<SearchResult>),
    Failed(String),
    /// A newer search started before this one finished.
    Superseded,
}

/// Debounced, latest-wins search front.
///
/// Each call supersedes every earlier one. A call waits out the debounce
/// window, then queries the geocoder; if a newer call arrives during either
/// phase, the older call drops its request future and resolves to
/// [`SearchOutcome::Superseded`].
pub struct SearchDebouncer {
    geocoder: Arc<dyn Geocoder>,
    delay: Duration,
    min_query_len: usize,
    generation: watch::Sender<u64>,
}

impl SearchDebouncer {
    pub fn new(geocoder: Arc<dyn Geocoder>, delay: Duration) -> Self {
        Self {
            geocoder,
            delay,
            min_query_len: ServicesConfig::default().min_query_len,
            generation: watch::Sender::new(0),
        }
    }

    pub fn from_config(geocoder: Arc<dyn Geocoder>, config: &ServicesConfig) -> Self {
        Self {
            min_query_len: config.min_query_len,
            ..Self::new(geocoder, config.search_debounce)
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Supersede whatever search is pending.
    pub fn cancel(&self) {
        self.generation.send_modify(|g| *g += 1);
    }

    pub async fn search(&self, query: &str) -> SearchOutcome {
        let mut changes = self.generation.subscribe();
        self.cancel();
        let generation = *changes.borrow_and_update();

        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome::Idle;
        }
        if query.chars().count() < self.min_query_len {
            let hint = LookupError::QueryTooShort {
                min: self.min_query_len,
            };
            return SearchOutcome::Hint(hint.user_message());
        }

        tokio::select! {
            _ = tokio::time::sleep(self.delay) => {}
            _ = changes.changed() => {
                debug!(query, "search superseded while debouncing");
                return SearchOutcome::Superseded;
            }
        }

        let result = tokio::select! {
            result = self.geocoder.search(query) => result,
            _ = changes.changed() => {
                debug!(query, "search superseded in flight");
                return SearchOutcome::Superseded;
            }
        };
        if *self.generation.borrow() != generation {
            return SearchOutcome::Superseded;
        }

        match result {
            Ok(results) => SearchOutcome::Results(results),
            Err(err) if err.is_validation() => SearchOutcome::Hint(err.user_message()),
            Err(err) => SearchOutcome::Failed(err.user_message()),
        }
    }
}
