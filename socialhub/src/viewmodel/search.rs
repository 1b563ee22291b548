use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::logging::SEARCH;
use crate::search::UserSearch;
use crate::services::Services;
use crate::task_scope::{AbortOnDrop, TaskScope};
use socialhub_types::User;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchUiState {
    /// Raw text as typed
    pub query: String,
    pub results: Vec<User>,
    pub is_searching: bool,
    pub error_message: Option<String>,
}

/// User search screen with a debounced, switch-to-latest query pipeline.
pub struct SearchViewModel {
    query: watch::Sender<String>,
    state: Arc<watch::Sender<SearchUiState>>,
    _scope: TaskScope,
}

impl SearchViewModel {
    /// Must be called from within a tokio runtime.
    pub fn new(services: Services) -> Self {
        let debounce = Duration::from_millis(services.settings.search.debounce_ms);
        Self::with_debounce(services, debounce)
    }

    pub fn with_debounce(services: Services, debounce: Duration) -> Self {
        let (query, query_rx) = watch::channel(String::new());
        let state = Arc::new(watch::channel(SearchUiState::default()).0);

        let scope = TaskScope::new();
        scope.spawn(run_search_pipeline(
            services.user_search(),
            query_rx,
            state.clone(),
            debounce,
        ));

        Self {
            query,
            state,
            _scope: scope,
        }
    }

    pub fn state(&self) -> watch::Receiver<SearchUiState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SearchUiState {
        self.state.borrow().clone()
    }

    /// Record a keystroke. The raw query is visible immediately; the search
    /// itself waits until typing pauses.
    pub fn on_query_change(&self, value: impl Into<String>) {
        let value = value.into();
        self.state.send_modify(|state| state.query = value.clone());
        self.query.send_replace(value);
    }
}

async fn run_search_pipeline(
    search: UserSearch,
    mut queries: watch::Receiver<String>,
    state: Arc<watch::Sender<SearchUiState>>,
    debounce: Duration,
) {
    // Dropping the guard aborts a search that a newer query superseded
    let mut in_flight: Option<AbortOnDrop> = None;

    while queries.changed().await.is_ok() {
        // Restart the timer on every keystroke until typing pauses
        loop {
            tokio::select! {
                changed = queries.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                _ = tokio::time::sleep(debounce) => break,
            }
        }

        let query = queries.borrow_and_update().trim().to_string();
        drop(in_flight.take());

        if query.is_empty() {
            state.send_modify(|state| {
                state.results.clear();
                state.is_searching = false;
                state.error_message = None;
            });
            continue;
        }

        log::debug!(target: SEARCH, "Searching for '{}'", query);
        state.send_modify(|state| state.is_searching = true);

        let search = search.clone();
        let state = state.clone();
        in_flight = Some(AbortOnDrop::spawn(async move {
            let result = search.search(&query).await;
            state.send_modify(|state| {
                state.results = result.users;
                state.error_message = result.error_message;
                state.is_searching = false;
            });
        }));
    }
}
