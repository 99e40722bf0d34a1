use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use crate::data::predict_api::TeamSearch;
use crate::data::types::TeamSuggestion;
use crate::page::document::SuggestionItem;
use crate::page::{Document, PageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutocompleteState {
    Idle,
    Debouncing,
    Fetching,
    ShowingSuggestions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompleteSettings {
    pub debounce: Duration,
    pub min_query_chars: usize,
}

impl Default for AutocompleteSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_query_chars: 2,
        }
    }
}

/// What a document click landed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    Element(String),
    SuggestionItem { list_id: String, index: usize },
    Outside,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Debounced team suggestions for one input and its list
pub struct AutocompleteController {
    inner: Arc<Inner>,
}

struct Inner {
    input_id: String,
    list_id: String,
    document: Arc<Document>,
    search: Arc<dyn TeamSearch>,
    settings: AutocompleteSettings,
    timer: Mutex<Option<JoinHandle<()>>>,
    // bumped on every keystroke and selection; fetches tagged with an older value are stale
    generation: AtomicU64,
    state: Mutex<AutocompleteState>,
}

impl AutocompleteController {
    pub fn new(
        document: Arc<Document>,
        input_id: &str,
        list_id: &str,
        search: Arc<dyn TeamSearch>,
        settings: AutocompleteSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                input_id: input_id.to_string(),
                list_id: list_id.to_string(),
                document,
                search,
                settings,
                timer: Mutex::new(None),
                generation: AtomicU64::new(0),
                state: Mutex::new(AutocompleteState::Idle),
            }),
        }
    }

    pub fn input_id(&self) -> &str {
        &self.inner.input_id
    }

    pub fn list_id(&self) -> &str {
        &self.inner.list_id
    }

    #[cfg(test)]
    pub fn state(&self) -> AutocompleteState {
        *lock(&self.inner.state)
    }

    /// React to the input's value having changed
    pub fn on_input(&self) -> Result<(), PageError> {
        self.cancel_pending();
        let mut state = lock(&self.inner.state);
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let query = self.inner.document.input_value(&self.inner.input_id)?.trim().to_string();
        if query.chars().count() < self.inner.settings.min_query_chars {
            self.inner.hide()?;
            *state = AutocompleteState::Idle;
            return Ok(());
        }

        debug!("#{}: scheduling search for {:?}", self.inner.input_id, query);
        *state = AutocompleteState::Debouncing;
        drop(state);

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(inner.settings.debounce).await;
            // Detached so a later keystroke only cancels the timer, never the request
            tokio::spawn(Inner::fetch(inner, generation, query));
        });
        *lock(&self.inner.timer) = Some(handle);
        Ok(())
    }

    /// Pick the `index`-th row of the visible list. Returns the chosen name.
    pub fn select(&self, index: usize) -> Result<Option<String>, PageError> {
        let mut state = lock(&self.inner.state);
        let list = self.inner.document.suggestion_list(&self.inner.list_id)?;
        if !list.visible {
            return Ok(None);
        }
        let Some(item) = list.items.get(index) else {
            return Ok(None);
        };

        self.cancel_pending();
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.document.set_input_value(&self.inner.input_id, &item.display_name)?;
        self.inner.hide()?;
        *state = AutocompleteState::Idle;
        Ok(Some(item.display_name.clone()))
    }

    /// Hide the list when a click lands outside both the input and the list
    pub fn on_document_click(&self, target: &ClickTarget) -> Result<(), PageError> {
        let inside = match target {
            ClickTarget::Element(id) => *id == self.inner.input_id || *id == self.inner.list_id,
            ClickTarget::SuggestionItem { list_id, .. } => *list_id == self.inner.list_id,
            ClickTarget::Outside => false,
        };
        if inside {
            return Ok(());
        }

        let mut state = lock(&self.inner.state);
        self.inner.hide()?;
        if *state == AutocompleteState::ShowingSuggestions {
            *state = AutocompleteState::Idle;
        }
        Ok(())
    }

    fn cancel_pending(&self) {
        if let Some(handle) = lock(&self.inner.timer).take() {
            handle.abort();
        }
    }
}

impl Drop for AutocompleteController {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

impl Inner {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn hide(&self) -> Result<(), PageError> {
        self.document.update_suggestion_list(&self.list_id, |list| list.visible = false)
    }

    fn render(&self, teams: &[TeamSuggestion]) -> Result<(), PageError> {
        let items = teams
            .iter()
            .map(|team| SuggestionItem {
                display_name: team.display_name().to_string(),
                secondary: team.secondary_text(),
            })
            .collect();

        self.document.update_suggestion_list(&self.list_id, |list| {
            list.items = items;
            list.visible = true;
        })
    }

    // Generation checks and list updates happen under the state lock, so a
    // keystroke or selection cannot slip in between them.
    async fn fetch(self: Arc<Self>, generation: u64, query: String) {
        {
            let mut state = lock(&self.state);
            if !self.is_current(generation) {
                return;
            }
            *state = AutocompleteState::Fetching;
        }

        let result = self.search.search_teams(&query).await;

        let mut state = lock(&self.state);
        if !self.is_current(generation) {
            debug!("#{}: dropping stale suggestions for {:?}", self.input_id, query);
            return;
        }

        let shown = match result {
            Ok(teams) if !teams.is_empty() => self.render(&teams).map(|_| true),
            Ok(_) => self.hide().map(|_| false),
            Err(e) => {
                warn!("Failed to fetch team suggestions for {:?}: {}", query, e);
                self.hide().map(|_| false)
            }
        };

        *state = match shown {
            Ok(true) => AutocompleteState::ShowingSuggestions,
            Ok(false) => AutocompleteState::Idle,
            Err(e) => {
                warn!("#{}: could not update suggestions: {}", self.list_id, e);
                AutocompleteState::Idle
            }
        };
    }
}
