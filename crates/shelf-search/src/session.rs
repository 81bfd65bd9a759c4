//! Autocomplete session
//!
//! The search-box controller. Owns the raw keyword, the visibility of the
//! suggestion surface and the selected book, and wires a [`Debouncer`] into a
//! [`QueryExecutor`]:
//!
//! ```text
//! input() ─→ Debouncer ─(quiet period)─→ pump task ─→ QueryExecutor ─→ snapshots
//!    └─ visibility ─────────────────────────────────────┘ (synchronous)
//! ```
//!
//! Visibility lives in the executor's state, so a settled keyword and a
//! concurrent hide are ordered by one lock. Hiding reaches the executor
//! synchronously. Showing waits for the debounced keyword to catch up with
//! what was typed, so a keyword the user has already moved past is never
//! looked up.

use crate::client::{BookLookup, HttpBookLookup};
use crate::config::ShelfConfig;
use crate::debounce::Debouncer;
use crate::error::ShelfError;
use crate::executor::QueryExecutor;
use crate::types::{Book, QuerySnapshot, SearchType};
use crate::view::AutocompleteView;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Prompt shown when no book is selected
pub const DEFAULT_PLACEHOLDER: &str = "Search by book title";

/// What a submit resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A suggestion was picked before submitting
    Book(Book),
    /// Free-text search
    Keyword(String),
}

/// Search box with debounced autocomplete
#[derive(Debug)]
pub struct AutocompleteSession<L> {
    executor: Arc<QueryExecutor<L>>,
    debouncer: Debouncer<String>,
    pump: JoinHandle<()>,
    keyword: String,
    selected: Option<Book>,
}

impl<L> AutocompleteSession<L>
where
    L: BookLookup + 'static,
{
    /// Create session from configuration
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(lookup: L, config: &ShelfConfig) -> Self {
        let executor = Arc::new(QueryExecutor::with_config(lookup, config));
        executor.close_surface();

        let debouncer = Debouncer::new(String::new(), config.quiet_period());

        let mut settled = debouncer.subscribe();
        let pump_executor = Arc::clone(&executor);
        let pump = tokio::spawn(async move {
            while settled.changed().await.is_ok() {
                let keyword = settled.borrow_and_update().clone();
                tracing::debug!(%keyword, "keyword settled");
                pump_executor.settle_keyword(keyword);
            }
        });

        Self {
            executor,
            debouncer,
            pump,
            keyword: String::new(),
            selected: None,
        }
    }

    /// Keystroke: replace the keyword
    pub fn input(&mut self, keyword: impl Into<String>) {
        self.keyword = keyword.into();
        self.selected = None;
        self.debouncer.set(self.keyword.clone());

        if self.keyword.trim().is_empty() {
            self.hide();
        } else {
            self.show();
        }
    }

    /// Pick a suggestion
    ///
    /// The keyword becomes the book title and the surface closes.
    pub fn select(&mut self, book: Book) {
        tracing::info!(book_id = %book.id, title = %book.title, "suggestion selected");
        self.keyword = book.title.clone();
        self.debouncer.reset(self.keyword.clone());
        self.selected = Some(book);
        self.hide();
    }

    /// Pick the suggestion at `index` of the current results
    pub fn select_index(&mut self, index: usize) -> Option<Book> {
        let book = self.executor.snapshot().results().get(index).cloned()?;
        self.select(book.clone());
        Some(book)
    }

    /// Clear button: empty keyword, drop selection, close the surface
    pub fn clear(&mut self) {
        self.keyword.clear();
        self.selected = None;
        self.debouncer.reset(String::new());
        self.hide();
    }

    /// Input focus: reopen suggestions for a non-blank keyword
    pub fn focus(&mut self) {
        if !self.keyword.trim().is_empty() {
            self.show();
        }
    }

    /// Interaction outside the surface, or explicit close
    pub fn dismiss(&mut self) {
        self.hide();
    }

    /// Submit the form
    #[must_use = "the submission carries what to search for"]
    pub fn submit(&mut self) -> Submission {
        self.hide();
        match &self.selected {
            Some(book) => Submission::Book(book.clone()),
            None => Submission::Keyword(self.keyword.trim().to_string()),
        }
    }

    /// Change the field searched
    pub fn set_search_type(&mut self, search_type: SearchType) {
        self.executor.set_search_type(search_type);
    }

    /// Raw keyword as typed
    #[inline]
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Selected book, if any
    #[inline]
    #[must_use]
    pub fn selected(&self) -> Option<&Book> {
        self.selected.as_ref()
    }

    /// Whether the suggestion surface is open
    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.executor.is_surface_open()
    }

    /// Input placeholder
    #[must_use]
    pub fn placeholder(&self) -> &str {
        self.selected
            .as_ref()
            .map_or(DEFAULT_PLACEHOLDER, |book| book.title.as_str())
    }

    /// Check if typed input has not reached the executor yet
    #[must_use]
    pub fn is_debouncing(&self) -> bool {
        self.debouncer.is_pending() || !self.caught_up()
    }

    /// Current executor snapshot
    #[must_use]
    pub fn snapshot(&self) -> QuerySnapshot {
        self.executor.snapshot()
    }

    /// Subscribe to executor snapshots
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<QuerySnapshot> {
        self.executor.subscribe()
    }

    /// Underlying executor
    #[inline]
    #[must_use]
    pub fn executor(&self) -> &QueryExecutor<L> {
        &self.executor
    }

    /// Presenter view of the current state
    #[must_use]
    pub fn view(&self) -> AutocompleteView {
        let visible = self.is_visible() && !self.keyword.trim().is_empty();
        AutocompleteView::from_snapshot(&self.executor.snapshot(), visible, self.is_debouncing())
    }

    fn caught_up(&self) -> bool {
        self.debouncer.current().trim() == self.keyword.trim()
    }

    fn show(&mut self) {
        self.executor.open_surface(self.caught_up());
    }

    fn hide(&mut self) {
        self.executor.close_surface();
    }
}

impl AutocompleteSession<HttpBookLookup> {
    /// Validate `config` and open a session against the HTTP endpoint
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// - `ShelfError::Config` if the configuration is invalid
    /// - `ShelfError::Lookup` if the HTTP client cannot be built
    pub fn connect(config: &ShelfConfig) -> Result<Self, ShelfError> {
        config.validate()?;
        let lookup = HttpBookLookup::new(config)?;
        tracing::info!(endpoint = %lookup.endpoint(), quiet_ms = config.quiet_ms, "session connected");
        Ok(Self::new(lookup, config))
    }
}

impl<L> Drop for AutocompleteSession<L> {
    fn drop(&mut self) {
        self.pump.abort();
    }
}
