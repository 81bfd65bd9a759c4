//! Query executor
//!
//! Turns a stream of (debounced keyword, active flag, search type) inputs
//! into a single observable [`QuerySnapshot`]:
//! - A lookup is issued only for a non-blank keyword on an active surface
//! - Every issued lookup gets a fresh [`Generation`]; only the response that
//!   carries the current generation is ever applied
//! - Blank keyword or inactive surface drops to `Idle` synchronously and
//!   retires the current generation, so in-flight responses become inert
//!
//! Cancellation is logical. Superseded requests are left to finish over the
//! wire; their results are discarded on arrival.
//!
//! A consuming surface can also be tracked here ([`QueryExecutor::open_surface`],
//! [`QueryExecutor::close_surface`], [`QueryExecutor::settle_keyword`]) so that
//! a settled keyword and a concurrent close are ordered by the same lock.

use crate::client::BookLookup;
use crate::config::ShelfConfig;
use crate::error::LookupError;
use crate::types::{Book, Generation, QuerySnapshot, QueryStatus, SearchType};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

/// Executor counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutorStats {
    /// Lookups issued
    pub issued: u64,
    /// Responses applied to the snapshot
    pub applied: u64,
    /// Responses dropped for carrying a retired generation
    pub discarded: u64,
}

/// Request the current generation was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
struct IssuedRequest {
    keyword: String,
    search_type: SearchType,
}

#[derive(Debug)]
struct ExecState {
    keyword: String,
    active: bool,
    /// Consuming surface is open; a settled keyword activates only then
    surface_open: bool,
    search_type: SearchType,
    /// Last token handed out
    minted: Generation,
    /// Token whose response may still be applied
    current: Option<Generation>,
    issued: Option<IssuedRequest>,
    stats: ExecutorStats,
}

/// Shared between the executor handle and its lookup tasks
#[derive(Debug)]
struct Shared {
    state: Mutex<ExecState>,
    snapshots: watch::Sender<QuerySnapshot>,
}

impl Shared {
    /// Publish a snapshot, skipping no-op updates
    fn publish(&self, snapshot: QuerySnapshot) {
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

/// Single-session autocomplete query executor
///
/// All methods take `&self`; the executor can be shared behind an `Arc`.
/// Methods that may issue a lookup spawn onto the ambient Tokio runtime.
#[derive(Debug)]
pub struct QueryExecutor<L> {
    lookup: Arc<L>,
    shared: Arc<Shared>,
}

impl<L> QueryExecutor<L>
where
    L: BookLookup + 'static,
{
    /// Create executor over a lookup
    #[must_use]
    pub fn new(lookup: L, search_type: SearchType) -> Self {
        Self::from_shared(Arc::new(lookup), search_type)
    }

    /// Create executor over a shared lookup
    #[must_use]
    pub fn from_shared(lookup: Arc<L>, search_type: SearchType) -> Self {
        let (snapshots, _rx) = watch::channel(QuerySnapshot::default());
        Self {
            lookup,
            shared: Arc::new(Shared {
                state: Mutex::new(ExecState {
                    keyword: String::new(),
                    active: true,
                    surface_open: true,
                    search_type,
                    minted: Generation::default(),
                    current: None,
                    issued: None,
                    stats: ExecutorStats::default(),
                }),
                snapshots,
            }),
        }
    }

    /// Create executor using the configured search type
    #[must_use]
    pub fn with_config(lookup: L, config: &ShelfConfig) -> Self {
        Self::new(lookup, config.search_type)
    }

    /// Set the debounced keyword
    pub fn set_keyword(&self, keyword: impl Into<String>) {
        let mut state = self.shared.state.lock();
        state.keyword = keyword.into();
        self.reconcile(&mut state, false);
    }

    /// Set whether the consuming surface is visible
    pub fn set_active(&self, active: bool) {
        let mut state = self.shared.state.lock();
        state.active = active;
        self.reconcile(&mut state, false);
    }

    /// Set the search type
    pub fn set_search_type(&self, search_type: SearchType) {
        let mut state = self.shared.state.lock();
        state.search_type = search_type;
        self.reconcile(&mut state, false);
    }

    /// Set keyword and active flag together
    pub fn update(&self, keyword: impl Into<String>, active: bool) {
        let mut state = self.shared.state.lock();
        state.keyword = keyword.into();
        state.active = active;
        self.reconcile(&mut state, false);
    }

    /// Open the consuming surface
    ///
    /// With `activate` the executor goes active right away; otherwise it
    /// waits for the next [`settle_keyword`](Self::settle_keyword).
    pub fn open_surface(&self, activate: bool) {
        let mut state = self.shared.state.lock();
        state.surface_open = true;
        if activate {
            state.active = true;
        }
        self.reconcile(&mut state, false);
    }

    /// Close the consuming surface and go inactive
    pub fn close_surface(&self) {
        let mut state = self.shared.state.lock();
        state.surface_open = false;
        state.active = false;
        self.reconcile(&mut state, false);
    }

    /// Set a settled keyword, active only while the surface is open
    pub fn settle_keyword(&self, keyword: impl Into<String>) {
        let mut state = self.shared.state.lock();
        state.keyword = keyword.into();
        state.active = state.surface_open;
        self.reconcile(&mut state, false);
    }

    /// Check if the consuming surface is open
    #[must_use]
    pub fn is_surface_open(&self) -> bool {
        self.shared.state.lock().surface_open
    }

    /// Re-issue the current request even if it already has a result
    ///
    /// No-op while the trigger condition does not hold.
    pub fn refresh(&self) {
        let mut state = self.shared.state.lock();
        self.reconcile(&mut state, true);
    }

    /// Current snapshot
    #[must_use]
    pub fn snapshot(&self) -> QuerySnapshot {
        self.shared.snapshots.borrow().clone()
    }

    /// Subscribe to snapshot changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<QuerySnapshot> {
        self.shared.snapshots.subscribe()
    }

    /// Executor counters
    #[must_use]
    pub fn stats(&self) -> ExecutorStats {
        self.shared.state.lock().stats
    }

    /// Token whose response is currently accepted, if any
    #[must_use]
    pub fn current_generation(&self) -> Option<Generation> {
        self.shared.state.lock().current
    }

    /// Wait until the snapshot is no longer loading
    pub async fn settled(&self) -> QuerySnapshot {
        let mut rx = self.subscribe();
        loop {
            {
                let snapshot = rx.borrow_and_update();
                if !snapshot.is_loading() {
                    return snapshot.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }

    fn reconcile(&self, state: &mut ExecState, force: bool) {
        let keyword = state.keyword.trim().to_string();

        if keyword.is_empty() || !state.active {
            if let Some(retired) = state.current.take() {
                tracing::debug!(%retired, "retiring generation, surface idle");
            }
            state.issued = None;
            self.shared.publish(QuerySnapshot {
                generation: state.minted,
                keyword: state.keyword.clone(),
                status: QueryStatus::Idle,
            });
            return;
        }

        let request = IssuedRequest {
            keyword,
            search_type: state.search_type,
        };
        if !force && state.current.is_some() && state.issued.as_ref() == Some(&request) {
            return;
        }

        self.issue(state, request);
    }

    fn issue(&self, state: &mut ExecState, request: IssuedRequest) {
        let token = state.minted.next();
        state.minted = token;
        state.current = Some(token);
        state.issued = Some(request.clone());
        state.stats.issued += 1;

        tracing::info!(
            generation = %token,
            keyword = %request.keyword,
            search_type = %request.search_type,
            "issuing autocomplete lookup"
        );

        self.shared.publish(QuerySnapshot {
            generation: token,
            keyword: state.keyword.clone(),
            status: QueryStatus::Loading,
        });

        let lookup = Arc::clone(&self.lookup);
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let outcome = lookup.lookup(&request.keyword, request.search_type).await;
            apply(&shared, token, outcome);
        });
    }
}

/// Apply a finished lookup if its generation is still current
fn apply(shared: &Shared, token: Generation, outcome: Result<Vec<Book>, LookupError>) {
    let mut state = shared.state.lock();

    if state.current != Some(token) {
        state.stats.discarded += 1;
        tracing::debug!(generation = %token, "discarding stale autocomplete response");
        return;
    }

    let status = match outcome {
        Ok(books) => QueryStatus::Ready(books),
        Err(err) => {
            tracing::warn!(generation = %token, error = %err, "autocomplete lookup failed");
            QueryStatus::Failed(err.to_string())
        }
    };
    state.stats.applied += 1;
    tracing::debug!(
        generation = %token,
        status = status.label(),
        results = status_results(&status),
        "autocomplete response applied"
    );

    shared.publish(QuerySnapshot {
        generation: token,
        keyword: state.keyword.clone(),
        status,
    });
}

fn status_results(status: &QueryStatus) -> usize {
    match status {
        QueryStatus::Ready(books) => books.len(),
        _ => 0,
    }
}

impl<L> Drop for QueryExecutor<L> {
    fn drop(&mut self) {
        // In-flight tasks keep `shared` alive; make their results inert.
        self.shared.state.lock().current = None;
    }
}
