//! Testing utilities for the shelf workspace
//!
//! Shared test helpers, fixtures, and a scripted lookup whose latency is
//! driven by the Tokio clock, so tests can pause time and reorder responses
//! deterministically.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use shelf_search::{Book, BookLookup, LookupError, SearchType, ShelfConfig};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Canned lookup outcome
#[derive(Debug, Clone)]
pub enum Scripted {
    Books(Vec<Book>),
    Status(u16),
    Transport(String),
    Malformed(String),
}

impl Scripted {
    fn to_result(&self) -> Result<Vec<Book>, LookupError> {
        match self {
            Scripted::Books(books) => Ok(books.clone()),
            Scripted::Status(status) => Err(LookupError::Status { status: *status }),
            Scripted::Transport(msg) => Err(LookupError::Transport(msg.clone())),
            Scripted::Malformed(msg) => Err(LookupError::Decode(msg.clone())),
        }
    }
}

/// Recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupCall {
    pub keyword: String,
    pub search_type: SearchType,
    pub started_at: Instant,
}

/// Lookup answering from a per-keyword script
///
/// Unscripted keywords resolve immediately with no books.
#[derive(Debug, Default)]
pub struct ScriptedLookup {
    script: HashMap<String, (Duration, Scripted)>,
    calls: Mutex<Vec<LookupCall>>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `keyword` with `books` after `delay_ms`
    pub fn books(self, keyword: &str, delay_ms: u64, books: Vec<Book>) -> Self {
        self.respond(keyword, delay_ms, Scripted::Books(books))
    }

    /// Answer `keyword` with `outcome` after `delay_ms`
    pub fn respond(mut self, keyword: &str, delay_ms: u64, outcome: Scripted) -> Self {
        self.script
            .insert(keyword.to_string(), (Duration::from_millis(delay_ms), outcome));
        self
    }

    pub fn calls(&self) -> Vec<LookupCall> {
        self.calls.lock().clone()
    }

    pub fn keywords(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.keyword.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl BookLookup for ScriptedLookup {
    async fn lookup(
        &self,
        keyword: &str,
        search_type: SearchType,
    ) -> Result<Vec<Book>, LookupError> {
        self.calls.lock().push(LookupCall {
            keyword: keyword.to_string(),
            search_type,
            started_at: Instant::now(),
        });

        let (delay, outcome) = self
            .script
            .get(keyword)
            .cloned()
            .unwrap_or((Duration::ZERO, Scripted::Books(Vec::new())));
        tokio::time::sleep(delay).await;
        outcome.to_result()
    }
}

pub fn book(id: u64, title: &str, price: u64) -> Book {
    Book::new(id, title, "Test Author", price).with_cover_image(format!("/covers/{id}.jpg"))
}

/// `count` books titled after `keyword`, in rank order
pub fn books_for(keyword: &str, count: u64) -> Vec<Book> {
    (1..=count)
        .map(|i| book(i, &format!("{keyword} vol. {i}"), 10_000 + i * 500))
        .collect()
}

pub fn harry_potter_books() -> Vec<Book> {
    vec![
        Book::new(101, "Harry Potter and the Philosopher's Stone", "J.K. Rowling", 12_600),
        Book::new(102, "Harry Potter and the Chamber of Secrets", "J.K. Rowling", 13_500),
        Book::new(103, "Harry Potter and the Prisoner of Azkaban", "J.K. Rowling", 14_400),
    ]
}

/// Default config with the given quiet period
pub fn test_config(quiet_ms: u64) -> ShelfConfig {
    ShelfConfig::new()
        .with_base_url("http://127.0.0.1:1/")
        .with_quiet_ms(quiet_ms)
}
