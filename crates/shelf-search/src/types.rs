//! Core types for shelf search
//!
//! Defines the fundamental types for the autocomplete pipeline:
//! - Book records returned by the endpoint
//! - Search type (category filter)
//! - Query generation tokens
//! - Query status and snapshots

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique book identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub u64);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single autocomplete result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Identifier
    pub id: BookId,
    /// Display title
    pub title: String,
    /// Secondary label
    pub author: String,
    /// Thumbnail reference
    #[serde(default)]
    pub cover_image: String,
    /// Price in the smallest display unit (KRW)
    pub price: u64,
}

impl Book {
    /// Create new book record
    #[must_use]
    pub fn new(id: u64, title: impl Into<String>, author: impl Into<String>, price: u64) -> Self {
        Self {
            id: BookId(id),
            title: title.into(),
            author: author.into(),
            cover_image: String::new(),
            price,
        }
    }

    /// With cover image
    #[inline]
    #[must_use]
    pub fn with_cover_image(mut self, cover_image: impl Into<String>) -> Self {
        self.cover_image = cover_image.into();
        self
    }
}

/// Field the endpoint matches the keyword against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Match titles
    #[default]
    Title,
    /// Match author names
    Author,
}

impl SearchType {
    /// Query parameter value
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Title => "title",
            SearchType::Author => "author",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(SearchType::Title),
            "author" => Ok(SearchType::Author),
            other => Err(format!("unknown search type: {other}")),
        }
    }
}

/// Query generation token
///
/// Minted once per started lookup; strictly increasing within one executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl Generation {
    /// Token following this one
    #[inline]
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Lifecycle of the autocomplete query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueryStatus {
    /// Nothing searched, or keyword empty / surface inactive
    #[default]
    Idle,
    /// Lookup in flight
    Loading,
    /// Current lookup succeeded; results in endpoint rank order
    Ready(Vec<Book>),
    /// Current lookup failed
    Failed(String),
}

impl QueryStatus {
    /// Check if idle
    #[inline]
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Check if loading
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Short label for logs
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

/// Immutable view of the executor state
///
/// This is all the presenter gets to see.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuerySnapshot {
    /// Generation the status belongs to
    pub generation: Generation,
    /// Keyword the status was produced for (untrimmed)
    pub keyword: String,
    /// Current status
    pub status: QueryStatus,
}

impl QuerySnapshot {
    /// Results of the current lookup, empty unless ready
    #[must_use]
    pub fn results(&self) -> &[Book] {
        match &self.status {
            QueryStatus::Ready(books) => books,
            _ => &[],
        }
    }

    /// Failure reason, if any
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            QueryStatus::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Check if a lookup is in flight
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn book_deserializes_camel_case() {
        let json = r#"{"id":7,"title":"Dune","author":"Herbert","coverImage":"/c/7.jpg","price":15000}"#;
        let book: Book = serde_json::from_str(json).unwrap();

        assert_eq!(
            book,
            Book::new(7, "Dune", "Herbert", 15000).with_cover_image("/c/7.jpg")
        );
    }

    #[test]
    fn book_cover_image_optional() {
        let json = r#"{"id":1,"title":"a","author":"b","price":0}"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert!(book.cover_image.is_empty());
    }

    #[test]
    fn search_type_parse() {
        assert_eq!("title".parse::<SearchType>(), Ok(SearchType::Title));
        assert_eq!(" Author ".parse::<SearchType>(), Ok(SearchType::Author));
        assert!("isbn".parse::<SearchType>().is_err());
        assert_eq!(SearchType::default().as_str(), "title");
    }

    #[test]
    fn generation_is_monotonic() {
        let g = Generation::default();
        assert!(g.next() > g);
        assert_eq!(g.next().next(), Generation(2));
    }

    #[test]
    fn snapshot_accessors() {
        let books = vec![Book::new(1, "a", "b", 100)];
        let ready = QuerySnapshot {
            generation: Generation(1),
            keyword: "a".into(),
            status: QueryStatus::Ready(books.clone()),
        };
        assert_eq!(ready.results(), books.as_slice());
        assert_eq!(ready.error(), None);

        let failed = QuerySnapshot {
            status: QueryStatus::Failed("boom".into()),
            ..ready
        };
        assert!(failed.results().is_empty());
        assert_eq!(failed.error(), Some("boom"));
    }
}
