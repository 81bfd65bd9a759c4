//! Autocomplete presenter
//!
//! Maps a [`QuerySnapshot`] onto what the suggestion surface should show.

use crate::types::{Book, BookId, QuerySnapshot, QueryStatus};
use std::fmt::Write as _;

/// Currency suffix appended to prices
pub const PRICE_SUFFIX: &str = "원";

/// One suggestion line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRow {
    /// Book identifier
    pub id: BookId,
    /// Display title
    pub title: String,
    /// Author name
    pub author: String,
    /// Cover image reference, empty when absent
    pub cover_image: String,
    /// Formatted with [`format_price`]
    pub price: String,
}

impl From<&Book> for BookRow {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            cover_image: book.cover_image.clone(),
            price: format_price(book.price),
        }
    }
}

/// What the suggestion surface renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutocompleteView {
    /// Surface closed or keyword blank
    Hidden,
    /// Lookup in flight, or keystrokes still settling
    Searching,
    /// Lookup returned no books
    Empty,
    /// Lookup failed; carries the reason
    Error(String),
    /// Suggestions in endpoint order
    Results(Vec<BookRow>),
}

impl AutocompleteView {
    /// Build the view
    ///
    /// `visible` is the surface state; `debouncing` reports typed input that
    /// has not reached the executor yet, which reads as searching.
    #[must_use]
    pub fn from_snapshot(snapshot: &QuerySnapshot, visible: bool, debouncing: bool) -> Self {
        if !visible {
            return Self::Hidden;
        }
        if debouncing {
            return Self::Searching;
        }
        match &snapshot.status {
            QueryStatus::Idle => Self::Hidden,
            QueryStatus::Loading => Self::Searching,
            QueryStatus::Ready(books) if books.is_empty() => Self::Empty,
            QueryStatus::Ready(books) => Self::Results(books.iter().map(BookRow::from).collect()),
            QueryStatus::Failed(reason) => Self::Error(reason.clone()),
        }
    }

    /// Check if anything is drawn
    #[inline]
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }

    /// Plain-text rendering, one suggestion per line
    #[must_use]
    pub fn render_text(&self) -> String {
        match self {
            Self::Hidden => String::new(),
            Self::Searching => "Searching...".to_string(),
            Self::Empty => "No results.".to_string(),
            Self::Error(reason) => format!("Search failed: {reason}"),
            Self::Results(rows) => {
                let mut out = String::new();
                for (idx, row) in rows.iter().enumerate() {
                    if idx > 0 {
                        out.push('\n');
                    }
                    let _ = write!(out, "{:>2}. {} ({}) {}", idx + 1, row.title, row.author, row.price);
                }
                out
            }
        }
    }
}

/// Format a price with thousands separators and the currency suffix
///
/// `12000` → `12,000원`
#[must_use]
pub fn format_price(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + PRICE_SUFFIX.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push_str(PRICE_SUFFIX);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Generation;
    use pretty_assertions::assert_eq;

    fn snapshot(status: QueryStatus) -> QuerySnapshot {
        QuerySnapshot {
            generation: Generation(1),
            keyword: "harry".to_string(),
            status,
        }
    }

    #[test]
    fn format_price_groups_thousands() {
        assert_eq!(format_price(0), "0원");
        assert_eq!(format_price(999), "999원");
        assert_eq!(format_price(1000), "1,000원");
        assert_eq!(format_price(12000), "12,000원");
        assert_eq!(format_price(1_234_567), "1,234,567원");
    }

    #[test]
    fn hidden_when_not_visible() {
        let view = AutocompleteView::from_snapshot(&snapshot(QueryStatus::Loading), false, true);
        assert!(view.is_hidden());
        assert_eq!(view.render_text(), "");
    }

    #[test]
    fn debouncing_reads_as_searching() {
        let view = AutocompleteView::from_snapshot(&snapshot(QueryStatus::Idle), true, true);
        assert_eq!(view, AutocompleteView::Searching);
    }

    #[test]
    fn maps_each_status() {
        assert_eq!(
            AutocompleteView::from_snapshot(&snapshot(QueryStatus::Idle), true, false),
            AutocompleteView::Hidden
        );
        assert_eq!(
            AutocompleteView::from_snapshot(&snapshot(QueryStatus::Ready(vec![])), true, false),
            AutocompleteView::Empty
        );
        assert_eq!(
            AutocompleteView::from_snapshot(
                &snapshot(QueryStatus::Failed("endpoint returned status 500".into())),
                true,
                false
            )
            .render_text(),
            "Search failed: endpoint returned status 500"
        );
    }

    #[test]
    fn renders_results_in_order() {
        let books = vec![
            Book::new(2, "Dune", "Herbert", 15000),
            Book::new(1, "Emma", "Austen", 8000),
        ];
        let view = AutocompleteView::from_snapshot(&snapshot(QueryStatus::Ready(books)), true, false);

        assert_eq!(
            view.render_text(),
            " 1. Dune (Herbert) 15,000원\n 2. Emma (Austen) 8,000원"
        );
    }
}
