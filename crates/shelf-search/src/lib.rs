//! Shelf Search - debounced book autocomplete
//!
//! The search pipeline behind the storefront's search box:
//! - Debounces keystrokes until the keyword is stable
//! - Issues one lookup per settled keyword against the autocomplete endpoint
//! - Tags every lookup with a generation and drops responses for keywords
//!   the user has already moved past
//! - Presents the result as Idle / Loading / Ready / Failed
//!
//! # Architecture
//!
//! ```text
//! keystrokes → AutocompleteSession → Debouncer → QueryExecutor → BookLookup (HTTP)
//!                                                     │
//!                                              QuerySnapshot → AutocompleteView
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use shelf_search::{AutocompleteSession, HttpBookLookup, ShelfConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ShelfConfig::new().with_env_overrides();
//! let lookup = HttpBookLookup::new(&config)?;
//! let mut session = AutocompleteSession::new(lookup, &config);
//!
//! session.input("harry");
//! let snapshot = session.executor().settled().await;
//! println!("{} suggestions", snapshot.results().len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod executor;
pub mod session;
pub mod types;
pub mod view;

// Re-exports for convenience
pub use client::{BookLookup, HttpBookLookup};
pub use config::ShelfConfig;
pub use debounce::Debouncer;
pub use error::{ConfigError, LookupError, ShelfError};
pub use executor::{ExecutorStats, QueryExecutor};
pub use session::{AutocompleteSession, Submission};
pub use types::{Book, BookId, Generation, QuerySnapshot, QueryStatus, SearchType};
pub use view::{format_price, AutocompleteView, BookRow};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with shelf search
    pub use crate::{
        AutocompleteSession, AutocompleteView, Book, BookLookup, HttpBookLookup, LookupError,
        QueryExecutor, QuerySnapshot, QueryStatus, SearchType, ShelfConfig, Submission,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
