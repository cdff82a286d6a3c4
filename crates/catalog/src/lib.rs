//! # Catalog Crate
//!
//! Domain types and watchlist storage for the movie suggestion engine.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (WatchlistEntry, MovieMetadata, MovieStub)
//! - **store**: The WatchlistStore trait with MySQL and in-memory backends
//! - **error**: Error types for store access
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{MemoryWatchlist, WatchlistEntry, WatchlistStore};
//!
//! let store = MemoryWatchlist::new(vec![
//!     WatchlistEntry::new(603, Some(5.0)),
//!     WatchlistEntry::new(604, None),
//! ]);
//!
//! let entries = store.entries().await?;
//! println!("{} movies on the watchlist", entries.len());
//! ```

// Public modules
pub mod error;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use error::StoreError;
pub use store::{MemoryWatchlist, MySqlWatchlist, WatchlistStore};
pub use types::{MovieId, MovieMetadata, MovieStub, WatchlistEntry, SINGLE_USER_ID};
