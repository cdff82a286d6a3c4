//! # TMDB Crate
//!
//! External movie-metadata provider for the suggestion engine.
//!
//! ## Components
//!
//! - **provider**: the [`MetadataProvider`] trait the rest of the engine
//!   programs against, plus [`ProviderError`]
//! - **client**: [`TmdbClient`], the HTTP implementation (details + credits
//!   lookups, now-playing listings)
//! - **memory**: [`MemoryMetadataProvider`] fixture for tests and offline use
//!
//! ## Example Usage
//!
//! ```ignore
//! use tmdb::{MetadataProvider, TmdbClient};
//!
//! let client = TmdbClient::new(api_key, "https://api.themoviedb.org/3")?;
//! if let Some(meta) = client.fetch_metadata(603).await? {
//!     println!("genres: {:?}", meta.genres);
//! }
//! ```

pub mod client;
pub mod memory;
pub mod provider;

// Re-export main types
pub use client::TmdbClient;
pub use memory::MemoryMetadataProvider;
pub use provider::{MetadataProvider, ProviderError};
