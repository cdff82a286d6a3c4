//! Watchlist store implementations.
//!
//! The watchlist is the sole source of training labels. The engine only ever
//! reads it, so the trait surface is two listing calls. Two implementations
//! are provided:
//!
//! - [`MySqlWatchlist`]: the production store, one `watchlist` table with
//!   `movie_id` and `rating` columns
//! - [`MemoryWatchlist`]: fixture store for tests and offline runs

use async_trait::async_trait;
use sqlx::mysql::MySqlPool;
use sqlx::Row;
use tracing::info;

use crate::error::{Result, StoreError};
use crate::types::{MovieId, WatchlistEntry};

/// Read-only access to the user's watchlist.
///
/// Implementations must tolerate an empty watchlist; callers decide whether
/// zero rows is an error for their operation.
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    /// All movie ids currently on the watchlist
    async fn movie_ids(&self) -> Result<Vec<MovieId>>;

    /// All watchlist rows with their (possibly missing) raw ratings.
    ///
    /// Rows with no rating ARE returned; dropping or imputing them is the
    /// rating normalizer's policy decision.
    async fn entries(&self) -> Result<Vec<WatchlistEntry>>;
}

/// MySQL-backed watchlist store.
#[derive(Clone)]
pub struct MySqlWatchlist {
    pool: MySqlPool,
}

impl MySqlWatchlist {
    /// Connect to the database and verify the pool is usable.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url).await?;
        info!("Connected to watchlist database");
        Ok(Self { pool })
    }

    /// Wrap an existing pool (e.g. one shared with other services).
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WatchlistStore for MySqlWatchlist {
    async fn movie_ids(&self) -> Result<Vec<MovieId>> {
        let rows = sqlx::query("SELECT movie_id FROM watchlist")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let id: i64 = row.try_get("movie_id")?;
                MovieId::try_from(id)
                    .map_err(|_| StoreError::InvalidRow(format!("movie_id {} out of range", id)))
            })
            .collect()
    }

    async fn entries(&self) -> Result<Vec<WatchlistEntry>> {
        let rows = sqlx::query("SELECT movie_id, rating FROM watchlist")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let id: i64 = row.try_get("movie_id")?;
                let rating: Option<f32> = row.try_get("rating")?;
                let movie_id = MovieId::try_from(id)
                    .map_err(|_| StoreError::InvalidRow(format!("movie_id {} out of range", id)))?;
                Ok(WatchlistEntry::new(movie_id, rating))
            })
            .collect()
    }
}

/// In-memory watchlist, used as a test fixture and for offline development.
#[derive(Debug, Clone, Default)]
pub struct MemoryWatchlist {
    entries: Vec<WatchlistEntry>,
}

impl MemoryWatchlist {
    pub fn new(entries: Vec<WatchlistEntry>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WatchlistStore for MemoryWatchlist {
    async fn movie_ids(&self) -> Result<Vec<MovieId>> {
        Ok(self.entries.iter().map(|e| e.movie_id).collect())
    }

    async fn entries(&self) -> Result<Vec<WatchlistEntry>> {
        Ok(self.entries.clone())
    }
}
