//! HTTP client for the TMDB API.
//!
//! Maps the wire-level movie details + credits payloads into the engine's
//! [`MovieMetadata`] snapshot, and now-playing pages into [`MovieStub`]s.

use async_trait::async_trait;
use catalog::{MovieId, MovieMetadata, MovieStub};
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use crate::provider::{MetadataProvider, ProviderError, Result};

/// Per-request timeout; a stalled metadata call must not hang a whole batch.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Only the top-billed cast enters the actor vocabulary. Deep cast lists add
/// thousands of near-unique names with no rating signal behind them.
const MAX_BILLED_CAST: usize = 10;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiGenre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiCast {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiCrew {
    name: String,
    job: String,
}

#[derive(Debug, Deserialize)]
struct ApiCredits {
    #[serde(default)]
    cast: Vec<ApiCast>,
    #[serde(default)]
    crew: Vec<ApiCrew>,
}

#[derive(Debug, Deserialize)]
struct ApiMovieDetails {
    #[serde(default)]
    genres: Vec<ApiGenre>,
    runtime: Option<u32>,
    popularity: Option<f32>,
    vote_average: Option<f32>,
    release_date: Option<String>,
    credits: Option<ApiCredits>,
}

#[derive(Debug, Deserialize)]
struct ApiListingEntry {
    id: MovieId,
    title: String,
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiListing {
    #[serde(default)]
    results: Vec<ApiListingEntry>,
}

impl ApiMovieDetails {
    fn into_metadata(self) -> MovieMetadata {
        let (actors, directors) = match self.credits {
            Some(credits) => {
                let actors = credits
                    .cast
                    .into_iter()
                    .take(MAX_BILLED_CAST)
                    .map(|c| c.name)
                    .collect();
                let directors = credits
                    .crew
                    .into_iter()
                    .filter(|c| c.job == "Director")
                    .map(|c| c.name)
                    .collect();
                (actors, directors)
            }
            None => (Vec::new(), Vec::new()),
        };

        MovieMetadata {
            genres: self.genres.into_iter().map(|g| g.name).collect(),
            actors,
            directors,
            release_year: parse_release_year(self.release_date.as_deref()),
            duration: self.runtime,
            popularity: self.popularity,
            average_rating: self.vote_average,
        }
    }
}

/// Extract the year from a `YYYY-MM-DD` release date.
fn parse_release_year(release_date: Option<&str>) -> Option<i32> {
    release_date?.get(..4)?.parse().ok()
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the TMDB HTTP API.
#[derive(Clone)]
pub struct TmdbClient {
    http: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbClient {
    /// Create a client for the given API key and base URL
    /// (e.g. "https://api.themoviedb.org/3").
    pub fn new(api_key: impl Into<String>, api_url: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            api_url: api_url.into(),
        })
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn fetch_metadata(&self, movie_id: MovieId) -> Result<Option<MovieMetadata>> {
        let url = format!("{}/movie/{}", self.api_url, movie_id);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("append_to_response", "credits"),
            ])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, message });
        }

        let details: ApiMovieDetails = response.json().await?;
        Ok(Some(details.into_metadata()))
    }

    async fn fetch_new_releases(&self, page: u32) -> Result<Vec<MovieStub>> {
        let url = format!("{}/movie/now_playing", self.api_url);
        let page = page.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("page", page.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, message });
        }

        let listing: ApiListing = response.json().await?;
        let stubs: Vec<MovieStub> = listing
            .results
            .into_iter()
            .map(|entry| MovieStub {
                id: entry.id,
                title: entry.title,
                release_date: entry.release_date,
            })
            .collect();

        info!(page, results = stubs.len(), "Fetched new-release page");
        Ok(stubs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_payload_maps_to_metadata() {
        let payload = serde_json::json!({
            "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
            "runtime": 136,
            "popularity": 83.5,
            "vote_average": 8.2,
            "release_date": "1999-03-30",
            "credits": {
                "cast": [
                    {"name": "Keanu Reeves", "order": 0},
                    {"name": "Carrie-Anne Moss", "order": 1}
                ],
                "crew": [
                    {"name": "Lana Wachowski", "job": "Director"},
                    {"name": "Bill Pope", "job": "Director of Photography"}
                ]
            }
        });

        let details: ApiMovieDetails = serde_json::from_value(payload).unwrap();
        let meta = details.into_metadata();

        assert_eq!(meta.genres, vec!["Action", "Science Fiction"]);
        assert_eq!(meta.actors, vec!["Keanu Reeves", "Carrie-Anne Moss"]);
        assert_eq!(meta.directors, vec!["Lana Wachowski"]);
        assert_eq!(meta.release_year, Some(1999));
        assert_eq!(meta.duration, Some(136));
        assert_eq!(meta.average_rating, Some(8.2));
    }

    #[test]
    fn test_sparse_details_payload_maps_to_defaults() {
        let payload = serde_json::json!({
            "runtime": null,
            "release_date": null
        });

        let details: ApiMovieDetails = serde_json::from_value(payload).unwrap();
        let meta = details.into_metadata();

        assert!(meta.genres.is_empty());
        assert!(meta.actors.is_empty());
        assert!(meta.directors.is_empty());
        assert_eq!(meta.release_year, None);
        assert_eq!(meta.duration, None);
    }

    #[test]
    fn test_cast_is_capped_to_top_billing() {
        let cast: Vec<_> = (0..25)
            .map(|i| serde_json::json!({"name": format!("Actor {}", i)}))
            .collect();
        let payload = serde_json::json!({
            "credits": {"cast": cast, "crew": []}
        });

        let details: ApiMovieDetails = serde_json::from_value(payload).unwrap();
        let meta = details.into_metadata();
        assert_eq!(meta.actors.len(), MAX_BILLED_CAST);
    }

    #[test]
    fn test_release_year_parsing() {
        assert_eq!(parse_release_year(Some("2024-11-02")), Some(2024));
        assert_eq!(parse_release_year(Some("")), None);
        assert_eq!(parse_release_year(Some("soon")), None);
        assert_eq!(parse_release_year(None), None);
    }

    #[test]
    fn test_listing_payload_maps_to_stubs() {
        let payload = serde_json::json!({
            "page": 1,
            "results": [
                {"id": 603, "title": "The Matrix", "release_date": "1999-03-30"},
                {"id": 604, "title": "The Matrix Reloaded", "release_date": null}
            ]
        });

        let listing: ApiListing = serde_json::from_value(payload).unwrap();
        assert_eq!(listing.results.len(), 2);
        assert_eq!(listing.results[0].id, 603);
        assert_eq!(listing.results[1].release_date, None);
    }
}
