//! TMDB (The Movie Database) v3 client.
//!
//! Every wire field is optional or defaulted: the service renders whatever the
//! upstream returns and never fails decoding on a missing field.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::AppConfig;

const LANGUAGE: &str = "en-US";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<MovieSummary>,
}

/// One entry of `/search/movie`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MovieSummary {
    #[serde(default)]
    pub id: u64,
    pub title: Option<String>,
    pub release_date: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MovieDetails {
    pub title: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub overview: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Genre {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CastMember {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CrewMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub job: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReviewPage {
    #[serde(default)]
    pub results: Vec<Review>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Review {
    pub author: Option<String>,
    pub content: Option<String>,
    pub author_details: Option<AuthorDetails>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthorDetails {
    pub rating: Option<f64>,
}

impl Review {
    pub fn rating(&self) -> Option<f64> {
        self.author_details.as_ref().and_then(|d| d.rating)
    }
}

// ============================================================================
// Catalog abstraction
// ============================================================================

/// The upstream movie catalog. Calls are independent; callers sequence them.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn search_movies(&self, query: &str) -> Result<Vec<MovieSummary>>;
    async fn movie_details(&self, movie_id: u64) -> Result<MovieDetails>;
    async fn movie_credits(&self, movie_id: u64) -> Result<Credits>;
    /// One 1-based page of reviews. An empty list means there are no more pages.
    async fn movie_reviews(&self, movie_id: u64, page: u32) -> Result<Vec<Review>>;
}

pub struct TmdbClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl TmdbClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            api_key: config.tmdb_api_key.clone(),
            base_url: config.tmdb_base_url.clone(),
            client: reqwest::Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let mut query: Vec<(&str, &str)> = vec![("api_key", self.api_key.as_str())];
        query.extend(params.iter().map(|(k, v)| (*k, v.as_str())));

        let url = format!("{}{}", self.base_url, path);
        debug!(path = %path, "TMDB request");

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("TMDB request to {} failed", path))?
            .error_for_status()
            .with_context(|| format!("TMDB returned an error for {}", path))?;

        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode TMDB response for {}", path))
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn search_movies(&self, query: &str) -> Result<Vec<MovieSummary>> {
        let response: SearchResponse = self
            .get_json("/search/movie", &[("query", query.to_string())])
            .await?;
        Ok(response.results)
    }

    async fn movie_details(&self, movie_id: u64) -> Result<MovieDetails> {
        self.get_json(
            &format!("/movie/{}", movie_id),
            &[("language", LANGUAGE.to_string())],
        )
        .await
    }

    async fn movie_credits(&self, movie_id: u64) -> Result<Credits> {
        self.get_json(&format!("/movie/{}/credits", movie_id), &[]).await
    }

    async fn movie_reviews(&self, movie_id: u64, page: u32) -> Result<Vec<Review>> {
        debug!(movie_id, page, "fetching review page");
        let response: ReviewPage = self
            .get_json(
                &format!("/movie/{}/reviews", movie_id),
                &[("language", LANGUAGE.to_string()), ("page", page.to_string())],
            )
            .await?;
        Ok(response.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_tolerates_missing_fields() {
        let json = r#"{"page":1,"results":[
            {"id": 27205, "title": "Inception", "release_date": "2010-07-15"},
            {"id": 1}
        ]}"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].title.as_deref(), Some("Inception"));
        assert!(parsed.results[1].title.is_none());
        assert!(parsed.results[1].release_date.is_none());
    }

    #[test]
    fn test_review_rating_is_nested_and_optional() {
        let json = r#"{"results":[
            {"author":"a","content":"c","author_details":{"rating":8.0}},
            {"author":"b","content":"d","author_details":{"rating":null}},
            {"content":"e"}
        ]}"#;
        let page: ReviewPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.results[0].rating(), Some(8.0));
        assert_eq!(page.results[1].rating(), None);
        assert_eq!(page.results[2].rating(), None);
        assert!(page.results[2].author.is_none());
    }

    #[test]
    fn test_missing_results_key_is_an_empty_page() {
        let page: ReviewPage = serde_json::from_str(r#"{"page": 6}"#).unwrap();
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_details_and_credits_decode() {
        let details: MovieDetails = serde_json::from_str(
            r#"{"title":"Inception","poster_path":"/p.jpg","vote_average":8.4,"runtime":148,
               "genres":[{"id":28,"name":"Action"}],"overview":"Dreams."}"#,
        )
        .unwrap();
        assert_eq!(details.runtime, Some(148));
        assert_eq!(details.genres[0].name, "Action");

        let credits: Credits = serde_json::from_str(
            r#"{"cast":[{"name":"Leonardo DiCaprio"}],"crew":[{"name":"Christopher Nolan","job":"Director"}]}"#,
        )
        .unwrap();
        assert_eq!(credits.crew[0].job, "Director");
    }

    use crate::test_support::spawn_stub;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    type Params = Query<HashMap<String, String>>;

    /// Echoes the received query parameters back so tests can inspect them.
    fn echo(params: &HashMap<String, String>) -> String {
        let get = |k: &str| params.get(k).cloned().unwrap_or_else(|| "-".to_string());
        format!("{}|{}|{}|{}", get("api_key"), get("language"), get("page"), get("query"))
    }

    async fn stub_search(Query(params): Params) -> Json<Value> {
        Json(json!({ "results": [{ "id": 1, "title": echo(&params) }] }))
    }

    async fn stub_details(Path(id): Path<u64>, Query(params): Params) -> Result<Json<Value>, StatusCode> {
        if id == 500 {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Ok(Json(json!({ "title": echo(&params), "runtime": id })))
    }

    async fn stub_credits(Path(_id): Path<u64>, Query(params): Params) -> Json<Value> {
        Json(json!({ "cast": [{ "name": echo(&params) }], "crew": [] }))
    }

    async fn stub_reviews(Path(id): Path<u64>, Query(params): Params) -> Json<Value> {
        Json(json!({ "id": id, "results": [{ "author": "stub", "content": echo(&params) }] }))
    }

    async fn tmdb_stub() -> TmdbClient {
        let app = Router::new()
            .route("/search/movie", get(stub_search))
            .route("/movie/:id", get(stub_details))
            .route("/movie/:id/credits", get(stub_credits))
            .route("/movie/:id/reviews", get(stub_reviews));
        let base = spawn_stub(app).await;

        let config = AppConfig::from_lookup(|key| match key {
            "TMDB_API_KEY" => Some("KEY".to_string()),
            "TMDB_BASE_URL" => Some(base.clone()),
            _ => None,
        })
        .unwrap();
        TmdbClient::new(&config)
    }

    #[tokio::test]
    async fn test_search_sends_api_key_and_query() {
        let client = tmdb_stub().await;
        let results = client.search_movies("Inception").await.unwrap();
        assert_eq!(results[0].title.as_deref(), Some("KEY|-|-|Inception"));
    }

    #[tokio::test]
    async fn test_details_send_language() {
        let client = tmdb_stub().await;
        let details = client.movie_details(8).await.unwrap();
        assert_eq!(details.title.as_deref(), Some("KEY|en-US|-|-"));
        assert_eq!(details.runtime, Some(8));
    }

    #[tokio::test]
    async fn test_credits_send_only_api_key() {
        let client = tmdb_stub().await;
        let credits = client.movie_credits(8).await.unwrap();
        assert_eq!(credits.cast[0].name, "KEY|-|-|-");
    }

    #[tokio::test]
    async fn test_reviews_send_language_and_page() {
        let client = tmdb_stub().await;
        let reviews = client.movie_reviews(7, 3).await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].content.as_deref(), Some("KEY|en-US|3|-"));
    }

    #[tokio::test]
    async fn test_upstream_error_status_is_an_error() {
        let client = tmdb_stub().await;
        assert!(client.movie_details(500).await.is_err());
    }
}
