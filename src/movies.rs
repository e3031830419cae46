//! Movie search and detail assembly on top of the catalog.

use anyhow::{Context, Result};

use crate::tmdb::{Credits, MovieCatalog, MovieDetails, MovieSummary};

/// Number of search hits shown to the user.
pub const SEARCH_LIMIT: usize = 3;
/// Number of billed cast members listed on the detail card.
pub const CAST_LIMIT: usize = 3;
const POSTER_SIZE: &str = "w500";
const UNKNOWN_DIRECTOR: &str = "Unknown";
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub id: u64,
    /// Four-digit release year, or "N/A".
    pub year: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetail {
    pub title: String,
    /// Empty when the movie has no poster.
    pub poster_url: String,
    pub vote_average: Option<f64>,
    pub runtime: Option<u32>,
    pub genres: String,
    pub director: String,
    pub overview: String,
    pub cast: String,
}

/// Queries the catalog and keeps the provider's first [`SEARCH_LIMIT`] hits in order.
pub async fn search(catalog: &dyn MovieCatalog, query: &str) -> Result<Vec<SearchResult>> {
    let results = catalog
        .search_movies(query)
        .await
        .context("movie search failed")?;

    Ok(results
        .into_iter()
        .take(SEARCH_LIMIT)
        .map(SearchResult::from)
        .collect())
}

impl From<MovieSummary> for SearchResult {
    fn from(summary: MovieSummary) -> Self {
        Self {
            title: summary.title.unwrap_or_default(),
            id: summary.id,
            year: release_year(summary.release_date.as_deref()),
        }
    }
}

/// An empty `release_date` is treated the same as a missing one and yields "N/A",
/// not an empty year.
fn release_year(release_date: Option<&str>) -> String {
    match release_date {
        Some(date) if !date.is_empty() => date.chars().take(4).collect(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Fetches metadata then credits, one after the other.
pub async fn fetch_detail(
    catalog: &dyn MovieCatalog,
    image_base_url: &str,
    movie_id: u64,
) -> Result<MovieDetail> {
    let details = catalog
        .movie_details(movie_id)
        .await
        .with_context(|| format!("failed to fetch metadata for movie {}", movie_id))?;
    let credits = catalog
        .movie_credits(movie_id)
        .await
        .with_context(|| format!("failed to fetch credits for movie {}", movie_id))?;

    Ok(build_detail(details, credits, image_base_url))
}

pub fn build_detail(details: MovieDetails, credits: Credits, image_base_url: &str) -> MovieDetail {
    let poster_url = match details.poster_path.as_deref() {
        Some(path) if !path.is_empty() => format!("{}/{}{}", image_base_url, POSTER_SIZE, path),
        _ => String::new(),
    };

    let genres = details
        .genres
        .iter()
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    // Exact, case-sensitive match; "Co-Director" and "director" don't count.
    let director = credits
        .crew
        .iter()
        .find(|member| member.job == "Director")
        .map(|member| member.name.clone())
        .unwrap_or_else(|| UNKNOWN_DIRECTOR.to_string());

    let cast = credits
        .cast
        .iter()
        .take(CAST_LIMIT)
        .map(|member| member.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    MovieDetail {
        title: details.title.unwrap_or_default(),
        poster_url,
        vote_average: details.vote_average,
        runtime: details.runtime,
        genres,
        director,
        overview: details.overview.unwrap_or_default(),
        cast,
    }
}
