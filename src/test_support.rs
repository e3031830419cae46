//! In-memory catalog and classifier used by unit and router tests.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Mutex;

use crate::ml::SentimentClassifier;
use crate::tmdb::{
    AuthorDetails, CastMember, Credits, CrewMember, Genre, MovieCatalog, MovieDetails,
    MovieSummary, Review,
};

#[derive(Default)]
pub struct FakeCatalog {
    pub search_results: Vec<MovieSummary>,
    pub details: MovieDetails,
    pub credits: Credits,
    /// Page `n` is `review_pages[n - 1]`; pages past the end are empty.
    pub review_pages: Vec<Vec<Review>>,
    pub fail_details: bool,
    pub fail_search: bool,
    pub requested_pages: Mutex<Vec<u32>>,
}

impl FakeCatalog {
    pub fn inception() -> Self {
        Self {
            search_results: vec![
                summary(27205, "Inception", Some("2010-07-15")),
                summary(64956, "Inception: The Cobol Job", Some("2010-12-07")),
                summary(613092, "Inception: Jump Right Into the Action", None),
                summary(1, "Fourth", Some("2020-01-01")),
            ],
            details: MovieDetails {
                title: Some("Inception".to_string()),
                poster_path: Some("/inception.jpg".to_string()),
                vote_average: Some(8.4),
                runtime: Some(148),
                genres: vec![
                    Genre { name: "Action".to_string() },
                    Genre { name: "Science Fiction".to_string() },
                ],
                overview: Some("A thief who steals corporate secrets.".to_string()),
            },
            credits: Credits {
                cast: ["Leonardo DiCaprio", "Joseph Gordon-Levitt", "Elliot Page", "Tom Hardy"]
                    .iter()
                    .map(|n| CastMember { name: n.to_string() })
                    .collect(),
                crew: vec![
                    CrewMember { name: "Hans Zimmer".to_string(), job: "Original Music Composer".to_string() },
                    CrewMember { name: "Christopher Nolan".to_string(), job: "Director".to_string() },
                ],
            },
            ..Default::default()
        }
    }

    pub fn with_review_pages(mut self, pages: Vec<Vec<Review>>) -> Self {
        self.review_pages = pages;
        self
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.requested_pages.lock().unwrap().clone()
    }
}

#[async_trait]
impl MovieCatalog for FakeCatalog {
    async fn search_movies(&self, _query: &str) -> Result<Vec<MovieSummary>> {
        if self.fail_search {
            bail!("search upstream unavailable");
        }
        Ok(self.search_results.clone())
    }

    async fn movie_details(&self, _movie_id: u64) -> Result<MovieDetails> {
        if self.fail_details {
            bail!("TMDB returned 500 Internal Server Error");
        }
        Ok(self.details.clone())
    }

    async fn movie_credits(&self, _movie_id: u64) -> Result<Credits> {
        Ok(self.credits.clone())
    }

    async fn movie_reviews(&self, _movie_id: u64, page: u32) -> Result<Vec<Review>> {
        self.requested_pages.lock().unwrap().push(page);
        Ok(self
            .review_pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default())
    }
}

/// Labels a text "5 stars" when it contains "good", otherwise "1 star".
#[derive(Default)]
pub struct FakeClassifier {
    pub batches: Mutex<Vec<Vec<String>>>,
    pub drop_last: bool,
}

impl FakeClassifier {
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(Vec::len).collect()
    }

    pub fn all_inputs(&self) -> Vec<String> {
        self.batches.lock().unwrap().concat()
    }
}

#[async_trait]
impl SentimentClassifier for FakeClassifier {
    async fn classify(&self, texts: &[String]) -> Result<Vec<String>> {
        self.batches.lock().unwrap().push(texts.to_vec());
        let mut labels: Vec<String> = texts
            .iter()
            .map(|t| if t.contains("good") { "5 stars" } else { "1 star" }.to_string())
            .collect();
        if self.drop_last {
            labels.pop();
        }
        Ok(labels)
    }
}

pub fn summary(id: u64, title: &str, release_date: Option<&str>) -> MovieSummary {
    MovieSummary {
        id,
        title: Some(title.to_string()),
        release_date: release_date.map(str::to_string),
    }
}

pub fn review(author: &str, content: &str, rating: Option<f64>) -> Review {
    Review {
        author: Some(author.to_string()),
        content: Some(content.to_string()),
        author_details: Some(AuthorDetails { rating }),
    }
}

pub fn reviews(count: usize, content: &str) -> Vec<Review> {
    (0..count)
        .map(|i| review(&format!("user{}", i), content, None))
        .collect()
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_stub(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
