//! Review aggregation: page through a movie's reviews, classify them, and
//! roll the labels up into a positive/negative breakdown.

use anyhow::{ensure, Context, Result};
use tracing::{debug, info};

use crate::ml::SentimentClassifier;
use crate::tmdb::{MovieCatalog, Review};

pub const MAX_PAGES: u32 = 5;
pub const MAX_REVIEWS: usize = 100;
/// Reviews are cut to this many characters before classification only.
pub const MAX_REVIEW_CHARS: usize = 500;
pub const CLASSIFY_BATCH_SIZE: usize = 8;
const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    /// "4 stars" and "5 stars" are positive; everything else is negative.
    pub fn from_label(label: &str) -> Self {
        match label.chars().next() {
            Some('4') | Some('5') => Polarity::Positive,
            _ => Polarity::Negative,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Positive => "positive",
            Polarity::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedReview {
    /// Full review text, not the truncated copy that was classified.
    pub content: String,
    pub author: String,
    pub rating: Option<f64>,
    /// Raw classifier label, e.g. "4 stars".
    pub sentiment_label: String,
    pub polarity: Polarity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SentimentSummary {
    pub positive_count: usize,
    pub negative_count: usize,
    pub positive_percent: u32,
    pub negative_percent: u32,
}

impl SentimentSummary {
    /// `negative_percent` is the complement of the rounded positive share, so the
    /// pair always sums to 100. With no reviews this reports 0 / 100.
    pub fn from_reviews(reviews: &[AnalyzedReview]) -> Self {
        let total = reviews.len();
        let positive_count = reviews
            .iter()
            .filter(|r| r.polarity == Polarity::Positive)
            .count();

        let positive_percent = if total > 0 {
            ((positive_count as f64 / total as f64) * 100.0).round_ties_even() as u32
        } else {
            0
        };

        Self {
            positive_count,
            negative_count: total - positive_count,
            positive_percent,
            negative_percent: 100 - positive_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReviewAnalysis {
    pub reviews: Vec<AnalyzedReview>,
    pub summary: SentimentSummary,
}

/// Runs the full pipeline for one movie: paginate, classify, summarize.
pub async fn aggregate(
    catalog: &dyn MovieCatalog,
    classifier: &dyn SentimentClassifier,
    movie_id: u64,
) -> Result<ReviewAnalysis> {
    let raw = collect_reviews(catalog, movie_id).await?;
    let reviews = analyze(raw, classifier).await?;
    let summary = SentimentSummary::from_reviews(&reviews);

    info!(
        movie_id,
        total = reviews.len(),
        positive = summary.positive_count,
        "Reviews analyzed"
    );

    Ok(ReviewAnalysis { reviews, summary })
}

/// Requests pages 1..=[`MAX_PAGES`] in sequence, stopping at the first empty page.
pub async fn collect_reviews(catalog: &dyn MovieCatalog, movie_id: u64) -> Result<Vec<Review>> {
    let mut collected = Vec::new();

    for page in 1..=MAX_PAGES {
        let results = catalog
            .movie_reviews(movie_id, page)
            .await
            .with_context(|| format!("failed to fetch review page {} for movie {}", page, movie_id))?;
        if results.is_empty() {
            break;
        }
        collected.extend(results);
    }

    debug!(movie_id, count = collected.len(), "reviews collected");
    Ok(collected)
}

/// Classifies at most [`MAX_REVIEWS`] reviews. Reviews without content are skipped.
pub async fn analyze(
    reviews: Vec<Review>,
    classifier: &dyn SentimentClassifier,
) -> Result<Vec<AnalyzedReview>> {
    let kept: Vec<(String, Review)> = reviews
        .into_iter()
        .take(MAX_REVIEWS)
        .filter_map(|r| r.content.clone().map(|content| (content, r)))
        .collect();

    let texts: Vec<String> = kept
        .iter()
        .map(|(content, _)| truncate_chars(content, MAX_REVIEW_CHARS).to_string())
        .collect();

    let mut labels = Vec::with_capacity(texts.len());
    for batch in texts.chunks(CLASSIFY_BATCH_SIZE) {
        let batch_labels = classifier
            .classify(batch)
            .await
            .context("sentiment classification failed")?;
        ensure!(
            batch_labels.len() == batch.len(),
            "classifier returned {} labels for a batch of {}",
            batch_labels.len(),
            batch.len()
        );
        labels.extend(batch_labels);
    }

    Ok(kept
        .into_iter()
        .zip(labels)
        .map(|((content, review), label)| AnalyzedReview {
            content,
            rating: review.rating(),
            author: review.author.unwrap_or_else(|| ANONYMOUS.to_string()),
            polarity: Polarity::from_label(&label),
            sentiment_label: label,
        })
        .collect())
}

/// Cuts `text` to at most `max_chars` Unicode scalar values.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
