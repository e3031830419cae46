//! Review sentiment classification.
//!
//! Labels follow the 5-class star scale of
//! `nlptown/bert-base-multilingual-uncased-sentiment`: "1 star", "2 stars" .. "5 stars".
//! Two backends:
//! - [`RemoteClassifier`] posts batches to a model-serving sidecar hosting that model.
//! - [`LexiconClassifier`] scores keyword hits in-process. No external ML dependencies.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::AppConfig;

/// Classifies review texts into star labels, one label per input, in input order.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, texts: &[String]) -> Result<Vec<String>>;
}

/// Builds the single process-wide classifier handed to request handlers.
pub fn build_classifier(config: &AppConfig) -> Arc<dyn SentimentClassifier> {
    match &config.sentiment_url {
        Some(url) => {
            info!("Using sentiment sidecar at {}", url);
            Arc::new(RemoteClassifier::new(url))
        }
        None => {
            info!("SENTIMENT_URL not set, using built-in lexicon classifier");
            Arc::new(LexiconClassifier)
        }
    }
}

pub fn star_label(stars: u8) -> String {
    if stars == 1 {
        "1 star".to_string()
    } else {
        format!("{} stars", stars)
    }
}

// ============================================================================
// Sidecar model
// ============================================================================

#[derive(Debug, Deserialize)]
struct SentimentResponse {
    results: Vec<SentimentPrediction>,
}

#[derive(Debug, Deserialize)]
struct SentimentPrediction {
    label: String,
}

/// Calls the model sidecar's `POST /sentiment` with `{"texts": [...]}`.
pub struct RemoteClassifier {
    endpoint: String,
    client: reqwest::Client,
}

impl RemoteClassifier {
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: format!("{}/sentiment", base_url.trim_end_matches('/')),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SentimentClassifier for RemoteClassifier {
    async fn classify(&self, texts: &[String]) -> Result<Vec<String>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(count = texts.len(), "classifying batch via sidecar");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "texts": texts }))
            .send()
            .await
            .context("sentiment sidecar unreachable")?
            .error_for_status()
            .context("sentiment sidecar returned an error")?;

        let data: SentimentResponse = response
            .json()
            .await
            .context("failed to decode sentiment sidecar response")?;

        if data.results.len() != texts.len() {
            bail!(
                "sentiment sidecar returned {} labels for {} texts",
                data.results.len(),
                texts.len()
            );
        }

        Ok(data.results.into_iter().map(|p| p.label).collect())
    }
}

// ============================================================================
// Keyword lexicon
// ============================================================================

static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "good", "great", "excellent", "amazing", "wonderful", "fantastic", "superb",
        "outstanding", "brilliant", "love", "loved", "loving", "best", "better",
        "beautiful", "perfect", "awesome", "incredible", "magnificent", "delightful",
        "enjoyable", "enjoyed", "fun", "funny", "gripping", "masterpiece", "masterful",
        "moving", "powerful", "recommend", "recommended", "impressive", "exceptional",
        "remarkable", "stunning", "compelling", "captivating", "memorable", "charming",
        "clever", "engaging", "thrilling", "riveting", "touching", "beautifully",
        "classic", "solid", "entertaining", "favorite", "favourite",
    ].into_iter().collect()
});

static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "bad", "terrible", "awful", "horrible", "poor", "worst", "worse", "hate",
        "hated", "dislike", "disappointing", "disappointed", "disappointment",
        "failure", "failed", "fails", "boring", "bored", "dull", "tedious", "slow",
        "mess", "messy", "confusing", "predictable", "forgettable", "pointless",
        "waste", "wasted", "useless", "stupid", "silly", "lazy", "weak", "flat",
        "bland", "overrated", "overlong", "annoying", "cringe", "garbage", "trash",
        "rubbish", "pathetic", "mediocre", "subpar", "inferior", "unwatchable",
    ].into_iter().collect()
});

/// Maps the share of positive keyword hits onto the 1-5 star scale.
/// Texts without any sentiment keyword land in the middle at "3 stars".
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn label(text: &str) -> String {
        let lowercase_text = text.to_lowercase();
        let words = lowercase_text
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty());

        let (mut positive_count, mut negative_count) = (0usize, 0usize);
        for word in words {
            if POSITIVE_WORDS.contains(word) {
                positive_count += 1;
            } else if NEGATIVE_WORDS.contains(word) {
                negative_count += 1;
            }
        }

        let total = positive_count + negative_count;
        if total == 0 {
            return star_label(3);
        }

        let positive_ratio = positive_count as f32 / total as f32;
        let stars = if positive_ratio >= 0.8 {
            5
        } else if positive_ratio >= 0.6 {
            4
        } else if positive_ratio > 0.4 {
            3
        } else if positive_ratio > 0.2 {
            2
        } else {
            1
        };
        star_label(stars)
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, texts: &[String]) -> Result<Vec<String>> {
        Ok(texts.iter().map(|t| Self::label(t)).collect())
    }
}
