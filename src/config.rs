//! Process configuration, read once from the environment at startup.

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TMDB v3 API key. Not validated here: a missing key shows up as
    /// authentication failures on the first upstream call.
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub tmdb_image_base_url: String,
    /// Base URL of the model-serving sidecar. `None` selects the built-in lexicon classifier.
    pub sentiment_url: Option<String>,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse()
            .with_context(|| format!("invalid BIND_ADDR: {}", bind_raw))?;

        Ok(Self {
            tmdb_api_key: lookup("TMDB_API_KEY").unwrap_or_default(),
            tmdb_base_url: non_empty("TMDB_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TMDB_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            tmdb_image_base_url: non_empty("TMDB_IMAGE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TMDB_IMAGE_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            sentiment_url: non_empty("SENTIMENT_URL").map(|u| u.trim_end_matches('/').to_string()),
            bind_addr,
        })
    }
}
