use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::ml::SentimentClassifier;
use crate::movies;
use crate::render::{render_page, PageContext};
use crate::reviews;
use crate::tmdb::MovieCatalog;

pub const DETAIL_ERROR_MESSAGE: &str = "Failed to fetch movie data or reviews.";

pub struct AppState {
    pub config: AppConfig,
    pub catalog: Arc<dyn MovieCatalog>,
    pub classifier: Arc<dyn SentimentClassifier>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/search", post(search_movie))
        .route("/movie/:movie_id", get(movie_detail))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Any error escaping a handler becomes a bare 500.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub movie: String,
}

pub async fn home() -> Html<String> {
    Html(render_page(&PageContext::default()))
}

pub async fn search_movie(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>, AppError> {
    info!("Searching for '{}'", form.movie);
    let movies = movies::search(state.catalog.as_ref(), &form.movie).await?;

    Ok(Html(render_page(&PageContext {
        movies: Some(movies),
        ..Default::default()
    })))
}

pub async fn movie_detail(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<u64>,
) -> Html<String> {
    let ctx = match load_movie_page(&state, movie_id).await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(movie_id, "Error: {:#}", e);
            PageContext {
                error: Some(DETAIL_ERROR_MESSAGE.to_string()),
                ..Default::default()
            }
        }
    };

    Html(render_page(&ctx))
}

async fn load_movie_page(state: &AppState, movie_id: u64) -> anyhow::Result<PageContext> {
    let movie = movies::fetch_detail(
        state.catalog.as_ref(),
        &state.config.tmdb_image_base_url,
        movie_id,
    )
    .await?;
    let analysis =
        reviews::aggregate(state.catalog.as_ref(), state.classifier.as_ref(), movie_id).await?;

    Ok(PageContext {
        movie: Some(movie),
        analysis: Some(analysis),
        ..Default::default()
    })
}
