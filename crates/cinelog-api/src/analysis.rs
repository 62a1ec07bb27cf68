//! Per-movie analysis widgets, plus the admin reviewer-activity board.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use cinelog_analytics::keywords;
use cinelog_types::api::{SentimentDistribution, TopReviewer, WordCloudEntry};

use crate::analytics::REVIEW_SAMPLE_CAP;
use crate::error::ApiError;
use crate::middleware::{ensure_admin, CurrentUser};
use crate::state::AppState;

const WORD_CLOUD_SIZE: usize = 50;
const TOP_REVIEWERS: i64 = 10;

/// Counts of the stored sentiment labels for one movie.
pub async fn movie_sentiment(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> Result<Json<SentimentDistribution>, ApiError> {
    if !state.store.movie_exists(movie_id).await? {
        return Err(ApiError::NotFound("Movie not found".to_string()));
    }
    Ok(Json(state.store.sentiment_counts(Some(movie_id)).await?))
}

pub async fn movie_word_cloud(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> Result<Json<Vec<WordCloudEntry>>, ApiError> {
    if !state.store.movie_exists(movie_id).await? {
        return Err(ApiError::NotFound("Movie not found".to_string()));
    }

    let contents = state
        .store
        .review_contents(Some(movie_id), None, REVIEW_SAMPLE_CAP)
        .await?;
    let text = contents.join(" ");
    let entries = keywords::word_counts(&text, WORD_CLOUD_SIZE)
        .into_iter()
        .map(|(word, count)| WordCloudEntry {
            word,
            count: count as i64,
        })
        .collect();

    Ok(Json(entries))
}

/// The ten most prolific reviewers and the titles they covered.
pub async fn user_activity(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<TopReviewer>>, ApiError> {
    ensure_admin(&user)?;

    let rows = state.store.top_reviewers(TOP_REVIEWERS).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| TopReviewer {
                username: row.username,
                review_count: row.review_count,
                movies: row.movies,
            })
            .collect(),
    ))
}
