use axum::{
    extract::{Path, Query, State},
    Json,
};

use cinelog_types::api::{GenreBucket, MovieDetail, MovieSummary, PageQuery, ReviewResponse};

use crate::error::ApiError;
use crate::state::AppState;
use crate::MAX_PAGE_SIZE;

pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<MovieSummary>>, ApiError> {
    let limit = query.limit.clamp(1, MAX_PAGE_SIZE);
    let movies = state.store.list_movies(query.skip, limit).await?;
    Ok(Json(movies.into_iter().map(MovieSummary::from).collect()))
}

pub async fn get_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> Result<Json<MovieDetail>, ApiError> {
    let movie = state
        .store
        .find_movie(movie_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))?;
    let reviews = state.store.reviews_for_movie(movie_id).await?;

    Ok(Json(MovieDetail {
        movie: MovieSummary::from(movie),
        reviews: reviews.into_iter().map(ReviewResponse::from).collect(),
    }))
}

/// Genre buckets across the whole catalog, most common first. A
/// semicolon-delimited genre counts toward each of its parts.
pub async fn genre_stats(
    State(state): State<AppState>,
) -> Result<Json<Vec<GenreBucket>>, ApiError> {
    let rows = state.store.genre_counts(None).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| GenreBucket {
                genre: row.label,
                count: row.count,
            })
            .collect(),
    ))
}
