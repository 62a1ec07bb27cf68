use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use cinelog_types::api::{CreateReviewRequest, ReviewResponse};
use cinelog_types::models::{ReviewDoc, UserDoc};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

const MAX_CONTENT_CHARS: usize = 2000;

pub async fn create_review(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::BadRequest(
            "Review content must not be empty".to_string(),
        ));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(ApiError::BadRequest(
            "Review content exceeds 2000 characters".to_string(),
        ));
    }
    if !state.store.movie_exists(req.movie_id).await? {
        return Err(ApiError::NotFound("Movie not found".to_string()));
    }

    let review = ReviewDoc {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        movie_id: req.movie_id,
        content: content.to_string(),
        sentiment: req.sentiment,
        created_at: Utc::now(),
        username: user.username.clone(),
    };
    state.store.create_review(&review).await?;

    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))))
}

pub async fn movie_reviews(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    let reviews = state.store.reviews_for_movie(movie_id).await?;
    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}

pub async fn my_reviews(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    let reviews = state.store.reviews_by_user(&user.id).await?;
    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}

/// Only the author may delete a review; the check runs before the delete so
/// a forbidden attempt leaves the record untouched.
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(review_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let review = state
        .store
        .find_review(&review_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))?;
    ensure_owner(&review, &user)?;

    state.store.delete_review(&review_id).await?;
    Ok(Json(json!({ "message": "Review deleted" })))
}

fn ensure_owner(review: &ReviewDoc, user: &UserDoc) -> Result<(), ApiError> {
    if review.user_id == user.id {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Not allowed to delete this review".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use cinelog_types::models::Sentiment;

    fn review_by(user_id: &str) -> ReviewDoc {
        ReviewDoc {
            id: "r-1".into(),
            user_id: user_id.into(),
            movie_id: 7,
            content: "solid".into(),
            sentiment: Sentiment::Positive,
            created_at: Utc::now(),
            username: "alice".into(),
        }
    }

    fn user(id: &str) -> UserDoc {
        UserDoc {
            id: id.into(),
            username: "bob".into(),
            email: "bob@example.com".into(),
            password: "hash".into(),
            is_admin: false,
            avatar: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_only_author_may_delete() {
        let review = review_by("u-1");
        assert!(ensure_owner(&review, &user("u-1")).is_ok());
        let err = ensure_owner(&review, &user("u-2")).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }
}
