use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use cinelog_types::api::{CheckFavoriteResponse, FavoriteMovie, FavoriteRecord, MovieSummary};
use cinelog_types::models::{FavoriteDoc, MovieDoc, UserDoc};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// A (user, movie) pair can be favorited once; repeats are a conflict.
pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(movie_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.store.movie_exists(movie_id).await? {
        return Err(ApiError::NotFound("Movie not found".to_string()));
    }
    ensure_not_favorited(state.store.find_favorite_pair(&user.id, movie_id).await?)?;

    let favorite = FavoriteDoc {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        movie_id,
        created_at: Utc::now(),
    };
    state.store.create_favorite(&favorite).await?;

    Ok((StatusCode::CREATED, Json(FavoriteRecord::from(favorite))))
}

/// The caller's favorites joined with catalog info, newest favorite first.
/// Favorites whose movie has vanished from the catalog are omitted.
pub async fn list_favorites(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<FavoriteMovie>>, ApiError> {
    let favorites = state.store.favorites_for_user(&user.id).await?;
    let movie_ids: Vec<i64> = favorites.iter().map(|favorite| favorite.movie_id).collect();
    let movies = state.store.find_movies_by_ids(&movie_ids).await?;
    let by_id: HashMap<i64, MovieDoc> = movies
        .into_iter()
        .map(|movie| (movie.movie_id, movie))
        .collect();

    let result = favorites
        .into_iter()
        .filter_map(|favorite| {
            by_id.get(&favorite.movie_id).map(|movie| FavoriteMovie {
                favorite_id: favorite.id,
                favorited_at: favorite.created_at,
                movie: MovieSummary::from(movie.clone()),
            })
        })
        .collect();

    Ok(Json(result))
}

pub async fn check_favorite(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(movie_id): Path<i64>,
) -> Result<Json<CheckFavoriteResponse>, ApiError> {
    let favorite = state.store.find_favorite_pair(&user.id, movie_id).await?;
    Ok(Json(CheckFavoriteResponse {
        is_favorite: favorite.is_some(),
    }))
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(favorite_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let favorite = state
        .store
        .find_favorite(&favorite_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Favorite not found".to_string()))?;
    ensure_owner(&favorite, &user)?;

    state.store.delete_favorite(&favorite_id).await?;
    Ok(Json(json!({ "message": "Favorite removed" })))
}

/// An existing (user, movie) record blocks a second favorite.
fn ensure_not_favorited(existing: Option<FavoriteDoc>) -> Result<(), ApiError> {
    if existing.is_some() {
        Err(ApiError::Conflict("Movie already favorited".to_string()))
    } else {
        Ok(())
    }
}

fn ensure_owner(favorite: &FavoriteDoc, user: &UserDoc) -> Result<(), ApiError> {
    if favorite.user_id == user.id {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Not allowed to remove this favorite".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn favorite_by(user_id: &str) -> FavoriteDoc {
        FavoriteDoc {
            id: "f-1".into(),
            user_id: user_id.into(),
            movie_id: 7,
            created_at: Utc::now(),
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
    fn test_second_favorite_of_same_movie_conflicts() {
        assert!(ensure_not_favorited(None).is_ok());
        let err = ensure_not_favorited(Some(favorite_by("u-1"))).unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_only_owner_may_remove() {
        let favorite = favorite_by("u-1");
        assert!(ensure_owner(&favorite, &user("u-1")).is_ok());
        let err = ensure_owner(&favorite, &user("u-2")).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }
}
