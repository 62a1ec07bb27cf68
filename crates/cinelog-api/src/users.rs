use std::cmp::Reverse;
use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use cinelog_types::api::{
    ActivityEntry, AvatarResponse, ChangePasswordRequest, UpdateProfileRequest, UserResponse,
};

use crate::auth::{hash_password, verify_password};
use crate::error::ApiError;
use crate::middleware::{ensure_admin, CurrentUser};
use crate::state::AppState;

/// 2 MB is plenty for an avatar.
pub const MAX_AVATAR_SIZE: usize = 2 * 1024 * 1024;

/// Transport cap for the avatar route. Must exceed [`MAX_AVATAR_SIZE`], or
/// the extractor cuts oversize uploads off before the size check runs.
pub const AVATAR_BODY_LIMIT: usize = 4 * MAX_AVATAR_SIZE;

pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// Reviews and favorites merged into one timeline, newest first.
pub async fn my_activity(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<ActivityEntry>>, ApiError> {
    let reviews = state.store.reviews_by_user(&user.id).await?;
    let favorites = state.store.favorites_for_user(&user.id).await?;

    let mut entries: Vec<ActivityEntry> = reviews
        .into_iter()
        .map(|review| ActivityEntry::Review {
            id: review.id,
            movie_id: review.movie_id,
            content: review.content,
            sentiment: review.sentiment,
            created_at: review.created_at,
        })
        .chain(favorites.into_iter().map(|favorite| ActivityEntry::Favorite {
            id: favorite.id,
            movie_id: favorite.movie_id,
            created_at: favorite.created_at,
        }))
        .collect();
    entries.sort_by_key(|entry| Reverse(entry.created_at()));

    Ok(Json(entries))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(mut user)): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if !req.email.contains('@') {
        return Err(ApiError::BadRequest("Invalid email address".to_string()));
    }
    if state.store.email_taken_by_other(&req.email, &user.id).await? {
        return Err(ApiError::Conflict("Email already in use".to_string()));
    }

    state.store.update_user_email(&user.id, &req.email).await?;
    user.email = req.email;
    Ok(Json(UserResponse::from(user)))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.new_password.len() < 8 {
        return Err(ApiError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if !verify_password(&req.old_password, &user.password)? {
        return Err(ApiError::BadRequest("Old password is incorrect".to_string()));
    }

    let hash = hash_password(&req.new_password)?;
    state.store.update_user_password(&user.id, &hash).await?;
    Ok(Json(json!({ "message": "Password updated" })))
}

/// Accepts raw image bytes, writes them under the upload directory and
/// records the public path on the account. The replaced file, if any, is
/// removed once the account points at the new one.
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Result<Json<AvatarResponse>, ApiError> {
    let ext = validate_avatar(&headers, &bytes)?;

    tokio::fs::create_dir_all(&state.config.upload_dir)
        .await
        .context("creating upload directory")?;

    let file_name = format!("{}.{}", Uuid::new_v4(), ext);
    let path = state.config.upload_dir.join(&file_name);
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("writing avatar {}", path.display()))?;

    let avatar = format!("/uploads/{file_name}");
    state.store.update_user_avatar(&user.id, &avatar).await?;

    let previous = user
        .avatar
        .as_deref()
        .and_then(|stored| stored_avatar_file(&state.config.upload_dir, stored));
    if let Some(previous) = previous {
        if let Err(err) = tokio::fs::remove_file(&previous).await {
            warn!(
                "Failed to remove replaced avatar {}: {}",
                previous.display(),
                err
            );
        }
    }

    Ok(Json(AvatarResponse { avatar }))
}

/// Size and content-type gate. Returns the extension to store under.
fn validate_avatar(headers: &HeaderMap, bytes: &Bytes) -> Result<&'static str, ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Empty upload".to_string()));
    }
    if bytes.len() > MAX_AVATAR_SIZE {
        return Err(ApiError::BadRequest(
            "Avatar exceeds the 2 MB limit".to_string(),
        ));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    match content_type {
        Some("image/png") => Ok("png"),
        Some("image/jpeg") => Ok("jpg"),
        Some("image/webp") => Ok("webp"),
        _ => Err(ApiError::BadRequest(
            "Avatar must be PNG, JPEG or WebP".to_string(),
        )),
    }
}

/// Maps a stored `/uploads/{file}` avatar value back to its file. Anything
/// else (external URLs, nested paths) is not ours to delete.
fn stored_avatar_file(upload_dir: &Path, avatar: &str) -> Option<PathBuf> {
    let file_name = avatar.strip_prefix("/uploads/")?;
    if file_name.is_empty() || file_name.contains('/') || file_name.starts_with('.') {
        return None;
    }
    Some(upload_dir.join(file_name))
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    ensure_admin(&user)?;
    let users = state.store.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
