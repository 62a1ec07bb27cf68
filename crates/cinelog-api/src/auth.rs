use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use cinelog_types::api::{RegisterRequest, TokenRequest, TokenResponse, UserResponse};
use cinelog_types::models::UserDoc;

use crate::error::ApiError;
use crate::middleware::Claims;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(ApiError::BadRequest(
            "Username must be 3-32 characters".to_string(),
        ));
    }
    if req.password.len() < 8 {
        return Err(ApiError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if !req.email.contains('@') {
        return Err(ApiError::BadRequest("Invalid email address".to_string()));
    }

    let existing = state
        .store
        .find_user_by_username_or_email(&req.username, &req.email)
        .await?;
    ensure_identity_free(existing)?;

    // Accounts created over the API are never admins; the only admin comes
    // from startup seeding.
    let user = UserDoc {
        id: Uuid::new_v4().to_string(),
        username: req.username,
        email: req.email,
        password: hash_password(&req.password)?,
        is_admin: false,
        avatar: None,
        created_at: Utc::now(),
    };
    state.store.create_user(&user).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// OAuth2 password flow: form-encoded credentials in, bearer token out.
pub async fn token(
    State(state): State<AppState>,
    Form(form): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .store
        .find_user_by_username(&form.username)
        .await?
        .ok_or_else(bad_credentials)?;

    if !verify_password(&form.password, &user.password)? {
        return Err(bad_credentials());
    }

    let access_token = create_token(
        &state.config.jwt_secret,
        state.config.token_ttl_minutes,
        &user,
    )?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

fn bad_credentials() -> ApiError {
    ApiError::Unauthorized("Incorrect username or password".to_string())
}

/// A matching account on either field blocks the signup.
fn ensure_identity_free(existing: Option<UserDoc>) -> Result<(), ApiError> {
    if existing.is_some() {
        Err(ApiError::Conflict(
            "Username or email already registered".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Argon2id PHC string for storage.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

/// Ok(false) is a mismatch; Err means the stored hash itself is unusable.
pub fn verify_password(password: &str, stored_hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow::anyhow!("stored password hash is invalid: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub fn create_token(secret: &str, ttl_minutes: i64, user: &UserDoc) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user.id.clone(),
        username: user.username.clone(),
        exp: (Utc::now() + Duration::minutes(ttl_minutes)).timestamp() as usize,
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}
