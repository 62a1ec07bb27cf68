use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use cinelog_types::models::UserDoc;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Canonical user id.
    pub sub: String,
    pub username: String,
    pub exp: usize,
}

/// The account resolved from the bearer token, attached as an extension.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserDoc);

/// Validates the bearer token and resolves the account it names. A token
/// for an account that no longer exists is rejected like a forged one.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(unauthorized)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| unauthorized())?;

    let user = state
        .store
        .find_user_by_id(&token_data.claims.sub)
        .await?
        .ok_or_else(unauthorized)?;

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

fn unauthorized() -> ApiError {
    ApiError::Unauthorized("Could not validate credentials".to_string())
}

/// Gate for the dashboard and user-management handlers.
pub fn ensure_admin(user: &UserDoc) -> Result<(), ApiError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Admin privileges required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(is_admin: bool) -> UserDoc {
        UserDoc {
            id: "u-1".into(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "hash".into(),
            is_admin,
            avatar: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_ensure_admin() {
        assert!(ensure_admin(&user(true)).is_ok());
        let err = ensure_admin(&user(false)).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::FORBIDDEN);
    }
}
