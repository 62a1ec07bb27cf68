//! Request and response bodies for the HTTP API.
//!
//! Analytics payloads keep the camelCase top-level keys the dashboard
//! consumes; error bodies are `{"detail": ...}` throughout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{FavoriteDoc, Image, MovieDoc, ReviewDoc, Sentiment, UserDoc};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// OAuth2 password form. Extra form fields (grant_type, scope) are ignored
/// rather than rejected so standard clients keep working.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

// -- Users --

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserDoc> for UserResponse {
    fn from(user: UserDoc) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_admin: user.is_admin,
            avatar: user.avatar,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub avatar: String,
}

/// One entry in a user's merged review/favorite timeline, newest first.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityEntry {
    Review {
        id: String,
        movie_id: i64,
        content: String,
        sentiment: Sentiment,
        created_at: DateTime<Utc>,
    },
    Favorite {
        id: String,
        movie_id: i64,
        created_at: DateTime<Utc>,
    },
}

impl ActivityEntry {
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            ActivityEntry::Review { created_at, .. } => *created_at,
            ActivityEntry::Favorite { created_at, .. } => *created_at,
        }
    }
}

// -- Movies --

#[derive(Debug, Clone, Serialize)]
pub struct MovieSummary {
    pub movie_id: i64,
    pub title: String,
    pub genre: String,
    pub description: String,
    pub url_film: String,
    pub img: Image,
    pub source: String,
}

impl From<MovieDoc> for MovieSummary {
    fn from(movie: MovieDoc) -> Self {
        Self {
            movie_id: movie.movie_id,
            title: movie.title,
            genre: movie.genre,
            description: movie.description,
            url_film: movie.url_film,
            img: movie.img,
            source: movie.source,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub movie: MovieSummary,
    pub reviews: Vec<ReviewResponse>,
}

#[derive(Debug, Serialize)]
pub struct GenreBucket {
    pub genre: String,
    pub count: i64,
}

fn default_page_limit() -> i64 {
    20
}

/// Pagination query shared by the catalog and the admin review listing.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_page_limit")]
    pub limit: i64,
}

// -- Reviews --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateReviewRequest {
    pub movie_id: i64,
    pub content: String,
    pub sentiment: Sentiment,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: String,
    pub user_id: String,
    pub movie_id: i64,
    pub content: String,
    pub sentiment: Sentiment,
    pub created_at: DateTime<Utc>,
    pub username: String,
}

impl From<ReviewDoc> for ReviewResponse {
    fn from(review: ReviewDoc) -> Self {
        Self {
            id: review.id,
            user_id: review.user_id,
            movie_id: review.movie_id,
            content: review.content,
            sentiment: review.sentiment,
            created_at: review.created_at,
            username: review.username,
        }
    }
}

// -- Favorites --

#[derive(Debug, Serialize)]
pub struct FavoriteRecord {
    pub id: String,
    pub user_id: String,
    pub movie_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<FavoriteDoc> for FavoriteRecord {
    fn from(favorite: FavoriteDoc) -> Self {
        Self {
            id: favorite.id,
            user_id: favorite.user_id,
            movie_id: favorite.movie_id,
            created_at: favorite.created_at,
        }
    }
}

/// A favorited movie: catalog fields plus when it was favorited.
#[derive(Debug, Serialize)]
pub struct FavoriteMovie {
    pub favorite_id: String,
    pub favorited_at: DateTime<Utc>,
    #[serde(flatten)]
    pub movie: MovieSummary,
}

#[derive(Debug, Serialize)]
pub struct CheckFavoriteResponse {
    pub is_favorite: bool,
}

// -- Analysis (per-movie widgets, public) --

#[derive(Debug, Default, Serialize)]
pub struct SentimentDistribution {
    pub positive: i64,
    pub neutral: i64,
    pub negative: i64,
}

#[derive(Debug, Serialize)]
pub struct WordCloudEntry {
    pub word: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct TopReviewer {
    pub username: String,
    pub review_count: i64,
    pub movies: Vec<String>,
}

// -- Analytics (admin dashboards) --

#[derive(Debug, Serialize)]
pub struct DateSeries {
    pub dates: Vec<String>,
    pub counts: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct MonthSeries {
    pub months: Vec<String>,
    pub counts: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct KeywordEntry {
    pub word: String,
    pub weight: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAnalytics {
    pub sentiment_distribution: SentimentDistribution,
    pub review_trend: DateSeries,
    pub keywords: Vec<KeywordEntry>,
}

#[derive(Debug, Serialize)]
pub struct RatingDistribution {
    pub ratings: Vec<i64>,
    pub counts: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct GenreDistribution {
    pub genres: Vec<String>,
    pub counts: Vec<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieAnalytics {
    pub rating_distribution: RatingDistribution,
    pub genre_distribution: GenreDistribution,
    pub release_trend: MonthSeries,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBehaviors {
    pub reviews: i64,
    pub favorites: i64,
    pub total_users: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnalytics {
    pub activity_data: DateSeries,
    pub registration_trend: MonthSeries,
    pub user_behaviors: UserBehaviors,
}

/// Faceted admin listing: one page of reviews plus the total count,
/// produced by a single store round trip.
#[derive(Debug, Serialize)]
pub struct ReviewPage {
    pub total: i64,
    pub data: Vec<AdminReviewEntry>,
}

#[derive(Debug, Serialize)]
pub struct AdminReviewEntry {
    pub id: String,
    pub movie_id: i64,
    /// None when the review outlived its movie (dangling refs are tolerated).
    pub movie_title: Option<String>,
    pub user_id: String,
    pub username: String,
    pub sentiment: Sentiment,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_response_never_carries_password() {
        let user = UserDoc {
            id: "u-1".into(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "$argon2id$v=19$...".into(),
            is_admin: false,
            avatar: None,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["username"], "alice");
    }

    #[test]
    fn test_register_request_rejects_is_admin() {
        // Privilege escalation via the register body must fail at the boundary.
        let raw = r#"{"username":"eve","email":"e@x.io","password":"hunter22","is_admin":true}"#;
        assert!(serde_json::from_str::<RegisterRequest>(raw).is_err());
    }

    #[test]
    fn test_analytics_keys_are_camel_case() {
        let analytics = UserAnalytics {
            activity_data: DateSeries { dates: vec![], counts: vec![] },
            registration_trend: MonthSeries { months: vec![], counts: vec![] },
            user_behaviors: UserBehaviors { reviews: 1, favorites: 2, total_users: 3 },
        };
        let value = serde_json::to_value(&analytics).unwrap();
        assert!(value.get("activityData").is_some());
        assert!(value.get("registrationTrend").is_some());
        assert_eq!(value["userBehaviors"]["totalUsers"], 3);
    }

    #[test]
    fn test_activity_entry_is_tagged() {
        let entry = ActivityEntry::Favorite {
            id: "f-1".into(),
            movie_id: 9,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "favorite");
        assert_eq!(value["movie_id"], 9);
    }

    #[test]
    fn test_page_query_defaults() {
        let query: PageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.skip, 0);
        assert_eq!(query.limit, 20);

        let query: PageQuery = serde_json::from_str(r#"{"skip":40,"limit":5}"#).unwrap();
        assert_eq!(query.skip, 40);
        assert_eq!(query.limit, 5);
    }
}
