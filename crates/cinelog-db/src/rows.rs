//! Rows produced by aggregation pipelines. These deserialize straight from
//! the cursor; the API layer converts them into wire types.

use chrono::{DateTime, Utc};
use cinelog_types::models::Sentiment;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::Deserialize;

/// `$group` bucket keyed by a string label (date, month, genre).
#[derive(Debug, Clone, Deserialize)]
pub struct LabelCountRow {
    #[serde(rename = "_id")]
    pub label: String,
    pub count: i64,
}

/// Sentiment kept as the raw stored string; unknown labels are skipped when
/// folding rather than failing the whole dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct SentimentCountRow {
    #[serde(rename = "_id")]
    pub sentiment: String,
    pub count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingCountRow {
    #[serde(rename = "_id")]
    pub rating: Option<f64>,
    pub count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentRow {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopReviewerRow {
    #[serde(rename = "_id")]
    pub username: String,
    pub review_count: i64,
    /// Titles of the movies this user reviewed.
    #[serde(default)]
    pub movies: Vec<String>,
}

/// One review in the admin listing, movie title joined in via `$lookup`.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminReviewRow {
    #[serde(rename = "_id")]
    pub id: String,
    pub movie_id: i64,
    #[serde(default)]
    pub movie_title: Option<String>,
    pub user_id: String,
    pub username: String,
    pub sentiment: Sentiment,
    pub content: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// `$facet` output: `total` holds zero or one `$count` documents.
#[derive(Debug, Deserialize)]
pub struct ReviewPageRow {
    pub total: Vec<FacetCountRow>,
    pub data: Vec<AdminReviewRow>,
}

#[derive(Debug, Deserialize)]
pub struct FacetCountRow {
    pub total: i64,
}
