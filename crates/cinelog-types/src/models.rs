//! Collection document types — these map directly to MongoDB documents.
//! Distinct from the cinelog-types API models so the wire layer never leaks
//! BSON datetimes or password hashes.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review sentiment label. Exactly these three values exist; anything else
/// is rejected at the serde boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "positive" => Some(Sentiment::Positive),
            "neutral" => Some(Sentiment::Neutral),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    /// Argon2 PHC hash, never a plaintext password.
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Image descriptor carried by the movie dataset: `type` says how to
/// interpret `content` (url, base64, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

/// `bson::serde_helpers` has no optional chrono variant, so supply one for
/// the dataset fields that may be absent.
pub mod opt_chrono_datetime_as_bson_datetime {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.map(bson::DateTime::from_chrono).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let value = Option::<bson::DateTime>::deserialize(deserializer)?;
        Ok(value.map(bson::DateTime::to_chrono))
    }
}

/// Immutable catalog entry, bulk-loaded from the dataset. The collection's
/// auto `_id` is never read; `movie_id` is the canonical key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDoc {
    pub movie_id: i64,
    pub title: String,
    /// Single genre or a semicolon-delimited list ("Action;Drama").
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url_film: String,
    pub img: Image,
    #[serde(default)]
    pub source: String,
    /// 1-5 scale where the dataset provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "opt_chrono_datetime_as_bson_datetime"
    )]
    pub release_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub movie_id: i64,
    pub content: String,
    pub sentiment: Sentiment,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    /// Denormalized at creation so listings need no user join.
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub movie_id: i64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_exactly_three_values() {
        assert_eq!(Sentiment::parse("positive"), Some(Sentiment::Positive));
        assert_eq!(Sentiment::parse("neutral"), Some(Sentiment::Neutral));
        assert_eq!(Sentiment::parse("negative"), Some(Sentiment::Negative));
        assert_eq!(Sentiment::parse("POSITIVE"), None);
        assert_eq!(Sentiment::parse("meh"), None);
    }

    #[test]
    fn test_sentiment_serde_lowercase() {
        let json = serde_json::to_string(&Sentiment::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
        let back: Sentiment = serde_json::from_str("\"neutral\"").unwrap();
        assert_eq!(back, Sentiment::Neutral);
        assert!(serde_json::from_str::<Sentiment>("\"angry\"").is_err());
    }

    #[test]
    fn test_movie_doc_tolerates_missing_optional_fields() {
        // Dataset entries predate the rating/release_date fields.
        let doc = bson::doc! {
            "movie_id": 42_i64,
            "title": "Arrival",
            "genre": "Sci-Fi;Drama",
            "img": { "type": "url", "content": "http://img/42.jpg" },
        };
        let movie: MovieDoc = bson::from_document(doc).unwrap();
        assert_eq!(movie.movie_id, 42);
        assert!(movie.rating.is_none());
        assert!(movie.release_date.is_none());
        assert_eq!(movie.description, "");
    }

    #[test]
    fn test_review_doc_roundtrips_bson_datetime() {
        let created = Utc::now();
        let review = ReviewDoc {
            id: "r-1".into(),
            user_id: "u-1".into(),
            movie_id: 7,
            content: "worth a watch".into(),
            sentiment: Sentiment::Positive,
            created_at: created,
            username: "alice".into(),
        };
        let doc = bson::to_document(&review).unwrap();
        // Stored as a real BSON date so $gte / $dateToString work server-side.
        assert!(matches!(doc.get("created_at"), Some(bson::Bson::DateTime(_))));
        let back: ReviewDoc = bson::from_document(doc).unwrap();
        assert_eq!(back.sentiment, Sentiment::Positive);
        assert_eq!(back.created_at.timestamp_millis(), created.timestamp_millis());
    }
}
