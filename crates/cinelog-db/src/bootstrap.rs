//! One-time startup preparation: indexes, the movie catalog, and the first
//! admin account.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use cinelog_types::models::{Image, MovieDoc, UserDoc};
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::IndexModel;
use serde::Deserialize;
use tracing::info;

use crate::Store;

impl Store {
    /// Creates the indexes the query layer relies on. Safe to run on every
    /// startup; existing indexes are left alone.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let unique = IndexOptions::builder().unique(true).build();

        self.users()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "username": 1 })
                    .options(unique.clone())
                    .build(),
                None,
            )
            .await?;
        self.users()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique)
                    .build(),
                None,
            )
            .await?;
        self.movies()
            .create_index(
                IndexModel::builder().keys(doc! { "movie_id": 1 }).build(),
                None,
            )
            .await?;
        self.reviews()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "movie_id": 1, "created_at": -1 })
                    .build(),
                None,
            )
            .await?;
        self.reviews()
            .create_index(
                IndexModel::builder().keys(doc! { "user_id": 1 }).build(),
                None,
            )
            .await?;
        self.favorites()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "user_id": 1, "movie_id": 1 })
                    .build(),
                None,
            )
            .await?;

        info!("Indexes ensured");
        Ok(())
    }

    /// Bulk-loads the movie catalog from a JSON dataset. Runs once: a
    /// non-empty collection is left untouched.
    pub async fn load_dataset(&self, path: &Path) -> Result<usize> {
        if self.count_movies().await? > 0 {
            info!("Movie catalog already loaded, skipping dataset import");
            return Ok(0);
        }

        let raw = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading dataset {}", path.display()))?;
        let records: Vec<DatasetMovie> = serde_json::from_slice(&raw)
            .with_context(|| format!("parsing dataset {}", path.display()))?;
        let movies: Vec<MovieDoc> = records.into_iter().map(MovieDoc::from).collect();

        let inserted = self.insert_movies(&movies).await?;
        info!("Imported {} movies from {}", inserted, path.display());
        Ok(inserted)
    }

    /// Creates the first account. Only runs while the user collection is
    /// empty, so a live deployment is never reseeded.
    pub async fn seed_admin(&self, admin: UserDoc) -> Result<bool> {
        if self.count_users().await? > 0 {
            return Ok(false);
        }
        info!("Seeding initial admin account '{}'", admin.username);
        self.create_user(&admin).await?;
        Ok(true)
    }
}

/// Dataset entry. Older rows predate `rating`/`release_date`, and scraped
/// rows carry embedded review arrays, which are not imported.
#[derive(Debug, Deserialize)]
struct DatasetMovie {
    movie_id: i64,
    title: String,
    #[serde(default)]
    genre: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    url_film: String,
    img: Image,
    #[serde(default)]
    source: String,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    release_date: Option<NaiveDate>,
}

impl From<DatasetMovie> for MovieDoc {
    fn from(record: DatasetMovie) -> Self {
        MovieDoc {
            movie_id: record.movie_id,
            title: record.title,
            genre: record.genre,
            description: record.description,
            url_film: record.url_film,
            img: record.img,
            source: record.source,
            rating: record.rating,
            release_date: record
                .release_date
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|datetime| datetime.and_utc()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_movie_parses_and_skips_embedded_reviews() {
        let raw = r#"[{
            "movie_id": 101,
            "title": "Dune",
            "genre": "Sci-Fi;Adventure",
            "description": "Spice.",
            "url_film": "http://example/dune",
            "img": { "type": "url", "content": "http://img/dune.jpg" },
            "source": "import",
            "rating": 4.6,
            "release_date": "2024-03-01",
            "reviews": [ { "review_id": "r1", "uname": "a", "content": "good" } ]
        }]"#;
        let records: Vec<DatasetMovie> = serde_json::from_str(raw).unwrap();
        assert_eq!(records.len(), 1);
        let movie = MovieDoc::from(records.into_iter().next().unwrap());
        assert_eq!(movie.movie_id, 101);
        assert_eq!(movie.rating, Some(4.6));
        // Dates land at midnight UTC so monthly bucketing is stable.
        let release = movie.release_date.unwrap();
        assert_eq!(release.to_rfc3339(), "2024-03-01T00:00:00+00:00");
    }

    #[test]
    fn test_dataset_movie_tolerates_missing_optionals() {
        let raw = r#"[{
            "movie_id": 7,
            "title": "Clerks",
            "img": { "type": "url", "content": "x" }
        }]"#;
        let records: Vec<DatasetMovie> = serde_json::from_str(raw).unwrap();
        let movie = MovieDoc::from(records.into_iter().next().unwrap());
        assert_eq!(movie.genre, "");
        assert!(movie.rating.is_none());
        assert!(movie.release_date.is_none());
    }
}
