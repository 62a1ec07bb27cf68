use anyhow::Result;
use cinelog_types::models::MovieDoc;
use futures_util::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::FindOptions;

use crate::Store;

impl Store {
    /// Catalog page, `movie_id` ascending so pages are stable.
    pub async fn list_movies(&self, skip: u64, limit: i64) -> Result<Vec<MovieDoc>> {
        let options = FindOptions::builder()
            .sort(doc! { "movie_id": 1 })
            .skip(skip)
            .limit(limit)
            .build();
        let cursor = self.movies().find(None, options).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_movie(&self, movie_id: i64) -> Result<Option<MovieDoc>> {
        Ok(self
            .movies()
            .find_one(doc! { "movie_id": movie_id }, None)
            .await?)
    }

    pub async fn movie_exists(&self, movie_id: i64) -> Result<bool> {
        let count = self
            .movies()
            .count_documents(doc! { "movie_id": movie_id }, None)
            .await?;
        Ok(count > 0)
    }

    pub async fn find_movies_by_ids(&self, movie_ids: &[i64]) -> Result<Vec<MovieDoc>> {
        if movie_ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .movies()
            .find(doc! { "movie_id": { "$in": movie_ids } }, None)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn insert_movies(&self, movies: &[MovieDoc]) -> Result<usize> {
        if movies.is_empty() {
            return Ok(0);
        }
        let result = self.movies().insert_many(movies, None).await?;
        Ok(result.inserted_ids.len())
    }

    pub async fn count_movies(&self) -> Result<u64> {
        Ok(self.movies().count_documents(None, None).await?)
    }
}
