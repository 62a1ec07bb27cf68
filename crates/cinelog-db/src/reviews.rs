use anyhow::Result;
use cinelog_types::models::ReviewDoc;
use futures_util::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::FindOptions;

use crate::Store;

impl Store {
    pub async fn create_review(&self, review: &ReviewDoc) -> Result<()> {
        self.reviews().insert_one(review, None).await?;
        Ok(())
    }

    pub async fn find_review(&self, id: &str) -> Result<Option<ReviewDoc>> {
        Ok(self.reviews().find_one(doc! { "_id": id }, None).await?)
    }

    pub async fn reviews_for_movie(&self, movie_id: i64) -> Result<Vec<ReviewDoc>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self
            .reviews()
            .find(doc! { "movie_id": movie_id }, options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn reviews_by_user(&self, user_id: &str) -> Result<Vec<ReviewDoc>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self
            .reviews()
            .find(doc! { "user_id": user_id }, options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Returns whether a document was actually removed.
    pub async fn delete_review(&self, id: &str) -> Result<bool> {
        let result = self.reviews().delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    pub async fn count_reviews(&self) -> Result<u64> {
        Ok(self.reviews().count_documents(None, None).await?)
    }
}
