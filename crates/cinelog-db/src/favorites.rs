use anyhow::Result;
use cinelog_types::models::FavoriteDoc;
use futures_util::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::FindOptions;

use crate::Store;

impl Store {
    /// Callers check [`Store::find_favorite_pair`] first; (user, movie)
    /// uniqueness is enforced at this level, not by an index.
    pub async fn create_favorite(&self, favorite: &FavoriteDoc) -> Result<()> {
        self.favorites().insert_one(favorite, None).await?;
        Ok(())
    }

    pub async fn find_favorite(&self, id: &str) -> Result<Option<FavoriteDoc>> {
        Ok(self.favorites().find_one(doc! { "_id": id }, None).await?)
    }

    pub async fn find_favorite_pair(
        &self,
        user_id: &str,
        movie_id: i64,
    ) -> Result<Option<FavoriteDoc>> {
        let filter = doc! { "user_id": user_id, "movie_id": movie_id };
        Ok(self.favorites().find_one(filter, None).await?)
    }

    pub async fn favorites_for_user(&self, user_id: &str) -> Result<Vec<FavoriteDoc>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self
            .favorites()
            .find(doc! { "user_id": user_id }, options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Returns whether a document was actually removed.
    pub async fn delete_favorite(&self, id: &str) -> Result<bool> {
        let result = self.favorites().delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    /// Number of distinct users holding at least one favorite.
    pub async fn count_users_with_favorites(&self) -> Result<u64> {
        let users = self.favorites().distinct("user_id", None, None).await?;
        Ok(users.len() as u64)
    }
}
