use anyhow::Result;
use cinelog_types::models::UserDoc;
use futures_util::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::FindOptions;

use crate::Store;

impl Store {
    pub async fn create_user(&self, user: &UserDoc) -> Result<()> {
        self.users().insert_one(user, None).await?;
        Ok(())
    }

    pub async fn find_user_by_id(&self, id: &str) -> Result<Option<UserDoc>> {
        Ok(self.users().find_one(doc! { "_id": id }, None).await?)
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<UserDoc>> {
        Ok(self.users().find_one(doc! { "username": username }, None).await?)
    }

    /// Registration duplicate check: either field taken blocks the signup.
    pub async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<UserDoc>> {
        let filter = doc! { "$or": [ { "username": username }, { "email": email } ] };
        Ok(self.users().find_one(filter, None).await?)
    }

    pub async fn email_taken_by_other(&self, email: &str, user_id: &str) -> Result<bool> {
        let filter = doc! { "email": email, "_id": { "$ne": user_id } };
        Ok(self.users().count_documents(filter, None).await? > 0)
    }

    pub async fn update_user_email(&self, id: &str, email: &str) -> Result<()> {
        self.users()
            .update_one(doc! { "_id": id }, doc! { "$set": { "email": email } }, None)
            .await?;
        Ok(())
    }

    pub async fn update_user_password(&self, id: &str, password_hash: &str) -> Result<()> {
        self.users()
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "password": password_hash } },
                None,
            )
            .await?;
        Ok(())
    }

    pub async fn update_user_avatar(&self, id: &str, avatar: &str) -> Result<()> {
        self.users()
            .update_one(doc! { "_id": id }, doc! { "$set": { "avatar": avatar } }, None)
            .await?;
        Ok(())
    }

    pub async fn list_users(&self) -> Result<Vec<UserDoc>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self.users().find(None, options).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_users(&self) -> Result<u64> {
        Ok(self.users().count_documents(None, None).await?)
    }
}
