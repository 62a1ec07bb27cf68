pub mod analytics;
pub mod bootstrap;
pub mod favorites;
pub mod movies;
pub mod reviews;
pub mod rows;
pub mod users;

use anyhow::Result;
use cinelog_types::models::{FavoriteDoc, MovieDoc, ReviewDoc, UserDoc};
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use tracing::info;

pub struct Store {
    client: Client,
    db: Database,
}

impl Store {
    pub async fn connect(url: &str, db_name: &str) -> Result<Self> {
        let mut options = ClientOptions::parse(url).await?;
        options.app_name = Some("cinelog".to_string());
        let client = Client::with_options(options)?;
        let db = client.database(db_name);

        // Fail at startup on a bad URL, not at the first query.
        db.run_command(doc! { "ping": 1 }, None).await?;

        info!("Connected to MongoDB database '{}'", db_name);
        Ok(Self { client, db })
    }

    pub(crate) fn users(&self) -> Collection<UserDoc> {
        self.db.collection("users")
    }

    pub(crate) fn movies(&self) -> Collection<MovieDoc> {
        self.db.collection("movies")
    }

    pub(crate) fn reviews(&self) -> Collection<ReviewDoc> {
        self.db.collection("reviews")
    }

    pub(crate) fn favorites(&self) -> Collection<FavoriteDoc> {
        self.db.collection("favorites")
    }

    /// Drains the driver's connection pool. Call once the HTTP server has
    /// finished shutting down.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        info!("Store shut down");
    }
}
