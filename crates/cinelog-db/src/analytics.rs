//! Aggregation pipelines behind the dashboard and analysis endpoints.
//!
//! Pipeline construction is kept in plain functions so the stage shapes can
//! be unit-tested without a running deployment; the `Store` methods only run
//! them and deserialize the rows.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use cinelog_analytics::trend::{DAY_FORMAT, MONTH_FORMAT};
use cinelog_types::api::{RatingDistribution, SentimentDistribution};
use cinelog_types::models::Sentiment;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};

use crate::rows::{
    AdminReviewRow, ContentRow, LabelCountRow, RatingCountRow, ReviewPageRow, SentimentCountRow,
    TopReviewerRow,
};
use crate::Store;

impl Store {
    /// Counts of stored sentiment labels, platform-wide or for one movie.
    pub async fn sentiment_counts(&self, movie_id: Option<i64>) -> Result<SentimentDistribution> {
        let cursor = self
            .reviews()
            .aggregate(sentiment_pipeline(movie_id), None)
            .await?;
        let rows: Vec<SentimentCountRow> = cursor.with_type().try_collect().await?;
        Ok(fold_sentiment_counts(&rows))
    }

    /// Sparse day-label map of review counts since `since`.
    pub async fn daily_review_counts(&self, since: DateTime<Utc>) -> Result<HashMap<String, i64>> {
        let cursor = self
            .reviews()
            .aggregate(daily_review_trend_pipeline(since), None)
            .await?;
        let rows: Vec<LabelCountRow> = cursor.with_type().try_collect().await?;
        Ok(into_sparse(rows))
    }

    /// Bodies of the most recent matching reviews, newest first, at most
    /// `cap` of them. Feeds the in-process keyword ranking.
    pub async fn review_contents(
        &self,
        movie_id: Option<i64>,
        since: Option<DateTime<Utc>>,
        cap: i64,
    ) -> Result<Vec<String>> {
        let cursor = self
            .reviews()
            .aggregate(review_contents_pipeline(movie_id, since, cap), None)
            .await?;
        let rows: Vec<ContentRow> = cursor.with_type().try_collect().await?;
        Ok(rows.into_iter().map(|row| row.content).collect())
    }

    /// Movie counts bucketed into whole-star ratings 1 through 5.
    pub async fn rating_distribution(&self) -> Result<RatingDistribution> {
        let cursor = self
            .movies()
            .aggregate(rating_counts_pipeline(), None)
            .await?;
        let rows: Vec<RatingCountRow> = cursor.with_type().try_collect().await?;
        Ok(fold_rating_counts(&rows))
    }

    /// Movie counts per genre, `"Action;Drama"` counting toward both.
    pub async fn genre_counts(&self, limit: Option<i64>) -> Result<Vec<LabelCountRow>> {
        let cursor = self
            .movies()
            .aggregate(genre_counts_pipeline(limit), None)
            .await?;
        Ok(cursor.with_type().try_collect().await?)
    }

    /// Sparse month-label map of movie releases since `since`.
    pub async fn monthly_release_counts(
        &self,
        since: DateTime<Utc>,
    ) -> Result<HashMap<String, i64>> {
        let cursor = self
            .movies()
            .aggregate(monthly_release_pipeline(since), None)
            .await?;
        let rows: Vec<LabelCountRow> = cursor.with_type().try_collect().await?;
        Ok(into_sparse(rows))
    }

    /// Sparse day-label map of distinct reviewing users since `since`.
    pub async fn daily_active_user_counts(
        &self,
        since: DateTime<Utc>,
    ) -> Result<HashMap<String, i64>> {
        let cursor = self
            .reviews()
            .aggregate(active_users_pipeline(since), None)
            .await?;
        let rows: Vec<LabelCountRow> = cursor.with_type().try_collect().await?;
        Ok(into_sparse(rows))
    }

    /// Sparse month-label map of account signups since `since`.
    pub async fn monthly_registration_counts(
        &self,
        since: DateTime<Utc>,
    ) -> Result<HashMap<String, i64>> {
        let cursor = self
            .users()
            .aggregate(monthly_registration_pipeline(since), None)
            .await?;
        let rows: Vec<LabelCountRow> = cursor.with_type().try_collect().await?;
        Ok(into_sparse(rows))
    }

    /// The most prolific reviewers with the titles they covered.
    pub async fn top_reviewers(&self, limit: i64) -> Result<Vec<TopReviewerRow>> {
        let cursor = self
            .reviews()
            .aggregate(top_reviewers_pipeline(limit), None)
            .await?;
        Ok(cursor.with_type().try_collect().await?)
    }

    /// One page of reviews plus the overall total, in a single round trip.
    pub async fn review_page(&self, skip: u64, limit: i64) -> Result<(i64, Vec<AdminReviewRow>)> {
        let mut cursor = self
            .reviews()
            .aggregate(review_page_pipeline(skip, limit), None)
            .await?
            .with_type::<ReviewPageRow>();
        let Some(row) = cursor.try_next().await? else {
            return Ok((0, Vec::new()));
        };
        let total = row.total.first().map(|count| count.total).unwrap_or(0);
        Ok((total, row.data))
    }
}

fn sentiment_pipeline(movie_id: Option<i64>) -> Vec<Document> {
    let mut pipeline = Vec::new();
    if let Some(movie_id) = movie_id {
        pipeline.push(doc! { "$match": { "movie_id": movie_id } });
    }
    pipeline.push(doc! { "$group": { "_id": "$sentiment", "count": { "$sum": 1 } } });
    pipeline
}

fn daily_review_trend_pipeline(since: DateTime<Utc>) -> Vec<Document> {
    vec![
        doc! { "$match": { "created_at": { "$gte": BsonDateTime::from_chrono(since) } } },
        doc! { "$group": {
            "_id": { "$dateToString": { "format": DAY_FORMAT, "date": "$created_at" } },
            "count": { "$sum": 1 },
        } },
        doc! { "$sort": { "_id": 1 } },
    ]
}

fn review_contents_pipeline(
    movie_id: Option<i64>,
    since: Option<DateTime<Utc>>,
    cap: i64,
) -> Vec<Document> {
    let mut filter = Document::new();
    if let Some(movie_id) = movie_id {
        filter.insert("movie_id", movie_id);
    }
    if let Some(since) = since {
        filter.insert("created_at", doc! { "$gte": BsonDateTime::from_chrono(since) });
    }

    let mut pipeline = Vec::new();
    if !filter.is_empty() {
        pipeline.push(doc! { "$match": filter });
    }
    pipeline.extend([
        doc! { "$sort": { "created_at": -1 } },
        doc! { "$limit": cap },
        doc! { "$project": { "_id": 0, "content": 1 } },
    ]);
    pipeline
}

fn rating_counts_pipeline() -> Vec<Document> {
    vec![doc! { "$group": { "_id": "$rating", "count": { "$sum": 1 } } }]
}

fn genre_counts_pipeline(limit: Option<i64>) -> Vec<Document> {
    let mut pipeline = vec![
        doc! { "$addFields": { "genre": { "$split": ["$genre", ";"] } } },
        doc! { "$unwind": "$genre" },
        doc! { "$group": { "_id": "$genre", "count": { "$sum": 1 } } },
        // Secondary key keeps equal counts in a stable order.
        doc! { "$sort": { "count": -1, "_id": 1 } },
    ];
    if let Some(limit) = limit {
        pipeline.push(doc! { "$limit": limit });
    }
    pipeline
}

fn monthly_release_pipeline(since: DateTime<Utc>) -> Vec<Document> {
    vec![
        doc! { "$match": { "release_date": { "$gte": BsonDateTime::from_chrono(since) } } },
        doc! { "$group": {
            "_id": { "$dateToString": { "format": MONTH_FORMAT, "date": "$release_date" } },
            "count": { "$sum": 1 },
        } },
        doc! { "$sort": { "_id": 1 } },
    ]
}

fn active_users_pipeline(since: DateTime<Utc>) -> Vec<Document> {
    vec![
        doc! { "$match": { "created_at": { "$gte": BsonDateTime::from_chrono(since) } } },
        // First pass: one document per (day, user); second pass counts them.
        doc! { "$group": {
            "_id": {
                "date": { "$dateToString": { "format": DAY_FORMAT, "date": "$created_at" } },
                "user": "$user_id",
            },
        } },
        doc! { "$group": { "_id": "$_id.date", "count": { "$sum": 1 } } },
        doc! { "$sort": { "_id": 1 } },
    ]
}

fn monthly_registration_pipeline(since: DateTime<Utc>) -> Vec<Document> {
    vec![
        doc! { "$match": { "created_at": { "$gte": BsonDateTime::from_chrono(since) } } },
        doc! { "$group": {
            "_id": { "$dateToString": { "format": MONTH_FORMAT, "date": "$created_at" } },
            "count": { "$sum": 1 },
        } },
        doc! { "$sort": { "_id": 1 } },
    ]
}

fn top_reviewers_pipeline(limit: i64) -> Vec<Document> {
    vec![
        doc! { "$group": {
            "_id": "$username",
            "review_count": { "$sum": 1 },
            "movie_ids": { "$addToSet": "$movie_id" },
        } },
        doc! { "$sort": { "review_count": -1, "_id": 1 } },
        doc! { "$limit": limit },
        doc! { "$lookup": {
            "from": "movies",
            "localField": "movie_ids",
            "foreignField": "movie_id",
            "as": "movies",
        } },
        doc! { "$project": { "review_count": 1, "movies": "$movies.title" } },
    ]
}

fn review_page_pipeline(skip: u64, limit: i64) -> Vec<Document> {
    vec![
        doc! { "$lookup": {
            "from": "movies",
            "localField": "movie_id",
            "foreignField": "movie_id",
            "as": "movie",
        } },
        // preserveNullAndEmptyArrays keeps reviews whose movie is gone.
        doc! { "$unwind": { "path": "$movie", "preserveNullAndEmptyArrays": true } },
        doc! { "$sort": { "created_at": -1 } },
        doc! { "$facet": {
            "total": [ { "$count": "total" } ],
            "data": [
                // Clamped; a cast that wrapped negative would abort the stage.
                { "$skip": skip.min(i64::MAX as u64) as i64 },
                { "$limit": limit },
                { "$project": {
                    "movie_id": 1,
                    "movie_title": "$movie.title",
                    "user_id": 1,
                    "username": 1,
                    "sentiment": 1,
                    "content": 1,
                    "created_at": 1,
                } },
            ],
        } },
    ]
}

fn into_sparse(rows: Vec<LabelCountRow>) -> HashMap<String, i64> {
    rows.into_iter().map(|row| (row.label, row.count)).collect()
}

fn fold_sentiment_counts(rows: &[SentimentCountRow]) -> SentimentDistribution {
    let mut dist = SentimentDistribution::default();
    for row in rows {
        match Sentiment::parse(&row.sentiment) {
            Some(Sentiment::Positive) => dist.positive += row.count,
            Some(Sentiment::Neutral) => dist.neutral += row.count,
            Some(Sentiment::Negative) => dist.negative += row.count,
            None => {}
        }
    }
    dist
}

fn fold_rating_counts(rows: &[RatingCountRow]) -> RatingDistribution {
    let mut counts = vec![0_i64; 5];
    for row in rows {
        let Some(rating) = row.rating else { continue };
        // 4.5 stars counts toward the 4 bucket; out-of-range data is skipped.
        let bucket = rating as i64;
        if (1..=5).contains(&bucket) {
            counts[(bucket - 1) as usize] += row.count;
        }
    }
    RatingDistribution {
        ratings: (1..=5).collect(),
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_pipeline_scopes_to_movie() {
        let global = sentiment_pipeline(None);
        assert_eq!(global.len(), 1);
        let group = global[0].get_document("$group").unwrap();
        assert_eq!(group.get_str("_id").unwrap(), "$sentiment");

        let scoped = sentiment_pipeline(Some(7));
        assert_eq!(scoped.len(), 2);
        let filter = scoped[0].get_document("$match").unwrap();
        assert_eq!(filter.get_i64("movie_id").unwrap(), 7);
    }

    #[test]
    fn test_daily_trend_pipeline_matches_fill_format() {
        let pipeline = daily_review_trend_pipeline(Utc::now());
        let group = pipeline[1].get_document("$group").unwrap();
        let date_to_string = group
            .get_document("_id")
            .unwrap()
            .get_document("$dateToString")
            .unwrap();
        assert_eq!(date_to_string.get_str("format").unwrap(), DAY_FORMAT);
        // Chronological output, so the sparse map is built from sorted rows.
        assert!(pipeline[2].contains_key("$sort"));
    }

    #[test]
    fn test_genre_pipeline_splits_on_semicolon() {
        let pipeline = genre_counts_pipeline(Some(10));
        let add_fields = pipeline[0].get_document("$addFields").unwrap();
        let split = add_fields
            .get_document("genre")
            .unwrap()
            .get_array("$split")
            .unwrap();
        assert_eq!(split[0].as_str().unwrap(), "$genre");
        assert_eq!(split[1].as_str().unwrap(), ";");
        assert_eq!(pipeline[1].get_str("$unwind").unwrap(), "$genre");
        assert_eq!(pipeline[4].get_i64("$limit").unwrap(), 10);

        // Without a limit the bucket list is complete.
        assert_eq!(genre_counts_pipeline(None).len(), 4);
    }

    #[test]
    fn test_review_contents_pipeline_is_bounded_and_projected() {
        let pipeline = review_contents_pipeline(None, None, 1000);
        // No filter, so the pipeline starts straight at the sort.
        assert!(pipeline[0].contains_key("$sort"));
        assert_eq!(pipeline[1].get_i64("$limit").unwrap(), 1000);
        let project = pipeline[2].get_document("$project").unwrap();
        assert_eq!(project.get_i32("content").unwrap(), 1);

        let scoped = review_contents_pipeline(Some(3), Some(Utc::now()), 500);
        let filter = scoped[0].get_document("$match").unwrap();
        assert_eq!(filter.get_i64("movie_id").unwrap(), 3);
        assert!(filter.get_document("created_at").unwrap().contains_key("$gte"));
    }

    #[test]
    fn test_active_users_pipeline_double_groups() {
        let pipeline = active_users_pipeline(Utc::now());
        let first = pipeline[1].get_document("$group").unwrap();
        let key = first.get_document("_id").unwrap();
        assert!(key.contains_key("date"));
        assert_eq!(key.get_str("user").unwrap(), "$user_id");
        let second = pipeline[2].get_document("$group").unwrap();
        assert_eq!(second.get_str("_id").unwrap(), "$_id.date");
    }

    #[test]
    fn test_top_reviewers_pipeline_joins_titles() {
        let pipeline = top_reviewers_pipeline(10);
        assert_eq!(pipeline[2].get_i64("$limit").unwrap(), 10);
        let lookup = pipeline[3].get_document("$lookup").unwrap();
        assert_eq!(lookup.get_str("from").unwrap(), "movies");
        assert_eq!(lookup.get_str("localField").unwrap(), "movie_ids");
        let project = pipeline[4].get_document("$project").unwrap();
        assert_eq!(project.get_str("movies").unwrap(), "$movies.title");
    }

    #[test]
    fn test_review_page_pipeline_facets_total_and_data() {
        let pipeline = review_page_pipeline(40, 20);
        assert!(pipeline[0].contains_key("$lookup"));
        let unwind = pipeline[1].get_document("$unwind").unwrap();
        assert!(unwind.get_bool("preserveNullAndEmptyArrays").unwrap());
        assert!(pipeline[2].contains_key("$sort"));

        let facet = pipeline[3].get_document("$facet").unwrap();
        let total = facet.get_array("total").unwrap();
        assert!(total[0].as_document().unwrap().contains_key("$count"));
        let data = facet.get_array("data").unwrap();
        assert_eq!(data[0].as_document().unwrap().get_i64("$skip").unwrap(), 40);
        assert_eq!(data[1].as_document().unwrap().get_i64("$limit").unwrap(), 20);
    }

    #[test]
    fn test_review_page_pipeline_clamps_huge_skip() {
        // Above i64::MAX the cast would wrap negative without the clamp.
        let pipeline = review_page_pipeline(u64::MAX, 20);
        let facet = pipeline[3].get_document("$facet").unwrap();
        let data = facet.get_array("data").unwrap();
        let skip = data[0].as_document().unwrap().get_i64("$skip").unwrap();
        assert_eq!(skip, i64::MAX);
    }

    #[test]
    fn test_fold_sentiment_counts_skips_unknown_labels() {
        let rows = vec![
            SentimentCountRow { sentiment: "positive".into(), count: 12 },
            SentimentCountRow { sentiment: "negative".into(), count: 4 },
            SentimentCountRow { sentiment: "ecstatic".into(), count: 99 },
        ];
        let dist = fold_sentiment_counts(&rows);
        assert_eq!(dist.positive, 12);
        assert_eq!(dist.neutral, 0);
        assert_eq!(dist.negative, 4);
    }

    #[test]
    fn test_fold_rating_counts_accumulates_within_bucket() {
        let rows = vec![
            RatingCountRow { rating: Some(4.2), count: 3 },
            RatingCountRow { rating: Some(4.7), count: 2 },
            RatingCountRow { rating: Some(5.0), count: 1 },
            RatingCountRow { rating: Some(0.5), count: 8 },
            RatingCountRow { rating: None, count: 6 },
        ];
        let dist = fold_rating_counts(&rows);
        assert_eq!(dist.ratings, vec![1, 2, 3, 4, 5]);
        assert_eq!(dist.counts, vec![0, 0, 0, 5, 1]);
    }
}
