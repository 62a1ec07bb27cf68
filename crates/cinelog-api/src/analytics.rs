//! Admin dashboard aggregates.
//!
//! Each handler stitches together aggregation counts from the store with the
//! gap-filling and keyword ranking in `cinelog-analytics`, so the frontend
//! receives dense, chart-ready series.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use cinelog_analytics::{keywords, trend};
use cinelog_types::api::{
    AdminReviewEntry, DateSeries, GenreDistribution, KeywordEntry, MonthSeries, MovieAnalytics,
    PageQuery, ReviewAnalytics, ReviewPage, UserAnalytics, UserBehaviors,
};

use crate::error::ApiError;
use crate::middleware::{ensure_admin, CurrentUser};
use crate::state::AppState;
use crate::MAX_PAGE_SIZE;

/// Newest reviews consulted for keyword and word-cloud extraction.
pub(crate) const REVIEW_SAMPLE_CAP: i64 = 1000;

const TREND_DAYS: usize = 30;
const TREND_MONTHS: usize = 12;
const KEYWORD_COUNT: usize = 50;
const GENRE_BUCKETS: i64 = 10;

fn day_start_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Sentiment split, 30-day review trend, and keywords from recent reviews.
pub async fn review_analytics(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ReviewAnalytics>, ApiError> {
    ensure_admin(&user)?;

    let today = Utc::now().date_naive();
    let start = trend::daily_window_start(today, TREND_DAYS);
    let since = day_start_utc(start);

    let sentiment_distribution = state.store.sentiment_counts(None).await?;

    let sparse = state.store.daily_review_counts(since).await?;
    let series = trend::fill_days(start, TREND_DAYS, &sparse);
    let review_trend = DateSeries {
        dates: series.labels,
        counts: series.counts,
    };

    let contents = state
        .store
        .review_contents(None, Some(since), REVIEW_SAMPLE_CAP)
        .await?;
    let text = contents.join(" ");
    let keywords = keywords::extract_keywords(&text, KEYWORD_COUNT)
        .into_iter()
        .map(|k| KeywordEntry {
            word: k.word,
            weight: k.weight,
        })
        .collect();

    Ok(Json(ReviewAnalytics {
        sentiment_distribution,
        review_trend,
        keywords,
    }))
}

/// Rating histogram, top genres, and the 12-month release trend.
pub async fn movie_analytics(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<MovieAnalytics>, ApiError> {
    ensure_admin(&user)?;

    let rating_distribution = state.store.rating_distribution().await?;

    let (genres, counts) = state
        .store
        .genre_counts(Some(GENRE_BUCKETS))
        .await?
        .into_iter()
        .map(|row| (row.label, row.count))
        .unzip();
    let genre_distribution = GenreDistribution { genres, counts };

    let today = Utc::now().date_naive();
    let start = trend::monthly_window_start(today, TREND_MONTHS);
    let sparse = state
        .store
        .monthly_release_counts(day_start_utc(start))
        .await?;
    let series = trend::fill_months(start, TREND_MONTHS, &sparse);
    let release_trend = MonthSeries {
        months: series.labels,
        counts: series.counts,
    };

    Ok(Json(MovieAnalytics {
        rating_distribution,
        genre_distribution,
        release_trend,
    }))
}

/// Daily active reviewers, monthly registrations, and headline totals.
pub async fn user_analytics(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<UserAnalytics>, ApiError> {
    ensure_admin(&user)?;

    let today = Utc::now().date_naive();

    let day_start = trend::daily_window_start(today, TREND_DAYS);
    let sparse = state
        .store
        .daily_active_user_counts(day_start_utc(day_start))
        .await?;
    let series = trend::fill_days(day_start, TREND_DAYS, &sparse);
    let activity_data = DateSeries {
        dates: series.labels,
        counts: series.counts,
    };

    let month_start = trend::monthly_window_start(today, TREND_MONTHS);
    let sparse = state
        .store
        .monthly_registration_counts(day_start_utc(month_start))
        .await?;
    let series = trend::fill_months(month_start, TREND_MONTHS, &sparse);
    let registration_trend = MonthSeries {
        months: series.labels,
        counts: series.counts,
    };

    let user_behaviors = UserBehaviors {
        reviews: state.store.count_reviews().await? as i64,
        favorites: state.store.count_users_with_favorites().await? as i64,
        total_users: state.store.count_users().await? as i64,
    };

    Ok(Json(UserAnalytics {
        activity_data,
        registration_trend,
        user_behaviors,
    }))
}

/// Paginated review listing with denormalized movie titles.
pub async fn review_listing(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ReviewPage>, ApiError> {
    ensure_admin(&user)?;

    let limit = query.limit.clamp(1, MAX_PAGE_SIZE);
    let (total, rows) = state.store.review_page(query.skip, limit).await?;
    let data = rows
        .into_iter()
        .map(|row| AdminReviewEntry {
            id: row.id,
            movie_id: row.movie_id,
            movie_title: row.movie_title,
            user_id: row.user_id,
            username: row.username,
            sentiment: row.sentiment,
            content: row.content,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ReviewPage { total, data }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_start_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let at = day_start_utc(date);
        assert_eq!(at.to_rfc3339(), "2024-03-09T00:00:00+00:00");
    }

    #[test]
    fn test_trend_window_covers_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let start = trend::daily_window_start(today, TREND_DAYS);
        let series = trend::fill_days(start, TREND_DAYS, &Default::default());
        assert_eq!(series.labels.len(), TREND_DAYS);
        assert_eq!(series.labels.last().map(String::as_str), Some("2024-03-09"));
    }
}
