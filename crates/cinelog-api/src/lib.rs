pub mod analysis;
pub mod analytics;
pub mod auth;
pub mod config;
pub mod error;
pub mod favorites;
pub mod middleware;
pub mod movies;
pub mod reviews;
pub mod state;
pub mod users;

/// Hard ceiling on `limit` for every paginated listing.
pub const MAX_PAGE_SIZE: i64 = 100;
