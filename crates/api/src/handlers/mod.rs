pub mod activities;
pub mod auth;
pub mod follows;
pub mod imports;
pub mod likes;
pub mod lists;
pub mod reviews;
pub mod stats;
pub mod subscriptions;
pub mod user_items;
pub mod users;
