//! Domain operations that span several repositories or call third parties.
//!
//! Handlers stay thin: they extract and authorize, then delegate here or
//! straight to a repository.

pub mod activities;
pub mod imports;
pub mod stats;
pub mod subscriptions;
pub mod user_items;
