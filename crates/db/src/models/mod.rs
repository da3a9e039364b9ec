//! Row models and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` + `Serialize` structs matching database rows
//! - `Deserialize` create/update DTOs read from request bodies

pub mod activity;
pub mod follow;
pub mod import;
pub mod like;
pub mod list;
pub mod review;
pub mod social_link;
pub mod stats;
pub mod subscription;
pub mod user;
pub mod user_item;
