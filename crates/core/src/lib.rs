//! Domain types and pure logic for the Plotwist backend.

pub mod accounts;
pub mod enums;
pub mod error;
pub mod imports;
pub mod pagination;
pub mod stats;
pub mod subscriptions;
pub mod types;
pub mod webhook_signature;
