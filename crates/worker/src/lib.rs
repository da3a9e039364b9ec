//! Asynchronous resolution of imported watch history.
//!
//! The API decodes an upload, stores one row per title and publishes a queue
//! message per row. Consumers here match each title against TMDB, add it to
//! the user's collection and roll the outcome up into the import status.

pub mod config;
pub mod consumer;
pub mod queue;
pub mod runner;
