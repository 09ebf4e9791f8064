//! Rating sync
//!
//! Refreshes the team release ratings table from the public rating service:
//! - Enumerates teams from Postgres and fetches every team's rating history concurrently
//! - Keeps canonical-formula entries and normalizes them into release records
//! - Replaces the live table through a shadow-table swap so readers never see a partial table
//! - Serves the finished ratings over a small read API

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
