//! Storage infrastructure - PostgreSQL and in-memory implementations

mod in_memory;
mod postgres;
mod release_table;
mod sql_scripts;
mod team_repository;

pub use in_memory::InMemoryReleaseTableStore;
pub use postgres::PostgresConfig;
pub use release_table::{PostgresReleaseTableStore, RELEASE_COLUMNS};
pub use sql_scripts::SqlScripts;
pub use team_repository::PostgresTeamRepository;
