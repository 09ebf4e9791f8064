//! Domain layer - Core business logic and entities

pub mod error;
pub mod rating;
pub mod release_table;
pub mod team;

pub use error::DomainError;
pub use rating::{
    transform, ConcurrencyLimiter, FetchOutcome, RatingSource, RawRatingEntry, ReleaseId,
    RetryConfig, TeamId, TeamRelease,
};
pub use release_table::{FunctionsOutcome, ReleaseTableStore, SwapStep, TableName};
pub use team::{RatingQueries, ReleaseStanding, TeamReleaseMedian, TeamRepository};
