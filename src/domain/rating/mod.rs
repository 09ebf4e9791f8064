//! Rating domain - remote rating payloads, normalized releases and fetch policy

mod entity;
mod limiter;
mod retry;
mod source;
mod transform;

pub use entity::{
    RawNumber, RawRatingEntry, ReleaseId, TeamId, TeamRelease, CANONICAL_FORMULA,
    RELEASE_DATE_FORMAT,
};
pub use limiter::ConcurrencyLimiter;
pub use retry::RetryConfig;
pub use source::{FetchOutcome, RatingSource};
pub use transform::transform;

#[cfg(test)]
pub use source::mock;
