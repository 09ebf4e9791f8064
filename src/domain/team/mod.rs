//! Team domain - enumeration of synchronized teams and read-side views

mod entity;
mod repository;

pub use entity::{ReleaseStanding, TeamReleaseMedian};
pub use repository::{RatingQueries, TeamRepository};

#[cfg(test)]
pub use repository::{mock, MockTeamRepository};
