//! Team repository traits

use async_trait::async_trait;

use super::entity::{ReleaseStanding, TeamReleaseMedian};
use crate::domain::rating::{ReleaseId, TeamId};
use crate::domain::DomainError;

/// Source of the team identifiers to synchronize
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// All known team identifiers, unfiltered
    async fn list_ids(&self) -> Result<Vec<TeamId>, DomainError>;
}

/// Read queries over the live rating tables
#[async_trait]
pub trait RatingQueries: Send + Sync + std::fmt::Debug {
    /// Team display name, `None` for unknown teams
    async fn team_name(&self, team_id: TeamId) -> Result<Option<String>, DomainError>;

    /// All releases of a team, newest first
    async fn releases_for_team(
        &self,
        team_id: TeamId,
    ) -> Result<Vec<TeamReleaseMedian>, DomainError>;

    /// All teams of a release, best three-month median first
    async fn teams_for_release(
        &self,
        release_id: ReleaseId,
    ) -> Result<Vec<ReleaseStanding>, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use std::collections::HashMap;

    use super::*;

    /// In-memory read model for handler tests
    #[derive(Debug, Default)]
    pub struct MockRatingQueries {
        pub names: HashMap<TeamId, String>,
        pub team_releases: HashMap<TeamId, Vec<TeamReleaseMedian>>,
        pub release_standings: HashMap<ReleaseId, Vec<ReleaseStanding>>,
        pub fail: bool,
    }

    impl MockRatingQueries {
        pub fn new() -> Self {
            Self::default()
        }

        fn check(&self) -> Result<(), DomainError> {
            if self.fail {
                return Err(DomainError::storage("connection refused"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RatingQueries for MockRatingQueries {
        async fn team_name(&self, team_id: TeamId) -> Result<Option<String>, DomainError> {
            self.check()?;
            Ok(self.names.get(&team_id).cloned())
        }

        async fn releases_for_team(
            &self,
            team_id: TeamId,
        ) -> Result<Vec<TeamReleaseMedian>, DomainError> {
            self.check()?;
            Ok(self.team_releases.get(&team_id).cloned().unwrap_or_default())
        }

        async fn teams_for_release(
            &self,
            release_id: ReleaseId,
        ) -> Result<Vec<ReleaseStanding>, DomainError> {
            self.check()?;
            Ok(self
                .release_standings
                .get(&release_id)
                .cloned()
                .unwrap_or_default())
        }
    }
}
