//! Response bodies of the rating endpoints

use serde::{Deserialize, Serialize};

use crate::domain::team::{ReleaseStanding, TeamReleaseMedian};
use crate::domain::{ReleaseId, TeamId};

/// Raw `?id=` query parameter, parsed by the handler
#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// GET /team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamResponse {
    pub team_id: TeamId,
    pub name: String,
    pub releases: Vec<TeamReleaseMedian>,
}

/// GET /release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseResponse {
    pub release_id: ReleaseId,
    pub teams: Vec<ReleaseStanding>,
}
