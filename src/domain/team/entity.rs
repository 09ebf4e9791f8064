//! Read-side views over the finished rating tables

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::rating::{ReleaseId, TeamId};

/// One release of a team with its rolling rating medians
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamReleaseMedian {
    pub release_date: NaiveDate,
    pub release_id: ReleaseId,
    pub three_months: Option<f64>,
    pub twelve_months: Option<f64>,
}

/// One team's standing in a release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseStanding {
    pub team_id: TeamId,
    pub team_name: Option<String>,
    pub three_months: Option<f64>,
    pub twelve_months: Option<f64>,
}
