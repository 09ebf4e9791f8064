//! Team and release rating endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, IdQuery, ReleaseResponse, TeamResponse};
use crate::domain::{ReleaseId, TeamId};

fn parse_id(query: &IdQuery, subject: &str) -> Result<i32, ApiError> {
    let raw = match query.id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(ApiError::bad_request(format!("{} ID is not set.", subject)).with_param("id")),
    };

    raw.parse::<i32>().map_err(|_| {
        ApiError::bad_request(format!("{} ID should be an integer.", subject)).with_param("id")
    })
}

/// GET /team?id=<team id>
pub async fn get_team(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team_id = TeamId::new(parse_id(&query, "Team")?);
    debug!(team_id = %team_id, "Getting team releases");

    let name = state
        .queries
        .team_name(team_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Team {} not found", team_id)))?;

    let releases = state.queries.releases_for_team(team_id).await?;

    Ok(Json(TeamResponse {
        team_id,
        name,
        releases,
    }))
}

/// GET /release?id=<release id>
pub async fn get_release(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<ReleaseResponse>, ApiError> {
    let release_id = ReleaseId::new(parse_id(&query, "Release")?);
    debug!(release_id = %release_id, "Getting release standings");

    let teams = state.queries.teams_for_release(release_id).await?;

    Ok(Json(ReleaseResponse { release_id, teams }))
}
