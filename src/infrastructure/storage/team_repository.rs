//! PostgreSQL team repository - enumeration and read queries

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use tracing::info;

use crate::domain::rating::{ReleaseId, TeamId};
use crate::domain::team::{RatingQueries, ReleaseStanding, TeamReleaseMedian, TeamRepository};
use crate::domain::DomainError;

/// Team repository over the `teams` and `medians` tables
#[derive(Debug, Clone)]
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn release_median_from_row(row: &PgRow) -> Result<TeamReleaseMedian, sqlx::Error> {
    Ok(TeamReleaseMedian {
        release_date: row.try_get("release_date")?,
        release_id: ReleaseId::new(row.try_get("release_id")?),
        three_months: row.try_get("three_months")?,
        twelve_months: row.try_get("twelve_months")?,
    })
}

fn standing_from_row(row: &PgRow) -> Result<ReleaseStanding, sqlx::Error> {
    Ok(ReleaseStanding {
        team_id: TeamId::new(row.try_get("team_id")?),
        team_name: row.try_get("team_name")?,
        three_months: row.try_get("three_months")?,
        twelve_months: row.try_get("twelve_months")?,
    })
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn list_ids(&self) -> Result<Vec<TeamId>, DomainError> {
        info!("Getting list of teams");

        let ids: Vec<i32> = sqlx::query_scalar("SELECT DISTINCT ratingid FROM teams")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list teams: {}", e)))?;

        info!(teams = ids.len(), "Active teams loaded");

        Ok(ids.into_iter().map(TeamId::new).collect())
    }
}

#[async_trait]
impl RatingQueries for PostgresTeamRepository {
    async fn team_name(&self, team_id: TeamId) -> Result<Option<String>, DomainError> {
        sqlx::query_scalar("SELECT name FROM teams WHERE ratingid = $1")
            .bind(team_id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get team name: {}", e)))
    }

    async fn releases_for_team(
        &self,
        team_id: TeamId,
    ) -> Result<Vec<TeamReleaseMedian>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT release_date, release_id,
                three_months::float8 AS three_months,
                twelve_months::float8 AS twelve_months
            FROM medians
            WHERE team_id = $1
            ORDER BY release_date DESC
            "#,
        )
        .bind(team_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get team releases: {}", e)))?;

        rows.iter()
            .map(release_median_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| DomainError::storage(format!("Failed to decode team release: {}", e)))
    }

    async fn teams_for_release(
        &self,
        release_id: ReleaseId,
    ) -> Result<Vec<ReleaseStanding>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT team_id, team_name,
                three_months::float8 AS three_months,
                twelve_months::float8 AS twelve_months
            FROM medians
            WHERE release_id = $1
            ORDER BY three_months DESC
            "#,
        )
        .bind(release_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get release teams: {}", e)))?;

        rows.iter()
            .map(standing_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| DomainError::storage(format!("Failed to decode release team: {}", e)))
    }
}
