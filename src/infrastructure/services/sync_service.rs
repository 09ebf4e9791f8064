//! Sync service - enumerate teams, fan out rating fetches, transform and load

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::domain::rating::{
    transform, ConcurrencyLimiter, FetchOutcome, RatingSource, TeamId, TeamRelease,
};
use crate::domain::release_table::ReleaseTableStore;
use crate::domain::team::TeamRepository;
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_sync_run, record_team_fetch};

use super::bulk_loader::BulkLoader;

/// Sync pipeline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Maximum simultaneous rating requests
    pub concurrency: usize,
    /// Live table name, optionally schema-qualified
    pub table: String,
    /// Directory holding `tables/<table>.sql`, `indexes.sql` and `functions.sql`
    pub sql_dir: PathBuf,
    /// Log progress every N completed teams (0 disables)
    pub progress_every: usize,
    /// Rows per COPY buffer
    pub copy_chunk_rows: usize,
    /// When set, `serve` also syncs on this interval
    pub schedule_interval_secs: Option<u64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: 100,
            table: "team_releases".to_string(),
            sql_dir: PathBuf::from("sql"),
            progress_every: 100,
            copy_chunk_rows: 10_000,
            schedule_interval_secs: None,
        }
    }
}

/// Normalized records of all teams, plus per-team outcome counts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedBatch {
    pub records: Vec<TeamRelease>,
    pub teams_total: usize,
    /// Teams the service answered 200 for
    pub teams_with_data: usize,
    /// Teams answered with a non-200 status
    pub teams_skipped: usize,
    /// Teams whose retries ran out or whose payload was unusable
    pub teams_failed: usize,
}

/// Final report of one sync run
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub teams_total: usize,
    pub teams_with_data: usize,
    pub teams_skipped: usize,
    pub teams_failed: usize,
    pub records_loaded: u64,
    pub warnings: Vec<String>,
    pub duration: Duration,
}

impl SyncReport {
    fn new(batch: &CollectedBatch, records_loaded: u64, warnings: Vec<String>, duration: Duration) -> Self {
        Self {
            teams_total: batch.teams_total,
            teams_with_data: batch.teams_with_data,
            teams_skipped: batch.teams_skipped,
            teams_failed: batch.teams_failed,
            records_loaded,
            warnings,
            duration,
        }
    }
}

enum TeamResult {
    Records(Vec<TeamRelease>),
    Skipped(u16),
    Failed(String),
}

fn resolve(outcome: FetchOutcome) -> TeamResult {
    match outcome {
        FetchOutcome::Fetched(entries) => match transform(&entries) {
            Ok(releases) => TeamResult::Records(releases),
            Err(e) => TeamResult::Failed(e.to_string()),
        },
        FetchOutcome::Skipped { status } => TeamResult::Skipped(status),
        FetchOutcome::Failed { reason, .. } => TeamResult::Failed(reason),
    }
}

/// Orchestrates one full synchronization run
#[derive(Clone)]
pub struct SyncService {
    teams: Arc<dyn TeamRepository>,
    ratings: Arc<dyn RatingSource>,
    concurrency: usize,
    progress_every: usize,
}

impl std::fmt::Debug for SyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncService")
            .field("ratings", &self.ratings)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl SyncService {
    pub fn new(
        teams: Arc<dyn TeamRepository>,
        ratings: Arc<dyn RatingSource>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            teams,
            ratings,
            concurrency: config.concurrency,
            progress_every: config.progress_every,
        }
    }

    /// Enumerate teams and fetch/transform every team's ratings.
    ///
    /// Returns only once every fan-out task has resolved.
    pub async fn collect(&self) -> Result<CollectedBatch, DomainError> {
        let listed = self.teams.list_ids().await?;
        let listed_count = listed.len();
        let team_ids: BTreeSet<TeamId> = listed.into_iter().collect();
        let total = team_ids.len();

        if total < listed_count {
            warn!(
                listed = listed_count,
                unique = total,
                "Duplicate team ids ignored"
            );
        }
        let limiter = ConcurrencyLimiter::new(self.concurrency);

        info!(teams = total, concurrency = limiter.capacity(), "Fetching ratings");

        let mut join_set: JoinSet<(TeamId, TeamResult)> = JoinSet::new();

        for team_id in team_ids {
            let ratings = Arc::clone(&self.ratings);
            let limiter = limiter.clone();

            join_set.spawn(async move {
                let outcome = ratings.fetch(team_id, &limiter).await;
                record_team_fetch(outcome.label());
                (team_id, resolve(outcome))
            });
        }

        let mut per_team: BTreeMap<TeamId, Vec<TeamRelease>> = BTreeMap::new();
        let mut batch = CollectedBatch {
            teams_total: total,
            ..Default::default()
        };
        let mut completed = 0usize;

        while let Some(joined) = join_set.join_next().await {
            completed += 1;

            if self.progress_every > 0 && completed % self.progress_every == 0 {
                info!(completed = completed, total = total, "Rating fetch progress");
            }

            match joined {
                Ok((team_id, TeamResult::Records(releases))) => {
                    batch.teams_with_data += 1;
                    per_team.insert(team_id, releases);
                }
                Ok((team_id, TeamResult::Skipped(status))) => {
                    debug!(team_id = %team_id, status = status, "Team skipped");
                    batch.teams_skipped += 1;
                }
                Ok((team_id, TeamResult::Failed(reason))) => {
                    warn!(team_id = %team_id, reason = %reason, "Team contributes no records");
                    batch.teams_failed += 1;
                }
                Err(join_error) => {
                    warn!(error = %join_error, "Fetch task failed");
                    batch.teams_failed += 1;
                }
            }
        }

        batch.records = per_team.into_values().flatten().collect();

        info!(
            teams = total,
            with_data = batch.teams_with_data,
            skipped = batch.teams_skipped,
            failed = batch.teams_failed,
            records = batch.records.len(),
            "Ratings collected"
        );

        Ok(batch)
    }

    /// Run enumerate → fetch → transform → load and report the outcome
    pub async fn run<S: ReleaseTableStore>(
        &self,
        loader: &mut BulkLoader<S>,
    ) -> Result<SyncReport, DomainError> {
        let started = Instant::now();

        let result = async {
            let batch = self.collect().await?;
            let load = loader.load(&batch.records).await?;
            Ok::<_, DomainError>(SyncReport::new(
                &batch,
                load.rows_copied,
                load.warnings,
                started.elapsed(),
            ))
        }
        .await;

        match &result {
            Ok(report) => {
                record_sync_run(true, report.records_loaded, report.duration);
                info!(
                    teams = report.teams_total,
                    with_data = report.teams_with_data,
                    skipped = report.teams_skipped,
                    failed = report.teams_failed,
                    records = report.records_loaded,
                    warnings = report.warnings.len(),
                    duration_ms = report.duration.as_millis() as u64,
                    "Sync finished"
                );
            }
            Err(e) => {
                record_sync_run(false, 0, started.elapsed());
                error!(error = %e, "Sync aborted");
            }
        }

        result
    }
}
