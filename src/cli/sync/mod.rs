//! Sync command - runs the pipeline once

use std::sync::Arc;

use clap::Args;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::release_table::TableName;
use crate::domain::DomainError;
use crate::infrastructure::rating::HttpRatingClient;
use crate::infrastructure::services::{BulkLoader, SyncReport, SyncService};
use crate::infrastructure::storage::{
    InMemoryReleaseTableStore, PostgresReleaseTableStore, PostgresTeamRepository, SqlScripts,
};

#[derive(Debug, Clone, Default, Args)]
pub struct SyncArgs {
    /// Fetch and transform, but load into memory instead of the live table
    #[arg(long)]
    pub dry_run: bool,
}

/// Run one synchronization and exit
pub async fn run(args: SyncArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let pool = config.database.connect().await?;

    let report = if args.dry_run {
        info!("Dry run: the live table will not be touched");
        run_dry(&config, pool).await?
    } else {
        run_once(&config, pool).await?
    };

    if !report.warnings.is_empty() {
        warn!(warnings = ?report.warnings, "Sync finished with warnings");
    }

    Ok(())
}

fn build_service(config: &AppConfig, pool: PgPool) -> Result<SyncService, DomainError> {
    let teams = Arc::new(PostgresTeamRepository::new(pool));
    let ratings = Arc::new(HttpRatingClient::new(&config.rating_api)?);

    Ok(SyncService::new(teams, ratings, &config.sync))
}

async fn prepare(config: &AppConfig) -> Result<(TableName, SqlScripts), DomainError> {
    let table = TableName::new(&config.sync.table)?;
    // Loaded before fetching so a missing script fails fast
    let scripts = SqlScripts::load(&config.sync.sql_dir, &table).await?;

    Ok((table, scripts))
}

/// Full run against Postgres: the live table is replaced on success
pub async fn run_once(config: &AppConfig, pool: PgPool) -> Result<SyncReport, DomainError> {
    let (table, scripts) = prepare(config).await?;
    let service = build_service(config, pool.clone())?;

    // Takes its connection on Stage, after all ratings are fetched
    let store = PostgresReleaseTableStore::new(pool).with_chunk_rows(config.sync.copy_chunk_rows);
    let mut loader = BulkLoader::new(store, table, scripts);

    service.run(&mut loader).await
}

async fn run_dry(config: &AppConfig, pool: PgPool) -> Result<SyncReport, DomainError> {
    let (table, scripts) = prepare(config).await?;
    let service = build_service(config, pool)?;

    let mut loader = BulkLoader::new(InMemoryReleaseTableStore::new(), table, scripts);
    service.run(&mut loader).await
}
