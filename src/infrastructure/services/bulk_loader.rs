//! Bulk loader - drives the shadow-table swap step by step

use tracing::{error, info, warn};

use crate::domain::rating::TeamRelease;
use crate::domain::release_table::{FunctionsOutcome, ReleaseTableStore, SwapStep, TableName};
use crate::domain::DomainError;
use crate::infrastructure::storage::SqlScripts;

/// Outcome of a completed load
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub table: String,
    pub rows_copied: u64,
    pub completed_steps: Vec<SwapStep>,
    /// Non-fatal failures after promotion
    pub warnings: Vec<String>,
    pub functions: Option<FunctionsOutcome>,
}

impl LoadReport {
    fn new(table: &TableName) -> Self {
        Self {
            table: table.qualified(),
            rows_copied: 0,
            completed_steps: Vec::new(),
            warnings: Vec::new(),
            functions: None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Loads a full batch into the live table through Stage → Copy → Promote → Retire → Rebuild
///
/// Failures of Stage, Copy and Promote abort the load and leave the live table as it
/// was before promotion. Failures of Retire and Rebuild are logged and reported as
/// warnings; the new data is already live at that point.
#[derive(Debug)]
pub struct BulkLoader<S: ReleaseTableStore> {
    store: S,
    table: TableName,
    scripts: SqlScripts,
}

impl<S: ReleaseTableStore> BulkLoader<S> {
    pub fn new(store: S, table: TableName, scripts: SqlScripts) -> Self {
        Self {
            store,
            table,
            scripts,
        }
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub async fn load(&mut self, records: &[TeamRelease]) -> Result<LoadReport, DomainError> {
        let mut report = LoadReport::new(&self.table);
        let mut step = Some(SwapStep::Stage);

        while let Some(current) = step {
            match self.run_step(current, records, &mut report).await {
                Ok(summary) => {
                    info!(table = %self.table, step = %current, "{}", summary);
                    report.completed_steps.push(current);
                }
                Err(e) if current.is_fatal() => {
                    error!(table = %self.table, step = %current, error = %e, "Table swap aborted");
                    return Err(DomainError::swap(current, e.to_string()));
                }
                Err(e) => {
                    warn!(table = %self.table, step = %current, error = %e, "Table swap step failed");
                    report.warnings.push(format!("{}: {}", current, e));
                }
            }

            step = current.next();
        }

        Ok(report)
    }

    async fn run_step(
        &mut self,
        step: SwapStep,
        records: &[TeamRelease],
        report: &mut LoadReport,
    ) -> Result<String, DomainError> {
        match step {
            SwapStep::Stage => {
                self.store
                    .stage(&self.table, &self.scripts.table_schema)
                    .await?;
                Ok(format!("Created {} table", self.table.temp()))
            }
            SwapStep::Copy => {
                let rows = self.store.copy(&self.table, records).await?;
                report.rows_copied = rows;
                Ok(format!("Copied {} records to {}", rows, self.table.temp()))
            }
            SwapStep::Promote => {
                self.store.promote(&self.table).await?;
                Ok(format!("Replaced {} with the new one", self.table))
            }
            SwapStep::Retire => {
                self.store.retire(&self.table).await?;
                Ok(format!("Dropped {}", self.table.old()))
            }
            SwapStep::Rebuild => {
                // The retired table still owns the index names, so IF NOT EXISTS skips them
                if !report.completed_steps.contains(&SwapStep::Retire) {
                    report.warnings.push(format!(
                        "{}: {} still exists; indexes sharing its names were not recreated on {}",
                        SwapStep::Rebuild,
                        self.table.old(),
                        self.table
                    ));
                }

                // Functions are attempted even when indexes fail
                let indexes = self.store.apply_indexes(&self.scripts.indexes).await;
                let functions = self.store.create_functions(&self.scripts.functions).await;

                match (indexes, functions) {
                    (Ok(()), Ok(outcome)) => {
                        report.functions = Some(outcome);
                        Ok(match outcome {
                            FunctionsOutcome::Created => "Recreated indexes and SQL functions",
                            FunctionsOutcome::AlreadyExisted => {
                                "Recreated indexes, SQL functions already existed"
                            }
                        }
                        .to_string())
                    }
                    (Err(e), Ok(outcome)) => {
                        report.functions = Some(outcome);
                        Err(e)
                    }
                    (Ok(()), Err(e)) => Err(e),
                    (Err(index_error), Err(function_error)) => Err(DomainError::storage(
                        format!("{}; {}", index_error, function_error),
                    )),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::infrastructure::storage::InMemoryReleaseTableStore;

    fn table() -> TableName {
        TableName::new("team_releases").unwrap()
    }

    fn scripts() -> SqlScripts {
        SqlScripts::new(
            "team_id int, release_id int, release_date date, rating int",
            "CREATE INDEX IF NOT EXISTS i ON team_releases (team_id)",
            "CREATE FUNCTION f() RETURNS int LANGUAGE sql AS $$ SELECT 1 $$",
        )
    }

    fn records(team: i32, count: i32) -> Vec<TeamRelease> {
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        (0..count)
            .map(|i| {
                TeamRelease::new(
                    team,
                    i,
                    start + chrono::Days::new(i as u64),
                    1000 + i,
                )
            })
            .collect()
    }

    fn loader(store: InMemoryReleaseTableStore) -> BulkLoader<InMemoryReleaseTableStore> {
        BulkLoader::new(store, table(), scripts())
    }

    #[tokio::test]
    async fn test_load_replaces_live_table() {
        let store = InMemoryReleaseTableStore::with_live_table(&table(), records(1, 3));
        let mut loader = loader(store.clone());

        let batch = records(2, 5);
        let report = loader.load(&batch).await.unwrap();

        assert_eq!(report.rows_copied, 5);
        assert_eq!(report.completed_steps, SwapStep::ALL.to_vec());
        assert!(!report.is_degraded());
        assert_eq!(report.functions, Some(FunctionsOutcome::Created));

        assert_eq!(store.read("team_releases").unwrap().unwrap(), batch);
        assert!(!store.exists("team_releases_temp").unwrap());
        assert!(!store.exists("team_releases_old").unwrap());
        assert_eq!(store.index_builds().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch_runs_every_step() {
        let store = InMemoryReleaseTableStore::with_live_table(&table(), records(1, 3));
        let mut loader = loader(store.clone());

        let report = loader.load(&[]).await.unwrap();

        assert_eq!(report.rows_copied, 0);
        assert_eq!(report.completed_steps, SwapStep::ALL.to_vec());
        assert_eq!(store.read("team_releases").unwrap(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_first_run_creates_live_table() {
        let store = InMemoryReleaseTableStore::new();
        let mut loader = loader(store.clone());

        loader.load(&records(1, 2)).await.unwrap();

        assert_eq!(store.read("team_releases").unwrap().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_pre_promotion_failures_keep_previous_table() {
        for step in [SwapStep::Stage, SwapStep::Copy, SwapStep::Promote] {
            let previous = records(1, 3);
            let store = InMemoryReleaseTableStore::with_live_table(&table(), previous.clone());
            let mut loader = loader(store.clone().failing_at(step));

            let error = loader.load(&records(2, 4)).await.unwrap_err();

            assert_eq!(error.swap_step(), Some(step));
            assert_eq!(store.read("team_releases").unwrap(), Some(previous));
        }
    }

    #[tokio::test]
    async fn test_retire_failure_is_non_fatal() {
        let store = InMemoryReleaseTableStore::with_live_table(&table(), records(1, 3));
        let mut loader = loader(store.clone().failing_at(SwapStep::Retire));

        let batch = records(2, 4);
        let report = loader.load(&batch).await.unwrap();

        assert!(report.is_degraded());
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].starts_with("retire:"));
        assert!(report.warnings[1].starts_with("rebuild:"));
        assert!(report.warnings[1].contains("team_releases_old still exists"));
        assert!(!report.completed_steps.contains(&SwapStep::Retire));
        assert!(report.completed_steps.contains(&SwapStep::Rebuild));
        assert_eq!(store.read("team_releases").unwrap(), Some(batch));
        assert!(store.exists("team_releases_old").unwrap());
    }

    #[tokio::test]
    async fn test_rebuild_failure_is_non_fatal_and_still_creates_functions() {
        let store = InMemoryReleaseTableStore::new();
        let mut loader = loader(store.clone().failing_at(SwapStep::Rebuild));

        let batch = records(2, 4);
        let report = loader.load(&batch).await.unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.functions, Some(FunctionsOutcome::Created));
        assert_eq!(store.read("team_releases").unwrap(), Some(batch));
    }

    #[tokio::test]
    async fn test_existing_functions_are_idempotent() {
        let store = InMemoryReleaseTableStore::new();
        let mut loader = loader(store.clone());

        loader.load(&records(1, 2)).await.unwrap();
        let second = loader.load(&records(1, 3)).await.unwrap();

        assert!(!second.is_degraded());
        assert_eq!(second.functions, Some(FunctionsOutcome::AlreadyExisted));
        assert_eq!(store.function_count().unwrap(), 1);
        assert_eq!(store.read("team_releases").unwrap().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_rerun_after_interrupted_copy_discards_partial_rows() {
        let store = InMemoryReleaseTableStore::with_live_table(&table(), records(1, 3));

        let mut failing = loader(store.clone().failing_at(SwapStep::Copy));
        assert!(failing.load(&records(2, 2500)).await.is_err());
        assert!(store.exists("team_releases_temp").unwrap());

        let batch = records(3, 10);
        loader(store.clone()).load(&batch).await.unwrap();

        assert_eq!(store.read("team_releases").unwrap(), Some(batch));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_readers_always_see_a_complete_table() {
        let previous = records(1, 500);
        let next = records(2, 5000);
        let store = InMemoryReleaseTableStore::with_live_table(&table(), previous.clone());

        let done = Arc::new(AtomicBool::new(false));
        let reader = {
            let store = store.clone();
            let done = Arc::clone(&done);
            let (previous_len, next_len) = (previous.len(), next.len());

            tokio::spawn(async move {
                let mut samples = 0usize;
                loop {
                    let finished = done.load(Ordering::SeqCst);
                    let live = store
                        .read("team_releases")
                        .unwrap()
                        .expect("live table must always exist");
                    assert!(
                        live.len() == previous_len || live.len() == next_len,
                        "reader saw a partial table of {} rows",
                        live.len()
                    );
                    samples += 1;

                    if finished {
                        break samples;
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut loader = loader(store.clone());
        loader.load(&next).await.unwrap();
        done.store(true, Ordering::SeqCst);

        assert!(reader.await.unwrap() > 0);
        assert_eq!(store.read("team_releases").unwrap(), Some(next));
    }
}
