//! In-memory release table store

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::domain::rating::TeamRelease;
use crate::domain::release_table::{FunctionsOutcome, ReleaseTableStore, SwapStep, TableName};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Tables {
    tables: HashMap<String, Vec<TeamRelease>>,
    functions: HashSet<String>,
    index_builds: usize,
}

/// Thread-safe in-memory release table store
///
/// Useful for dry runs and testing. Clones share the same tables, so a clone can act
/// as a concurrent reader while another clone performs a swap.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReleaseTableStore {
    state: Arc<RwLock<Tables>>,
    fail_at: Option<SwapStep>,
}

impl InMemoryReleaseTableStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose live table already holds `records`
    pub fn with_live_table(table: &TableName, records: Vec<TeamRelease>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.write() {
            state.tables.insert(table.qualified(), records);
        }
        store
    }

    /// Make the given step fail, simulating a store error
    pub fn failing_at(mut self, step: SwapStep) -> Self {
        self.fail_at = Some(step);
        self
    }

    /// Snapshot of a table's rows, `None` when the table does not exist
    pub fn read(&self, name: &str) -> Result<Option<Vec<TeamRelease>>, DomainError> {
        let state = self.state.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(state.tables.get(name).cloned())
    }

    /// Whether a table exists
    pub fn exists(&self, name: &str) -> Result<bool, DomainError> {
        Ok(self.read(name)?.is_some())
    }

    /// Number of distinct function scripts applied
    pub fn function_count(&self) -> Result<usize, DomainError> {
        Ok(self.read_state()?.functions.len())
    }

    /// Number of times indexes were (re)built
    pub fn index_builds(&self) -> Result<usize, DomainError> {
        Ok(self.read_state()?.index_builds)
    }

    fn read_state(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, DomainError> {
        self.state
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_state(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, DomainError> {
        self.state
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))
    }

    fn check(&self, step: SwapStep) -> Result<(), DomainError> {
        if self.fail_at == Some(step) {
            return Err(DomainError::storage(format!("Injected failure at {}", step)));
        }
        Ok(())
    }
}

#[async_trait]
impl ReleaseTableStore for InMemoryReleaseTableStore {
    async fn stage(&mut self, table: &TableName, schema: &str) -> Result<(), DomainError> {
        self.check(SwapStep::Stage)?;

        if schema.trim().is_empty() {
            return Err(DomainError::validation("Table schema cannot be empty"));
        }

        let mut state = self.write_state()?;
        state.tables.insert(table.temp(), Vec::new());
        Ok(())
    }

    async fn copy(
        &mut self,
        table: &TableName,
        records: &[TeamRelease],
    ) -> Result<u64, DomainError> {
        for chunk in records.chunks(1_000) {
            {
                let mut state = self.write_state()?;
                let temp = state.tables.get_mut(&table.temp()).ok_or_else(|| {
                    DomainError::storage(format!("Table {} does not exist", table.temp()))
                })?;
                temp.extend_from_slice(chunk);
            }
            tokio::task::yield_now().await;
        }

        // Fails after partial rows were written, like an interrupted COPY
        self.check(SwapStep::Copy)?;

        Ok(records.len() as u64)
    }

    async fn promote(&mut self, table: &TableName) -> Result<(), DomainError> {
        self.check(SwapStep::Promote)?;

        let mut state = self.write_state()?;

        if !state.tables.contains_key(&table.temp()) {
            return Err(DomainError::storage(format!(
                "Table {} does not exist",
                table.temp()
            )));
        }

        state.tables.remove(&table.old());
        let live = state.tables.remove(&table.qualified()).unwrap_or_default();
        state.tables.insert(table.old(), live);

        if let Some(staged) = state.tables.remove(&table.temp()) {
            state.tables.insert(table.qualified(), staged);
        }

        Ok(())
    }

    async fn retire(&mut self, table: &TableName) -> Result<(), DomainError> {
        self.check(SwapStep::Retire)?;

        self.write_state()?.tables.remove(&table.old());
        Ok(())
    }

    async fn apply_indexes(&mut self, _script: &str) -> Result<(), DomainError> {
        self.check(SwapStep::Rebuild)?;

        self.write_state()?.index_builds += 1;
        Ok(())
    }

    async fn create_functions(&mut self, script: &str) -> Result<FunctionsOutcome, DomainError> {
        let mut state = self.write_state()?;

        if state.functions.insert(script.to_string()) {
            Ok(FunctionsOutcome::Created)
        } else {
            Ok(FunctionsOutcome::AlreadyExisted)
        }
    }
}
