//! Table swap protocol - named steps and the store seam that executes them

use async_trait::async_trait;
use serde::Serialize;

use super::table_name::TableName;
use crate::domain::rating::TeamRelease;
use crate::domain::DomainError;

/// Steps of the shadow-table swap, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStep {
    /// Drop any leftover shadow table and create a fresh one
    Stage,
    /// Bulk copy the batch into the shadow table
    Copy,
    /// Atomically rename live to retired and shadow to live
    Promote,
    /// Drop the retired table
    Retire,
    /// Re-apply index and function definitions against the live table
    Rebuild,
}

impl SwapStep {
    pub const ALL: [SwapStep; 5] = [
        SwapStep::Stage,
        SwapStep::Copy,
        SwapStep::Promote,
        SwapStep::Retire,
        SwapStep::Rebuild,
    ];

    /// The step executed after this one
    pub fn next(self) -> Option<SwapStep> {
        match self {
            Self::Stage => Some(Self::Copy),
            Self::Copy => Some(Self::Promote),
            Self::Promote => Some(Self::Retire),
            Self::Retire => Some(Self::Rebuild),
            Self::Rebuild => None,
        }
    }

    /// Failure before or during promotion aborts the run
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::Stage | Self::Copy | Self::Promote)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stage => "stage",
            Self::Copy => "copy",
            Self::Promote => "promote",
            Self::Retire => "retire",
            Self::Rebuild => "rebuild",
        }
    }
}

impl std::fmt::Display for SwapStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of (re)creating stored functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionsOutcome {
    Created,
    AlreadyExisted,
}

/// Store operations backing the swap protocol
///
/// Every operation must be safe to re-run after an interrupted load: staging drops a
/// leftover shadow table, promotion drops a stale retired table first, retiring and
/// rebuilding tolerate their targets being absent or present.
#[async_trait]
pub trait ReleaseTableStore: Send {
    async fn stage(&mut self, table: &TableName, schema: &str) -> Result<(), DomainError>;

    /// Returns the number of rows inserted
    async fn copy(&mut self, table: &TableName, records: &[TeamRelease])
        -> Result<u64, DomainError>;

    /// Must be atomic from a reader's perspective
    async fn promote(&mut self, table: &TableName) -> Result<(), DomainError>;

    async fn retire(&mut self, table: &TableName) -> Result<(), DomainError>;

    async fn apply_indexes(&mut self, script: &str) -> Result<(), DomainError>;

    /// Duplicate definitions are reported as [`FunctionsOutcome::AlreadyExisted`]
    async fn create_functions(&mut self, script: &str) -> Result<FunctionsOutcome, DomainError>;
}
