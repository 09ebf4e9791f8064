//! Application services - sync orchestration and bulk loading

mod bulk_loader;
mod sync_service;

pub use bulk_loader::{BulkLoader, LoadReport};
pub use sync_service::{CollectedBatch, SyncConfig, SyncReport, SyncService};
