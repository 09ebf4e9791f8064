//! Release table domain - the live/shadow/retired table lifecycle

mod store;
mod table_name;

pub use store::{FunctionsOutcome, ReleaseTableStore, SwapStep};
pub use table_name::{validate_identifier, TableName};
