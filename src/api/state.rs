//! Application state for shared services

use std::sync::Arc;

use crate::domain::team::RatingQueries;

/// Application state shared by the read handlers
#[derive(Clone)]
pub struct AppState {
    pub queries: Arc<dyn RatingQueries>,
}

impl AppState {
    pub fn new(queries: Arc<dyn RatingQueries>) -> Self {
        Self { queries }
    }
}
