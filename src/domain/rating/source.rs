//! Rating source trait - per-team access to the remote rating history

use async_trait::async_trait;

use super::entity::{RawRatingEntry, TeamId};
use super::limiter::ConcurrencyLimiter;

/// Result of fetching one team's rating history
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The service answered 200 with a rating history (possibly empty)
    Fetched(Vec<RawRatingEntry>),
    /// The service answered with a non-200 status; the team has no data this run
    Skipped { status: u16 },
    /// Retries were exhausted or the payload was unusable
    Failed { attempts: u32, reason: String },
}

impl FetchOutcome {
    /// Metric/log label for the outcome
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fetched(_) => "fetched",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Source of per-team rating histories
///
/// Implementations acquire a permit from `limiter` around every network call and never
/// return an error: every failure mode is folded into a [`FetchOutcome`].
#[async_trait]
pub trait RatingSource: Send + Sync + std::fmt::Debug {
    async fn fetch(&self, team_id: TeamId, limiter: &ConcurrencyLimiter) -> FetchOutcome;
}

#[cfg(test)]
pub mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Scripted rating source; unknown teams answer 404
    #[derive(Debug, Default)]
    pub struct MockRatingSource {
        outcomes: HashMap<TeamId, FetchOutcome>,
        calls: Mutex<Vec<TeamId>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockRatingSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_outcome(mut self, team_id: i32, outcome: FetchOutcome) -> Self {
            self.outcomes.insert(TeamId::new(team_id), outcome);
            self
        }

        pub fn calls(&self) -> Vec<TeamId> {
            self.calls.lock().unwrap().clone()
        }

        /// Highest number of simultaneous fetches observed while holding a permit
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RatingSource for MockRatingSource {
        async fn fetch(&self, team_id: TeamId, limiter: &ConcurrencyLimiter) -> FetchOutcome {
            let _permit = limiter.acquire().await.unwrap();
            self.calls.lock().unwrap().push(team_id);

            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.outcomes
                .get(&team_id)
                .cloned()
                .unwrap_or(FetchOutcome::Skipped { status: 404 })
        }
    }
}
