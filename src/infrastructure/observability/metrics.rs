//! Prometheus metrics for the sync pipeline and the read API

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use serde::Deserialize;

const TEAM_FETCHES: &str = "rating_sync_team_fetches_total";
const FETCH_RETRIES: &str = "rating_sync_fetch_retries_total";
const SYNC_RUNS: &str = "rating_sync_runs_total";
const SYNC_DURATION: &str = "rating_sync_run_duration_seconds";
const RECORDS_LOADED: &str = "rating_sync_records_loaded";
const HTTP_REQUESTS: &str = "http_requests_total";
const HTTP_DURATION: &str = "http_request_duration_seconds";

// A full run fetches tens of thousands of teams
const SYNC_DURATION_BUCKETS: &[f64] = &[10.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1200.0, 3600.0];

/// Metrics settings (`[metrics]`)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Route serving the Prometheus text format
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

/// Handle rendering the installed recorder
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

fn builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(SYNC_DURATION.to_string()), SYNC_DURATION_BUCKETS)
}

fn describe() {
    describe_counter!(TEAM_FETCHES, "Team rating fetches by outcome");
    describe_counter!(FETCH_RETRIES, "Rating requests retried after a transport failure");
    describe_counter!(SYNC_RUNS, "Sync runs by status");
    describe_histogram!(SYNC_DURATION, "Duration of sync runs");
    describe_gauge!(RECORDS_LOADED, "Records in the live table after the last successful sync");
    describe_counter!(HTTP_REQUESTS, "Read API requests");
    describe_histogram!(HTTP_DURATION, "Read API request latency");
}

/// Install the global Prometheus recorder, `None` when disabled or already installed
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match builder().and_then(|b| b.install_recorder()) {
        Ok(handle) => {
            describe();
            gauge!("rating_sync_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(HTTP_REQUESTS, &labels).increment(1);
    histogram!(HTTP_DURATION, &labels).record(duration.as_secs_f64());
}

/// Outcome label is one of `fetched`, `skipped`, `failed`
pub fn record_team_fetch(outcome: &'static str) {
    counter!(TEAM_FETCHES, "outcome" => outcome).increment(1);
}

pub fn record_fetch_retry() {
    counter!(FETCH_RETRIES).increment(1);
}

pub fn record_sync_run(success: bool, records_loaded: u64, duration: Duration) {
    let status = if success { "success" } else { "error" };

    counter!(SYNC_RUNS, "status" => status).increment(1);
    histogram!(SYNC_DURATION, "status" => status).record(duration.as_secs_f64());

    if success {
        gauge!(RECORDS_LOADED).set(records_loaded as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_metrics_are_rendered() {
        let recorder = builder().unwrap().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_team_fetch("fetched");
            record_team_fetch("skipped");
            record_fetch_retry();
            record_sync_run(true, 42, Duration::from_secs(90));
        });

        let rendered = handle.render();
        assert!(rendered.contains("rating_sync_team_fetches_total{outcome=\"fetched\"} 1"));
        assert!(rendered.contains("rating_sync_fetch_retries_total 1"));
        assert!(rendered.contains("rating_sync_records_loaded 42"));
        assert!(rendered.contains("rating_sync_run_duration_seconds_bucket"));
    }

    #[test]
    fn test_failed_run_keeps_last_record_count() {
        let recorder = builder().unwrap().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_sync_run(false, 0, Duration::from_secs(1));
        });

        let rendered = handle.render();
        assert!(rendered.contains("rating_sync_runs_total{status=\"error\"} 1"));
        assert!(!rendered.contains("rating_sync_records_loaded"));
    }

    #[test]
    fn test_disabled_metrics_install_nothing() {
        let config = MetricsConfig {
            enabled: false,
            ..Default::default()
        };

        assert!(init_metrics(&config).is_none());
    }
}
