//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use metrics::{
    create_metrics_router, init_metrics, record_fetch_retry, record_http_request,
    record_sync_run, record_team_fetch, MetricsConfig, PrometheusMetrics,
};
