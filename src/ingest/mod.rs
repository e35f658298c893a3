// src/ingest/mod.rs
//! Ingestion pipeline: endpoint failover, cursored fetching, dedup, delivery.

pub mod dedup;
pub mod endpoints;
pub mod fetcher;
pub mod providers;
pub mod scheduler;
pub mod simulator;
pub mod types;

use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

pub use dedup::{is_sortable_timestamp, DedupCursor, ProcessedSet};
pub use endpoints::EndpointPool;
pub use fetcher::{ActionFetcher, ActionStream};
pub use scheduler::{PipelineState, PollOutcome, Poller, SchedulerCfg};
pub use simulator::FallbackSimulator;
pub use types::{Action, ActionQuery, ActionSource, FetchError, RecordError};

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("watcher_polls_total", "Poll cycles started.");
        describe_counter!(
            "watcher_endpoint_failures_total",
            "Poll cycles that failed and rotated the endpoint pool."
        );
        describe_counter!(
            "watcher_actions_fetched_total",
            "Records returned by history providers."
        );
        describe_counter!(
            "watcher_records_skipped_total",
            "Records dropped because an identifier was missing."
        );
        describe_counter!(
            "watcher_dedup_skipped_total",
            "Actions dropped as already processed or older than startup."
        );
        describe_counter!(
            "watcher_actions_admitted_total",
            "Actions admitted for classification."
        );
        describe_counter!(
            "watcher_notifications_sent_total",
            "Notifications accepted by the sink."
        );
        describe_counter!(
            "watcher_notification_errors_total",
            "Notifications the sink failed to deliver."
        );
        describe_counter!(
            "watcher_synthetic_total",
            "Synthetic notifications sent in simulation mode."
        );
        describe_histogram!("watcher_fetch_ms", "Provider request time in milliseconds.");
        describe_gauge!(
            "watcher_pipeline_state",
            "0 = startup, 1 = live polling, 2 = simulating."
        );
        describe_gauge!(
            "watcher_last_poll_ts",
            "Unix ts of the last successful poll cycle."
        );
    });
}
