// src/ingest/scheduler.rs
use metrics::{counter, gauge};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::classify::Classifier;
use crate::config::WatcherConfig;
use crate::ingest::dedup::{is_sortable_timestamp, DedupCursor};
use crate::ingest::endpoints::EndpointPool;
use crate::ingest::fetcher::{ActionFetcher, ActionStream};
use crate::ingest::simulator::FallbackSimulator;
use crate::ingest::types::{Action, ActionSource, FetchError};
use crate::notify::Notifier;

/// `Startup -> LivePolling -> Simulating`. `Simulating` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Startup,
    LivePolling,
    Simulating,
}

impl PipelineState {
    fn gauge_value(self) -> f64 {
        match self {
            PipelineState::Startup => 0.0,
            PipelineState::LivePolling => 1.0,
            PipelineState::Simulating => 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Both streams fetched; `delivered` notifications reached the sink.
    Success { delivered: usize },
    /// The cycle failed and the pool moved to the next endpoint.
    Failed,
    /// Failure threshold reached; live polling must stop.
    Exhausted,
}

#[derive(Clone, Copy, Debug)]
pub struct SchedulerCfg {
    pub startup_grace: Duration,
    pub poll_interval: Duration,
    pub simulation_interval: Duration,
    /// Skip live polling and go straight to simulation.
    pub simulate_only: bool,
}

impl From<&WatcherConfig> for SchedulerCfg {
    fn from(cfg: &WatcherConfig) -> Self {
        Self {
            startup_grace: cfg.startup_grace,
            poll_interval: cfg.poll_interval,
            simulation_interval: cfg.simulation_interval,
            simulate_only: cfg.test_mode,
        }
    }
}

/// Owns all pipeline state and drives poll -> dedup -> classify -> deliver.
pub struct Poller {
    fetcher: ActionFetcher,
    pool: EndpointPool,
    dedup: DedupCursor,
    classifier: Classifier,
    notifier: Arc<dyn Notifier>,
    cfg: SchedulerCfg,
    state: PipelineState,
}

impl Poller {
    /// Captures the startup guard (current UTC time) on construction.
    pub fn new(
        fetcher: ActionFetcher,
        pool: EndpointPool,
        classifier: Classifier,
        notifier: Arc<dyn Notifier>,
        cfg: SchedulerCfg,
    ) -> Self {
        Self {
            fetcher,
            pool,
            dedup: DedupCursor::new(startup_timestamp()),
            classifier,
            notifier,
            cfg,
            state: PipelineState::Startup,
        }
    }

    pub fn from_config(
        cfg: &WatcherConfig,
        source: Arc<dyn ActionSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::new(
            ActionFetcher::new(source, cfg.contract.clone()),
            EndpointPool::new(cfg.endpoints.clone()),
            Classifier::new(cfg.contract.clone(), cfg.network),
            notifier,
            SchedulerCfg::from(cfg),
        )
    }

    /// Replace the startup guard captured by [`Poller::new`].
    pub fn with_startup_guard(mut self, guard: impl Into<String>) -> Self {
        self.dedup = DedupCursor::new(guard.into());
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn pool(&self) -> &EndpointPool {
        &self.pool
    }

    pub fn dedup(&self) -> &DedupCursor {
        &self.dedup
    }

    fn set_state(&mut self, state: PipelineState) {
        self.state = state;
        gauge!("watcher_pipeline_state").set(state.gauge_value());
    }

    /// One poll cycle against the current endpoint.
    ///
    /// Any error in either stream counts as exactly one endpoint failure.
    /// Notifications already delivered from the contract stream stay delivered.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let endpoint = self.pool.current().to_string();
        counter!("watcher_polls_total").increment(1);

        match self.poll_endpoint(&endpoint).await {
            Ok(delivered) => {
                self.pool.reset();
                gauge!("watcher_last_poll_ts").set(chrono::Utc::now().timestamp() as f64);
                PollOutcome::Success { delivered }
            }
            Err(e) => {
                self.pool.advance();
                counter!("watcher_endpoint_failures_total").increment(1);
                tracing::warn!(
                    target: "ingest",
                    endpoint = %endpoint,
                    error = %e,
                    failures = self.pool.failure_count(),
                    next = %self.pool.current(),
                    "poll failed, rotating endpoint"
                );
                if self.pool.is_exhausted() {
                    PollOutcome::Exhausted
                } else {
                    PollOutcome::Failed
                }
            }
        }
    }

    async fn poll_endpoint(&mut self, endpoint: &str) -> Result<usize, FetchError> {
        let contract_actions = self
            .fetcher
            .fetch_actions(endpoint, ActionStream::Contract, self.dedup.cursor())
            .await?;
        let newest = contract_actions
            .iter()
            .map(|a| a.timestamp.as_str())
            .filter(|ts| is_sortable_timestamp(ts))
            .max()
            .map(str::to_string);
        tracing::debug!(target: "ingest", endpoint = %endpoint, count = contract_actions.len(), "contract actions fetched");

        let mut delivered = self
            .deliver(contract_actions, ActionStream::Contract)
            .await;
        if let Some(ts) = newest {
            self.dedup.advance(&ts);
        }

        // Uses the cursor just advanced by the contract stream.
        let transfers = self
            .fetcher
            .fetch_actions(endpoint, ActionStream::IncomingTransfers, self.dedup.cursor())
            .await?;
        delivered += self.deliver(transfers, ActionStream::IncomingTransfers).await;

        Ok(delivered)
    }

    async fn deliver(&mut self, actions: Vec<Action>, stream: ActionStream) -> usize {
        let mut delivered = 0usize;
        for action in actions {
            if !self.dedup.admit(&action) {
                counter!("watcher_dedup_skipped_total", "stream" => stream.as_str()).increment(1);
                continue;
            }
            counter!("watcher_actions_admitted_total", "stream" => stream.as_str()).increment(1);

            let n = self.classifier.classify(&action);
            match self.notifier.send(&n).await {
                Ok(()) => {
                    delivered += 1;
                    counter!("watcher_notifications_sent_total", "sink" => self.notifier.name())
                        .increment(1);
                    tracing::info!(
                        target: "ingest",
                        stream = %stream,
                        action = %action.action_name,
                        trx_id = %action.transaction_id,
                        "notification sent"
                    );
                }
                Err(e) => {
                    counter!("watcher_notification_errors_total", "sink" => self.notifier.name())
                        .increment(1);
                    tracing::warn!(
                        target: "ingest",
                        error = %e,
                        trx_id = %action.transaction_id,
                        "notification delivery failed"
                    );
                }
            }
        }
        delivered
    }

    /// Run until cancelled. Returns the state the pipeline was in when it stopped.
    pub async fn run(mut self, cancel: CancellationToken) -> PipelineState {
        self.set_state(PipelineState::Startup);
        tracing::info!(
            target: "ingest",
            startup_guard = %self.dedup.startup_guard(),
            grace_secs = self.cfg.startup_grace.as_secs(),
            endpoints = self.pool.len(),
            "waiting before first poll"
        );
        tokio::select! {
            _ = cancel.cancelled() => return self.state,
            _ = tokio::time::sleep(self.cfg.startup_grace) => {}
        }

        if !self.cfg.simulate_only {
            self.set_state(PipelineState::LivePolling);
            tracing::info!(target: "ingest", contract = %self.fetcher.contract(), "monitoring for new actions");

            loop {
                // Cancellation drops the in-flight fetch.
                let outcome = tokio::select! {
                    _ = cancel.cancelled() => None,
                    o = self.poll_once() => Some(o),
                };
                let Some(outcome) = outcome else {
                    return self.state;
                };
                if outcome == PollOutcome::Exhausted {
                    tracing::error!(
                        target: "ingest",
                        failures = self.pool.failure_count(),
                        "all endpoints failed repeatedly, entering simulation mode"
                    );
                    break;
                }
                tokio::select! {
                    _ = cancel.cancelled() => return self.state,
                    _ = tokio::time::sleep(self.cfg.poll_interval) => {}
                }
            }
        }

        self.set_state(PipelineState::Simulating);
        let mut sim = FallbackSimulator::new(self.classifier.clone(), self.cfg.simulation_interval);
        sim.run(self.notifier.as_ref(), &cancel).await;
        self.state
    }
}

/// Zero-padded so it compares lexicographically with provider timestamps.
pub fn startup_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.6fZ")
        .to_string()
}
