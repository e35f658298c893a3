// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod classify;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod notify;

// ---- Re-exports for stable public API ----
pub use crate::classify::Classifier;
pub use crate::config::{ConfigError, Network, WatcherConfig};
pub use crate::ingest::{PipelineState, Poller};
pub use crate::notify::{DiscordNotifier, Notification, Notifier};
