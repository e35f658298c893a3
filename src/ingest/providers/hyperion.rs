// src/ingest/providers/hyperion.rs
use async_trait::async_trait;
use metrics::{counter, histogram};
use std::time::Duration;

use crate::ingest::types::{
    decode_record, Action, ActionQuery, ActionSource, ActionsResponse, FetchError, RecordError,
};

const GET_ACTIONS_PATH: &str = "/v2/history/get_actions";

/// Hyperion v2 history API over HTTP. One client, shared by every endpoint of the pool.
#[derive(Clone)]
pub struct HyperionProvider {
    client: reqwest::Client,
    timeout: Duration,
}

impl HyperionProvider {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    fn url_for(base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), GET_ACTIONS_PATH)
    }
}

#[async_trait]
impl ActionSource for HyperionProvider {
    async fn get_actions(
        &self,
        base_url: &str,
        query: &ActionQuery,
    ) -> Result<Vec<Result<Action, RecordError>>, FetchError> {
        let url = Self::url_for(base_url);
        let t0 = std::time::Instant::now();

        let resp = self
            .client
            .get(&url)
            .query(&query.to_params())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body: ActionsResponse = resp.json().await.map_err(|source| FetchError::Decode {
            url: url.clone(),
            source,
        })?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("watcher_fetch_ms").record(ms);
        counter!("watcher_actions_fetched_total", "account" => query.account.clone())
            .increment(body.actions.len() as u64);

        tracing::debug!(
            target: "ingest",
            url = %url,
            account = %query.account,
            count = body.actions.len(),
            elapsed_ms = ms,
            "get_actions ok"
        );

        Ok(body.actions.into_iter().map(decode_record).collect())
    }

    fn name(&self) -> &'static str {
        "Hyperion"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        assert_eq!(
            HyperionProvider::url_for("https://wax.eosusa.io/"),
            "https://wax.eosusa.io/v2/history/get_actions"
        );
        assert_eq!(
            HyperionProvider::url_for("http://127.0.0.1:9000"),
            "http://127.0.0.1:9000/v2/history/get_actions"
        );
    }
}
