// src/ingest/types.rs
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// One recorded contract invocation or transfer, as reported by a history provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub transaction_id: String,
    /// Provider timestamp, verbatim. May be empty or malformed.
    pub timestamp: String,
    pub contract_actor: String,
    pub action_name: String,
    pub payload: Map<String, Value>,
}

impl Action {
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }
}

/// Failure of a whole provider call. Always retryable on another endpoint.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("undecodable response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A single record that cannot be turned into an [`Action`]; the record is skipped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record has no {0}")]
    MissingField(&'static str),
    #[error("record does not match the action schema: {0}")]
    Malformed(String),
}

/// Query parameters for `GET /v2/history/get_actions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionQuery {
    pub account: String,
    /// Comma-separated action names.
    pub actions: String,
    pub limit: u32,
    /// Lower bound (`after=`), passed through verbatim.
    pub after: Option<String>,
}

impl ActionQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("account", self.account.clone()),
            ("action", self.actions.clone()),
            ("limit", self.limit.to_string()),
            ("sort", "desc".to_string()),
        ];
        if let Some(after) = &self.after {
            params.push(("after", after.clone()));
        }
        params
    }
}

/// A history provider that can run one query against one base URL.
#[async_trait::async_trait]
pub trait ActionSource: Send + Sync {
    /// Returns the decoded records in provider order (newest first for `sort=desc`).
    async fn get_actions(
        &self,
        base_url: &str,
        query: &ActionQuery,
    ) -> Result<Vec<Result<Action, RecordError>>, FetchError>;

    fn name(&self) -> &'static str;
}

// --- wire format ---

/// Records stay untyped here so one bad record cannot fail the whole body.
#[derive(Debug, Default, Deserialize)]
pub struct ActionsResponse {
    #[serde(default)]
    pub actions: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawAction {
    pub trx_id: Option<String>,
    #[serde(rename = "@timestamp")]
    pub at_timestamp: Option<String>,
    pub timestamp: Option<String>,
    pub act: Option<RawAct>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawAct {
    pub account: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl TryFrom<RawAction> for Action {
    type Error = RecordError;

    fn try_from(raw: RawAction) -> Result<Self, Self::Error> {
        let transaction_id = raw
            .trx_id
            .filter(|s| !s.is_empty())
            .ok_or(RecordError::MissingField("trx_id"))?;
        let act = raw.act.ok_or(RecordError::MissingField("act"))?;
        let action_name = act
            .name
            .filter(|s| !s.is_empty())
            .ok_or(RecordError::MissingField("act.name"))?;

        // Some providers return `data` as a hex string for undecoded actions.
        let payload = match act.data {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };

        Ok(Action {
            transaction_id,
            timestamp: raw.at_timestamp.or(raw.timestamp).unwrap_or_default(),
            contract_actor: act.account.unwrap_or_default(),
            action_name,
            payload,
        })
    }
}

/// Decode one entry of `actions`; a schema mismatch is a record error.
pub fn decode_record(raw: Value) -> Result<Action, RecordError> {
    let raw: RawAction =
        serde_json::from_value(raw).map_err(|e| RecordError::Malformed(e.to_string()))?;
    Action::try_from(raw)
}
