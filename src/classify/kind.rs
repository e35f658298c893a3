// src/classify/kind.rs
//! Closed set of recognized action kinds, decoded once from name + payload.

use serde_json::Value;

use crate::ingest::types::Action;

const STAKE_HIVE_MEMO: &str = "stakehive";
const STAKE_BEES_PREFIX: &str = "stakebees:";

/// Payload of `setbeevar`: per-bee reward table update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeeVariables {
    pub bee_type: Option<String>,
    pub rarity: Option<String>,
    pub category: Option<String>,
    /// Reward values in payload order (HUNY, PLN, BWAX, RJ).
    pub values: Vec<String>,
}

/// What a transfer to the contract means, read from its memo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferIntent {
    StakeHive { asset_ids: Vec<String> },
    StakeBees { hive_id: String, asset_ids: Vec<String> },
    Plain,
}

impl TransferIntent {
    pub fn from_memo(memo: &str, asset_ids: Vec<String>) -> Self {
        if memo == STAKE_HIVE_MEMO {
            return TransferIntent::StakeHive { asset_ids };
        }
        if let Some(rest) = memo.strip_prefix(STAKE_BEES_PREFIX) {
            let hive_id = rest.split(':').next().unwrap_or_default().to_string();
            return TransferIntent::StakeBees { hive_id, asset_ids };
        }
        TransferIntent::Plain
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    SetBeeVar(BeeVariables),
    SetHiveVar,
    Claim {
        hive_item: Option<String>,
    },
    Unstake {
        asset_id: Option<String>,
        hive_id: Option<String>,
    },
    Transfer(TransferIntent),
    Other(String),
}

impl ActionKind {
    pub fn decode(action: &Action) -> Self {
        let data = &action.payload;
        match action.action_name.as_str() {
            "setbeevar" => ActionKind::SetBeeVar(BeeVariables {
                bee_type: data.get("type").map(render_value),
                rarity: data.get("rarity").map(render_value),
                category: data.get("category").map(render_value),
                values: data
                    .get("values")
                    .and_then(Value::as_array)
                    .map(|vs| vs.iter().map(render_value).collect())
                    .unwrap_or_default(),
            }),
            "sethivevar" => ActionKind::SetHiveVar,
            "claim" => ActionKind::Claim {
                hive_item: data.get("hiveitem").map(render_value),
            },
            "unstake" => ActionKind::Unstake {
                asset_id: data.get("asset_id").map(render_value),
                hive_id: data.get("hive_id").map(render_value),
            },
            "transfer" | "logtransfer" => {
                let memo = data.get("memo").and_then(Value::as_str).unwrap_or_default();
                let asset_ids = data
                    .get("asset_ids")
                    .and_then(Value::as_array)
                    .map(|vs| vs.iter().map(render_value).collect())
                    .unwrap_or_default();
                ActionKind::Transfer(TransferIntent::from_memo(memo, asset_ids))
            }
            other => ActionKind::Other(other.to_string()),
        }
    }

    /// Key into the color table.
    pub fn color_key(&self) -> &str {
        match self {
            ActionKind::SetBeeVar(_) => "setbeevar",
            ActionKind::SetHiveVar => "sethivevar",
            ActionKind::Claim { .. } => "claim",
            ActionKind::Unstake { .. } => "unstake",
            ActionKind::Transfer(TransferIntent::StakeHive { .. }) => "stakehive",
            ActionKind::Transfer(TransferIntent::StakeBees { .. }) => "stakebees",
            ActionKind::Transfer(TransferIntent::Plain) => "transfer",
            ActionKind::Other(name) => name,
        }
    }
}

/// Strings without quotes, everything else as JSON text.
pub fn render_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
