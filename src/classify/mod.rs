// src/classify/mod.rs
//! Action classification: turns a raw action into a [`Notification`].
//!
//! Classification is total. Missing payload fields are left out or shown as
//! `Unknown`, and an unparseable timestamp becomes "now".

pub mod kind;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::config::Network;
use crate::ingest::types::Action;
use crate::notify::{Notification, NotificationField};

pub use kind::{ActionKind, BeeVariables, TransferIntent};

pub const COLOR_DEFAULT: u32 = 0xFFAA00;
pub const COLOR_SYNTHETIC: u32 = 0xFF0000;

const UNKNOWN: &str = "Unknown";
const EARNING_VALUES_HEADING: &str = "New Earning Values";

fn color_for(key: &str) -> u32 {
    match key {
        "setbeevar" => 0xFFD700,
        "sethivevar" => 0xFF8C00,
        "stakehive" => 0x32CD32,
        "stakebees" => 0x228B22,
        "claim" => 0x4169E1,
        "unstake" => 0xFF6347,
        "transfer" => 0x32CD32,
        _ => COLOR_DEFAULT,
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    contract: String,
    network: Network,
}

impl Classifier {
    pub fn new(contract: impl Into<String>, network: Network) -> Self {
        Self {
            contract: contract.into(),
            network,
        }
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    pub fn classify(&self, action: &Action) -> Notification {
        self.classify_with_title(action, None)
    }

    /// `title` replaces whatever title the rule table would pick.
    pub fn classify_with_title(&self, action: &Action, title: Option<&str>) -> Notification {
        let kind = ActionKind::decode(action);
        let wallet = action
            .payload_str("from")
            .or_else(|| action.payload_str("owner"))
            .map(str::to_string);

        let (default_title, wallet, fields) = match &kind {
            ActionKind::SetBeeVar(vars) => (self.generic_title("setbeevar"), wallet, bee_fields(vars)),
            ActionKind::SetHiveVar => (self.generic_title("sethivevar"), wallet, Vec::new()),
            ActionKind::Claim { hive_item } => (
                "💰 Honey Claimed".to_string(),
                wallet,
                hive_item
                    .iter()
                    .map(|h| NotificationField::new("Hive Item", h.as_str()))
                    .collect(),
            ),
            ActionKind::Unstake { asset_id, hive_id } => {
                let mut fields = Vec::new();
                if let Some(asset) = asset_id {
                    fields.push(NotificationField::new("Asset ID", asset.as_str()));
                    if let Some(hive) = hive_id {
                        fields.push(NotificationField::new("Hive ID", hive.as_str()));
                    }
                }
                ("📤 Asset Unstaked".to_string(), wallet, fields)
            }
            ActionKind::Transfer(TransferIntent::StakeHive { asset_ids }) => (
                "🏠 New Hive Staked".to_string(),
                Some(wallet.unwrap_or_else(|| UNKNOWN.to_string())),
                vec![NotificationField::new("Asset IDs", join_ids(asset_ids))],
            ),
            ActionKind::Transfer(TransferIntent::StakeBees { hive_id, asset_ids }) => (
                "🐝 Bees Staked to Hive".to_string(),
                Some(wallet.unwrap_or_else(|| UNKNOWN.to_string())),
                vec![
                    NotificationField::new("Hive ID", hive_id.as_str()),
                    NotificationField::new("Bee Asset IDs", join_ids(asset_ids)),
                ],
            ),
            ActionKind::Transfer(TransferIntent::Plain) => {
                (self.generic_title("transfer"), wallet, Vec::new())
            }
            ActionKind::Other(name) => (self.generic_title(name), wallet, Vec::new()),
        };

        Notification {
            title: title.map(str::to_string).unwrap_or(default_title),
            wallet,
            fields,
            url: self.transaction_url(&action.transaction_id),
            color: color_for(kind.color_key()),
            timestamp: parse_timestamp(&action.timestamp).unwrap_or_else(Utc::now),
            transaction_id: action.transaction_id.clone(),
            synthetic: false,
        }
    }

    pub fn transaction_url(&self, trx_id: &str) -> String {
        format!(
            "https://{}/transaction/{}",
            self.network.explorer_host(),
            trx_id
        )
    }

    fn generic_title(&self, name: &str) -> String {
        format!("{name} on {}", self.contract)
    }
}

fn bee_fields(vars: &BeeVariables) -> Vec<NotificationField> {
    let show = |v: &Option<String>| title_case(v.as_deref().unwrap_or(UNKNOWN));
    let mut fields = vec![
        NotificationField::new("Bee Type", show(&vars.bee_type)),
        NotificationField::new("Rarity", show(&vars.rarity)),
        NotificationField::new("Category", show(&vars.category)),
    ];
    if vars.values.len() >= 4 {
        let labels = ["🍯 HUNY", "🌱 PLN", "🪙 BWAX", "👑 RJ"];
        for (i, (label, value)) in labels.iter().zip(&vars.values).enumerate() {
            let field = NotificationField::new(*label, value.as_str());
            fields.push(if i == 0 {
                field.under(EARNING_VALUES_HEADING)
            } else {
                field
            });
        }
    }
    fields
}

fn join_ids(ids: &[String]) -> String {
    if ids.is_empty() {
        UNKNOWN.to_string()
    } else {
        ids.join(", ")
    }
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Provider timestamps: RFC 3339 with `Z` or an offset, or naive ISO-8601 taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    s.trim_end_matches('Z')
        .parse::<NaiveDateTime>()
        .ok()
        .map(|naive| naive.and_utc())
}
