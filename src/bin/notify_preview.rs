//! Classifies one sample of every action kind and posts it to DISCORD_WEBHOOK_URL.
//! Without a webhook, prints the webhook JSON instead.

use honeyfarm_watch::ingest::Action;
use honeyfarm_watch::{Classifier, DiscordNotifier, Network, Notifier};
use serde_json::{json, Value};

fn sample(id: &str, name: &str, data: Value) -> Action {
    Action {
        transaction_id: id.to_string(),
        timestamp: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
        contract_actor: "farmforhoney".to_string(),
        action_name: name.to_string(),
        payload: data.as_object().cloned().unwrap_or_default(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let network: Network = std::env::var("NETWORK")
        .unwrap_or_else(|_| "testnet".to_string())
        .parse()?;
    let classifier = Classifier::new("farmforhoney", network);
    let webhook = std::env::var("DISCORD_WEBHOOK_URL").ok();

    let samples = [
        sample(
            "preview_0001",
            "setbeevar",
            json!({ "type": "queen", "rarity": "common", "category": "earning", "values": [4, 3, 2, 1] }),
        ),
        sample("preview_0002", "claim", json!({ "owner": "alice.wam", "hiveitem": "1099511627776" })),
        sample(
            "preview_0003",
            "unstake",
            json!({ "owner": "alice.wam", "asset_id": "1099511627777", "hive_id": "1099511627776" }),
        ),
        sample(
            "preview_0004",
            "logtransfer",
            json!({ "from": "bob.wam", "to": "farmforhoney", "memo": "stakehive", "asset_ids": ["1099511627778"] }),
        ),
        sample(
            "preview_0005",
            "logtransfer",
            json!({ "from": "bob.wam", "to": "farmforhoney", "memo": "stakebees:1099511627778", "asset_ids": ["1099511627779", "1099511627780"] }),
        ),
    ];

    match webhook {
        Some(url) => {
            let discord = DiscordNotifier::new(url);
            for a in &samples {
                let n = classifier.classify(a);
                if let Err(e) = discord.send(&n).await {
                    tracing::warn!(error = %e, trx_id = %a.transaction_id, "preview send failed");
                }
                tokio::time::sleep(std::time::Duration::from_millis(400)).await;
            }
        }
        None => {
            let discord = DiscordNotifier::new(String::new());
            for a in &samples {
                let payload = discord.payload(&classifier.classify(a));
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
        }
    }

    println!("notify-preview done");
    Ok(())
}
