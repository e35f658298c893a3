// tests/discord_webhook.rs
//
// DiscordNotifier against a local webhook stub: payload shape, retry on 5xx,
// no retry on a permanent 4xx.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::Value;
use std::sync::{Arc, Mutex};

use honeyfarm_watch::ingest::Action;
use honeyfarm_watch::{Classifier, DiscordNotifier, Network, Notifier};

#[derive(Clone)]
struct Hook {
    status: StatusCode,
    bodies: Arc<Mutex<Vec<Value>>>,
}

async fn webhook(State(hook): State<Hook>, Json(body): Json<Value>) -> StatusCode {
    hook.bodies.lock().unwrap().push(body);
    hook.status
}

async fn spawn_hook(status: StatusCode) -> (String, Arc<Mutex<Vec<Value>>>) {
    let bodies = Arc::new(Mutex::new(Vec::new()));
    let router = Router::new().route("/hook", post(webhook)).with_state(Hook {
        status,
        bodies: bodies.clone(),
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}/hook"), bodies)
}

fn claim() -> honeyfarm_watch::Notification {
    let action = Action {
        transaction_id: "abc".into(),
        timestamp: "2025-06-01T12:00:00.000".into(),
        contract_actor: "farmforhoney".into(),
        action_name: "claim".into(),
        payload: serde_json::json!({ "owner": "alice.wam", "hiveitem": "1099" })
            .as_object()
            .cloned()
            .unwrap(),
    };
    Classifier::new("farmforhoney", Network::Testnet).classify(&action)
}

#[tokio::test]
async fn posts_one_embed() {
    let (url, bodies) = spawn_hook(StatusCode::NO_CONTENT).await;

    DiscordNotifier::new(url).send(&claim()).await.expect("2xx is success");

    let bodies = bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    let embed = &bodies[0]["embeds"][0];
    assert_eq!(embed["title"], "💰 Honey Claimed");
    assert_eq!(embed["url"], "https://wax-test.bloks.io/transaction/abc");
}

#[tokio::test]
async fn server_errors_are_retried() {
    let (url, bodies) = spawn_hook(StatusCode::BAD_GATEWAY).await;

    let err = DiscordNotifier::new(url)
        .with_retries(2)
        .send(&claim())
        .await
        .expect_err("502 every time");
    assert!(err.to_string().contains("502"), "{err}");
    assert_eq!(bodies.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn client_errors_fail_fast() {
    let (url, bodies) = spawn_hook(StatusCode::NOT_FOUND).await;

    DiscordNotifier::new(url)
        .send(&claim())
        .await
        .expect_err("404 is permanent");
    assert_eq!(bodies.lock().unwrap().len(), 1);
}
