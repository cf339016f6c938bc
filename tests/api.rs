//! End-to-end HTTP tests against a server bound to a local port.

#![allow(clippy::panic)]

use std::collections::HashMap;

use lottery_pool_gateway::api::build_app;
use lottery_pool_gateway::app_state::AppState;
use lottery_pool_gateway::config::ServerConfig;
use reqwest::StatusCode;
use serde_json::Value;

async fn spawn_server(balance: &str) -> String {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("PAYMENT_MODE", "simulated"),
        ("SIMULATED_WALLET", "0xAbCdEf0123456789aBcDeF0123456789AbCdEf01"),
        ("SIMULATED_BALANCE", balance),
        ("RNG_SEED", "11"),
    ]);
    let Ok(config) = ServerConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string())) else {
        panic!("config should load");
    };
    let Ok(state) = AppState::from_config(&config).await else {
        panic!("state should build");
    };
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, build_app(state)).await;
    });
    format!("http://{addr}")
}

async fn json(response: reqwest::Response) -> (StatusCode, Value) {
    let status = response.status();
    let Ok(body) = response.json::<Value>().await else {
        panic!("body should be JSON");
    };
    (status, body)
}

async fn join(client: &reqwest::Client, base: &str, pool: &str, wallet: &str) -> (StatusCode, Value) {
    let Ok(response) = client
        .post(format!("{base}/api/v1/pools/{pool}/join"))
        .json(&serde_json::json!({ "wallet": wallet }))
        .send()
        .await
    else {
        panic!("join request failed");
    };
    json(response).await
}

#[tokio::test]
async fn full_lottery_round_over_http() {
    let base = spawn_server("10").await;
    let client = reqwest::Client::new();

    for n in 0..6 {
        let (status, body) = join(&client, &base, "bababudangiri", &format!("0xplayer{n:034}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["seat"], n + 1);
    }

    let Ok(response) = client
        .get(format!("{base}/api/v1/pools/bababudangiri"))
        .send()
        .await
    else {
        panic!("get failed");
    };
    let (status, pool) = json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pool["status"], "Ready to Spin");
    assert_eq!(pool["open_seats"], 0);

    let Ok(response) = client
        .post(format!("{base}/api/v1/pools/bababudangiri/winner"))
        .send()
        .await
    else {
        panic!("winner request failed");
    };
    let (status, winner) = json(response).await;
    assert_eq!(status, StatusCode::OK);
    let Some(message) = winner["message"].as_str() else {
        panic!("message missing");
    };
    assert!(message.starts_with("Winner selected: 0xplay"));
    assert!(message.ends_with(". Time to brew!"));

    let Ok(response) = client.get(format!("{base}/api/v1/summary")).send().await else {
        panic!("summary failed");
    };
    let (_, summary) = json(response).await;
    assert_eq!(summary["active_pools"], 4);
    assert_eq!(summary["completed_rounds"], 1);
    assert_eq!(summary["total_staked"], "6");
}

#[tokio::test]
async fn status_filter_selects_matching_pools() {
    let base = spawn_server("10").await;
    let client = reqwest::Client::new();
    for n in 0..5 {
        let (status, _) = join(&client, &base, "monsoon", &format!("0xfiller{n:034}")).await;
        assert_eq!(status, StatusCode::OK);
    }

    let Ok(response) = client
        .get(format!("{base}/api/v1/pools?status=almost_full"))
        .send()
        .await
    else {
        panic!("list failed");
    };
    let (status, body) = json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["pool_id"], "monsoon");
}

#[tokio::test]
async fn villa_needs_one_hundred_pyusd() {
    let base = spawn_server("99").await;
    let client = reqwest::Client::new();
    let Ok(response) = client
        .post(format!("{base}/api/v1/listings/dream-mountain-villa/purchase"))
        .send()
        .await
    else {
        panic!("purchase request failed");
    };
    let (status, body) = json(response).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["error"]["message"],
        "Insufficient PYUSD balance. You need at least 100 PYUSD to purchase this item."
    );
}

#[tokio::test]
async fn openapi_document_is_served() {
    let base = spawn_server("10").await;
    let Ok(response) = reqwest::get(format!("{base}/api-docs/openapi.json")).await else {
        panic!("docs request failed");
    };
    let (status, doc) = json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/v1/pools/{id}/join"].is_object());
}
