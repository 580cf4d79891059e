//! End-to-end tests against a live listener.

#![allow(clippy::panic, missing_docs)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use recipient_draw::api;
use recipient_draw::app_state::AppState;
use recipient_draw::config::{DrawConfig, LogFormat, StoreBackend};
use recipient_draw::persistence;
use recipient_draw::service::DrawService;
use serde_json::{Value, json};
use tempfile::TempDir;

const SEED: &str = r#"{
    "unassigned": [
        { "Ana": "https://drive.example/ana" },
        { "Ben": "https://drive.example/ben" },
        { "Cleo": "https://drive.example/cleo" },
        { "Dev": "https://drive.example/dev" }
    ],
    "assigned": []
}"#;

fn file_config(dir: &TempDir) -> DrawConfig {
    DrawConfig {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        store_backend: StoreBackend::File,
        state_file: dir.path().join("state").join("names.json"),
        database_url: String::new(),
        database_max_connections: 1,
        database_connect_timeout_secs: 1,
        seed_file: Some(dir.path().join("seed.json")),
        draw_seed: Some(2024),
        allocation_max_retries: 3,
        request_timeout_secs: 5,
        log_format: LogFormat::Pretty,
    }
}

async fn spawn(config: &DrawConfig) -> String {
    let Ok(store) = persistence::open(config).await else {
        panic!("store should open");
    };
    let service = DrawService::new(store, config.draw_seed, config.allocation_max_retries);
    let app = api::build_app(
        AppState::new(service),
        Duration::from_secs(config.request_timeout_secs),
    );
    let Ok(listener) = tokio::net::TcpListener::bind(config.listen_addr).await else {
        panic!("bind");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn post(client: &reqwest::Client, url: String, body: Value) -> (u16, Value) {
    let Ok(res) = client.post(url).json(&body).send().await else {
        panic!("request failed");
    };
    let status = res.status().as_u16();
    let value = res.json::<Value>().await.unwrap_or(Value::Null);
    (status, value)
}

async fn write_seed(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("seed.json");
    let Ok(()) = tokio::fs::write(&path, SEED).await else {
        panic!("write seed");
    };
    path
}

#[tokio::test]
async fn full_draw_over_http_persists_across_restart() {
    let Ok(dir) = TempDir::new() else {
        panic!("tempdir");
    };
    write_seed(&dir).await;
    let config = file_config(&dir);
    let base = spawn(&config).await;
    let client = reqwest::Client::new();

    let registrants = [("ana@x.io", "Ana"), ("ben@x.io", "ben"), ("cleo@x.io", "CLEO")];
    let mut drawn = Vec::new();
    for (i, (email, name)) in registrants.iter().enumerate() {
        let (status, body) = post(
            &client,
            format!("{base}/api/v1/allocate"),
            json!({"email": email, "name": name, "password": "pw"}),
        )
        .await;
        assert_eq!(status, 200);
        let Some(names) = body["names"].as_array() else {
            panic!("names missing");
        };
        assert_eq!(names.len(), 4 - i);
        let designated = body["designatedName"].as_str().unwrap_or_default().to_string();
        assert!(!designated.eq_ignore_ascii_case(name));
        assert!(!drawn.contains(&designated));
        drawn.push(designated);
    }

    // A second process on the same file sees the same assignments.
    let restarted = spawn(&config).await;
    for ((email, _), designated) in registrants.iter().zip(&drawn) {
        let (status, body) = post(
            &client,
            format!("{restarted}/api/v1/recheck"),
            json!({"email": email.to_uppercase(), "password": "pw"}),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["designatedName"], json!(designated));
        assert!(body.get("names").is_none());
    }

    let Ok(store) = persistence::open(&config).await else {
        panic!("store should open");
    };
    let Ok(stored) = store.read().await else {
        panic!("read failed");
    };
    assert_eq!(stored.version, 3);
    assert_eq!(stored.state.unassigned().len(), 1);
    assert_eq!(stored.state.assigned().len(), 3);
}

#[tokio::test]
async fn existing_state_file_is_not_reseeded() {
    let Ok(dir) = TempDir::new() else {
        panic!("tempdir");
    };
    write_seed(&dir).await;
    let config = file_config(&dir);
    let base = spawn(&config).await;
    let client = reqwest::Client::new();

    let (status, _) = post(
        &client,
        format!("{base}/api/v1/allocate"),
        json!({"email": "z@x.io", "name": "Zed", "password": "pw"}),
    )
    .await;
    assert_eq!(status, 200);

    let Ok(store) = persistence::open(&config).await else {
        panic!("store should open");
    };
    let Ok(stored) = store.read().await else {
        panic!("read failed");
    };
    assert_eq!(stored.state.unassigned().len(), 3);
    assert_eq!(stored.state.assigned().len(), 1);
}
