//! End-to-end tests for the IP gate over real TCP connections.
//!
//! The test client always connects from 127.0.0.1.

use reqwest::StatusCode;
use serde_json::Value;
use tempfile::TempDir;

mod common;

fn restricted(dir: &TempDir, allowed: &[&str], trusted: &[&str]) -> slog_viewer::ViewerConfig {
    let mut config = common::config_for(dir.path());
    config.access.enabled = true;
    config.access.allowed_ips = allowed.iter().map(|s| s.to_string()).collect();
    config.access.trusted_proxies = trusted.iter().map(|s| s.to_string()).collect();
    config
}

#[tokio::test]
async fn test_loopback_client_allowed() {
    let dir = TempDir::new().unwrap();
    let server = common::spawn_server(restricted(&dir, &["127.0.0.1"], &[])).await;

    let res = common::client()
        .get(server.url("/log/getLogFilesList"))
        .send()
        .await
        .expect("server unreachable");
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unlisted_client_denied() {
    let dir = TempDir::new().unwrap();
    let server = common::spawn_server(restricted(&dir, &["192.168.1.0/24", "10.0.0.5"], &[])).await;

    let res = common::client()
        .get(server.url("/log/getLogFilesList"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["your_ip"], "127.0.0.1");
    assert_eq!(body["message"], "Access denied for IP: 127.0.0.1");
}

#[tokio::test]
async fn test_denied_before_any_file_operation() {
    let dir = TempDir::new().unwrap();
    common::write_log(dir.path(), "app.log", &["keep me"]);
    let mut config = restricted(&dir, &["10.0.0.5"], &[]);
    config.viewer.dev_mode = true;
    config.viewer.enable_delete = true;
    let server = common::spawn_server(config).await;

    let res = common::client()
        .post(server.url("/log/deleteAllFiles"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(dir.path().join("app.log").exists());
}

#[tokio::test]
async fn test_forwarded_client_behind_trusted_proxy() {
    let dir = TempDir::new().unwrap();
    // Loopback acts as the proxy; only the forwarded client is allowed.
    let server = common::spawn_server(restricted(&dir, &["203.0.113.0/24"], &["127.0.0.0/8"])).await;

    let res = common::client()
        .get(server.url("/log/getLogFilesList"))
        .header("X-Forwarded-For", "203.0.113.5, 127.0.0.2")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = common::client()
        .get(server.url("/log/getLogFilesList"))
        .header("X-Forwarded-For", "198.51.100.1")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["your_ip"], "198.51.100.1");
}

#[tokio::test]
async fn test_spoofed_header_from_untrusted_peer() {
    let dir = TempDir::new().unwrap();
    let server = common::spawn_server(restricted(&dir, &["10.0.0.5"], &[])).await;

    // Without trusted proxies the rightmost hop is taken, whatever it says.
    let res = common::client()
        .get(server.url("/log/getLogFilesList"))
        .header("X-Forwarded-For", "10.0.0.5, 198.51.100.9")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_cidr_does_not_break_startup() {
    let dir = TempDir::new().unwrap();
    let server = common::spawn_server(restricted(&dir, &["not-a-cidr/33", "127.0.0.0/8"], &[])).await;

    let res = common::client()
        .get(server.url("/log/getLogFilesList"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_gate_disabled() {
    let dir = TempDir::new().unwrap();
    let mut config = restricted(&dir, &[], &[]);
    config.access.enabled = false;
    let server = common::spawn_server(config).await;

    let res = common::client()
        .get(server.url("/log/getLogFilesList"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
