//! Integration tests for the connection lifecycle: greeting, framing,
//! flood protection and teardown.

mod common;

use chanrelay::config::LimitsConfig;
use common::TestServer;

#[tokio::test]
async fn test_greeting_then_chat() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");

    // connect() asserts the empty greeting line
    let mut alice = server.connect().await.expect("Failed to connect");
    alice.login("alice", "pw").await.unwrap();

    alice.send("hello world").await.unwrap();
    assert_eq!(alice.recv().await.unwrap(), "alice says: hello world");
}

#[tokio::test]
async fn test_blank_lines_and_crlf() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let mut alice = server.login("alice", "pw").await.unwrap();

    alice.send("").await.unwrap();
    alice.send("   ").await.unwrap();
    alice.expect_silence().await.unwrap();

    alice.send_bytes(b"with crlf\r\n").await.unwrap();
    assert_eq!(alice.recv().await.unwrap(), "alice says: with crlf");
}

#[tokio::test]
async fn test_overlong_line_closes_connection() {
    let server = TestServer::spawn_with_limits(LimitsConfig {
        max_line_length: 64,
        ..LimitsConfig::default()
    })
    .await
    .expect("Failed to spawn test server");

    let mut alice = server.login("alice", "pw").await.unwrap();
    alice.send(&"x".repeat(200)).await.unwrap();
    alice.expect_closed().await.unwrap();

    server.wait_for_clients(0).await.unwrap();
    assert!(server.matrix().clients.find_by_login("alice").is_none());
}

#[tokio::test]
async fn test_invalid_utf8_closes_connection() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");

    let mut client = server.connect().await.unwrap();
    client.send_bytes(&[0xff, 0xfe, b'\n']).await.unwrap();
    client.expect_closed().await.unwrap();
    server.wait_for_clients(0).await.unwrap();
}

#[tokio::test]
async fn test_default_limits_allow_bursts() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");

    let mut client = server.connect().await.unwrap();
    for i in 0..40 {
        client.send(&format!("#displayChannels {}", i)).await.unwrap();
    }
    for _ in 0..40 {
        assert_eq!(client.recv().await.unwrap(), "Available Channels:");
    }
    client.expect_silence().await.unwrap();
    assert_eq!(server.matrix().clients.count(), 1);
}

#[tokio::test]
async fn test_flood_disconnects_when_enabled() {
    let server = TestServer::spawn_with_limits(LimitsConfig {
        message_rate_per_second: 0.01,
        message_burst: 3.0,
        ..LimitsConfig::default()
    })
    .await
    .expect("Failed to spawn test server");

    let mut client = server.connect().await.unwrap();
    for i in 0..4 {
        client.send(&format!("#displayChannels {}", i)).await.unwrap();
    }

    let lines = client
        .recv_until(|line| line == "Error. Excess flood")
        .await
        .unwrap();
    assert_eq!(
        lines.iter().filter(|l| *l == "Available Channels:").count(),
        3
    );
    client.expect_closed().await.unwrap();
    server.wait_for_clients(0).await.unwrap();
}

#[tokio::test]
async fn test_disconnect_releases_everything() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");

    let mut alice = server.login("alice", "pw").await.unwrap();
    let mut bob = server.login("bob", "pw").await.unwrap();
    alice.recv().await.unwrap();

    alice.send("#create lobby").await.unwrap();
    alice.recv().await.unwrap();
    bob.send("#join lobby").await.unwrap();
    bob.recv().await.unwrap();

    drop(alice);
    server.wait_for_clients(1).await.unwrap();

    // Implicit leave: the channel survives with bob alone
    assert_eq!(server.matrix().channels.members("lobby").len(), 1);
    bob.send("anyone?").await.unwrap();
    assert_eq!(bob.recv().await.unwrap(), "Channel: lobby> bob says: anyone?");

    // The login id is free again
    server.login("alice", "pw").await.expect("alice logs in again");
}
