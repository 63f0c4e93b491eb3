//! Integration tests for the WebSocket surface.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;

mod common;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn connect(addr: std::net::SocketAddr) -> WsStream {
    let (stream, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();
    stream
}

async fn next_json(stream: &mut WsStream) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream closed")
            .expect("read error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

#[tokio::test]
async fn test_echo_broadcast_reaches_sender_and_peers() {
    let addr = common::spawn_server(common::test_config()).await;

    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;

    alice
        .send(Message::Text(
            r#"{"content":"hello","user":"alice"}"#.into(),
        ))
        .await
        .unwrap();

    // Sender receives its own broadcast too.
    let frame = next_json(&mut alice).await;
    assert_eq!(frame["type"], "message");
    assert_eq!(frame["content"], "hello");
    assert_eq!(frame["user"], "alice");
    assert!(frame["timestamp"].is_string());

    let frame = next_json(&mut bob).await;
    assert_eq!(frame["content"], "hello");
    assert_eq!(frame["user"], "alice");
}

#[tokio::test]
async fn test_missing_user_defaults_to_anonymous() {
    let addr = common::spawn_server(common::test_config()).await;

    let mut client = connect(addr).await;
    client
        .send(Message::Text(r#"{"content":"hi"}"#.into()))
        .await
        .unwrap();

    let frame = next_json(&mut client).await;
    assert_eq!(frame["user"], "anonymous");
    assert_eq!(frame["content"], "hi");
}

#[tokio::test]
async fn test_malformed_frame_is_skipped() {
    let addr = common::spawn_server(common::test_config()).await;

    let mut client = connect(addr).await;
    client
        .send(Message::Text("not json at all".into()))
        .await
        .unwrap();
    client
        .send(Message::Text(r#"{"content":"after"}"#.into()))
        .await
        .unwrap();

    // Only the valid frame comes back.
    let frame = next_json(&mut client).await;
    assert_eq!(frame["content"], "after");
}

#[tokio::test]
async fn test_post_chat_message_fans_out_to_connections() {
    let addr = common::spawn_server(common::test_config()).await;

    let mut listener = connect(addr).await;
    // Give the upgrade a moment to register.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/api/chat/messages"))
        .json(&serde_json::json!({ "content": "from http", "user": "poster" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let frame = next_json(&mut listener).await;
    assert_eq!(frame["content"], "from http");
    assert_eq!(frame["user"], "poster");
    assert!(frame["id"].as_str().unwrap().starts_with("msg_"));
}

#[tokio::test]
async fn test_disconnect_unregisters_connection() {
    let addr = common::spawn_server(common::test_config()).await;

    let mut staying = connect(addr).await;
    let mut leaving = connect(addr).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    leaving.close(None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    staying
        .send(Message::Text(r#"{"content":"still here"}"#.into()))
        .await
        .unwrap();
    let frame = next_json(&mut staying).await;
    assert_eq!(frame["content"], "still here");
}
