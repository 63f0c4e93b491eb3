//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use rest_express::{HttpServer, ServerConfig};
use tokio::net::TcpListener;

/// Config with scratch upload/static directories unique to this test.
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    let scratch = scratch_dir();
    config.uploads.dir = scratch.join("uploads");
    config.static_files.root = scratch.join("static");
    config
}

fn scratch_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("rest-express-test-{}-{}", std::process::id(), nanos))
}

/// Start a server on an ephemeral port and return its address.
pub async fn spawn_server(config: ServerConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config);
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    addr
}
