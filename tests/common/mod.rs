//! Shared utilities for integration testing.

use std::fs;
use std::net::SocketAddr;

use imgconv_host::config::HostConfig;
use imgconv_host::net::Listener;
use imgconv_host::{HttpServer, Shutdown};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A server running on an ephemeral loopback port.
pub struct RunningHost {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl RunningHost {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start `server` in the background.
pub async fn spawn(server: HttpServer) -> RunningHost {
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();
    let listener = Listener::from_tcp(tcp, 64);

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    RunningHost { addr, shutdown }
}

/// Lay out a small pre-built bundle and point `config` at it.
pub fn write_bundle(config: &mut HostConfig) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "<html><body>converter</body></html>").unwrap();
    fs::write(dir.path().join("codec.wasm"), [0x00, 0x61, 0x73, 0x6d]).unwrap();
    let immutable = dir.path().join("_app").join("immutable");
    fs::create_dir_all(&immutable).unwrap();
    fs::write(immutable.join("entry.4f2a.js"), "export {}").unwrap();

    config.bundle.dir = dir.path().to_path_buf();
    config.dev.root = dir.path().to_path_buf();
    dir
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
