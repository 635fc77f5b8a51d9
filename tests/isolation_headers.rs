//! Cross-origin isolation headers over real TCP, production and dev paths.

use axum::{routing::get, Router};
use imgconv_host::config::HostConfig;
use imgconv_host::dev;
use imgconv_host::{HeaderPolicy, HttpServer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

mod common;

const PATHS: &[&str] = &[
    "/",
    "/codec.wasm",
    "/_app/immutable/entry.4f2a.js",
    "/_app/immutable/missing.js",
    "/convert",
];

#[tokio::test]
async fn production_responses_are_isolated_on_every_path() {
    let mut config = HostConfig::default();
    let _bundle = common::write_bundle(&mut config);
    let host = common::spawn(HttpServer::production(config)).await;
    let client = common::client();

    for path in PATHS {
        let res = client.get(host.url(path)).send().await.expect("host unreachable");
        assert!(
            HeaderPolicy::default().is_satisfied_by(res.headers()),
            "{path} answered {} without isolation headers",
            res.status()
        );
    }

    host.shutdown.trigger();
}

#[tokio::test]
async fn dev_and_production_headers_match() {
    let mut config = HostConfig::default();
    let _bundle = common::write_bundle(&mut config);

    let prod = common::spawn(HttpServer::production(config.clone())).await;
    let handler = dev::router(&config.dev, Some(dev::ReloadHub::default()));
    let dev = common::spawn(HttpServer::new(config, handler)).await;
    let client = common::client();

    for path in ["/", "/codec.wasm", "/convert"] {
        let p = client.get(prod.url(path)).send().await.unwrap();
        let d = client.get(dev.url(path)).send().await.unwrap();

        for (name, value) in HeaderPolicy::default().entries() {
            assert_eq!(p.headers().get(&name), Some(&value), "prod {path} {name}");
            assert_eq!(d.headers().get(&name), Some(&value), "dev {path} {name}");
        }
    }

    prod.shutdown.trigger();
    dev.shutdown.trigger();
}

#[tokio::test]
async fn repeated_requests_do_not_drift() {
    let mut config = HostConfig::default();
    let _bundle = common::write_bundle(&mut config);
    let host = common::spawn(HttpServer::production(config)).await;
    let client = common::client();

    let mut seen = Vec::new();
    for _ in 0..10 {
        let res = client.get(host.url("/")).send().await.unwrap();
        seen.push((
            res.headers()["cross-origin-embedder-policy"].clone(),
            res.headers()["cross-origin-opener-policy"].clone(),
        ));
    }
    assert!(seen.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(seen[0].0, "require-corp");
    assert_eq!(seen[0].1, "same-origin");

    host.shutdown.trigger();
}

#[tokio::test]
async fn failing_handler_response_is_isolated() {
    async fn broken() -> &'static str {
        panic!("conversion backend missing")
    }
    let handler = Router::new().route("/api/convert", get(broken));
    let host = common::spawn(HttpServer::new(HostConfig::default(), handler)).await;

    let res = common::client().get(host.url("/api/convert")).send().await.unwrap();
    assert_eq!(res.status(), 500);
    assert!(HeaderPolicy::default().is_satisfied_by(res.headers()));

    host.shutdown.trigger();
}

#[tokio::test]
async fn header_names_are_title_case_on_the_wire() {
    let mut config = HostConfig::default();
    let _bundle = common::write_bundle(&mut config);
    let host = common::spawn(HttpServer::production(config)).await;

    let mut stream = TcpStream::connect(host.addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let raw = String::from_utf8_lossy(&raw);

    assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(raw.contains("\r\nCross-Origin-Embedder-Policy: require-corp\r\n"));
    assert!(raw.contains("\r\nCross-Origin-Opener-Policy: same-origin\r\n"));

    host.shutdown.trigger();
}

#[tokio::test]
async fn shutdown_stops_accepting() {
    let host = common::spawn(HttpServer::new(
        HostConfig::default(),
        Router::new().route("/", get(|| async { "ok" })),
    ))
    .await;
    let client = common::client();
    assert!(client.get(host.url("/")).send().await.is_ok());

    host.shutdown.trigger();
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let fresh = common::client();
    assert!(fresh.get(host.url("/")).send().await.is_err());
}
