//! Command-line isolation check run against live hosts.

use axum::{routing::get, Router};
use imgconv_host::config::HostConfig;
use imgconv_host::security::{all_isolated, check_paths};
use imgconv_host::HttpServer;
use tokio::net::TcpListener;

mod common;

fn paths(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

#[tokio::test]
async fn production_host_passes_on_every_path() {
    let mut config = HostConfig::default();
    let _bundle = common::write_bundle(&mut config);
    let host = common::spawn(HttpServer::production(config)).await;

    let base = format!("http://{}/", host.addr);
    let reports = check_paths(
        &common::client(),
        &base,
        &paths(&["/", "codec.wasm", "/_app/immutable/missing.js"]),
    )
    .await
    .unwrap();

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[1].path, "/codec.wasm");
    assert_eq!(reports[2].status, 404);
    assert!(all_isolated(&reports));

    host.shutdown.trigger();
}

#[tokio::test]
async fn unwrapped_server_fails_with_named_headers() {
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();
    let app = Router::new().route(
        "/",
        get(|| async { ([("cross-origin-opener-policy", "same-origin")], "bare") }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(tcp, app).await;
    });

    let reports = check_paths(&common::client(), &format!("http://{addr}"), &paths(&["/"]))
        .await
        .unwrap();

    assert!(!all_isolated(&reports));
    assert_eq!(reports[0].status, 200);
    assert_eq!(reports[0].violations, vec!["cross-origin-embedder-policy".to_string()]);
}

#[tokio::test]
async fn unreachable_host_is_an_error() {
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();
    drop(tcp);

    let result = check_paths(&common::client(), &format!("http://{addr}"), &paths(&["/"])).await;
    assert!(result.is_err());
}
