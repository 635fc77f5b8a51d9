//! Development server.
//!
//! Serves the source root with no caching, watches it for changes and tells
//! open tabs to reload. The router returned here is wrapped by
//! [`HttpServer::new`](crate::http::HttpServer::new) like any other handler,
//! so dev responses carry the same isolation headers as production.

pub mod livereload;
pub mod watcher;

use axum::{
    http::{header::CACHE_CONTROL, HeaderValue},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
};

use crate::config::DevConfig;

pub use livereload::{inject_livereload, livereload_socket, LIVERELOAD_PATH};
pub use watcher::{IgnoreFilter, ReloadEvent, ReloadHub, SourceWatcher};

/// Build the dev handler. Live reload is wired only when `hub` is given.
pub fn router(config: &DevConfig, hub: Option<ReloadHub>) -> Router {
    let files = ServeDir::new(&config.root)
        .fallback(ServeFile::new(config.root.join(&config.fallback)));
    let mut router = Router::new().fallback_service(files);

    if let Some(hub) = hub {
        router = router
            .route(LIVERELOAD_PATH, get(livereload_socket).with_state(hub))
            .layer(middleware::from_fn(inject_livereload));
    }

    router.layer(SetResponseHeaderLayer::overriding(
        CACHE_CONTROL,
        HeaderValue::from_static("no-cache"),
    ))
}
