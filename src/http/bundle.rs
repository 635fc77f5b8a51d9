//! Production application handler: the pre-built bundle.
//!
//! # Responsibilities
//! - Serve static files from the bundle directory
//! - Serve precompressed `.br` / `.gz` siblings to clients that accept them
//! - Mark hashed assets under `/_app/immutable/` as cacheable forever
//! - Fall back to the bundle's fallback page for client-side routes
//!
//! Missing immutable assets are a hard 404; they never fall back to the page.

use std::path::Path;

use axum::{
    extract::Request,
    http::{header::CACHE_CONTROL, HeaderValue},
    middleware::{self, Next},
    response::Response,
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

use crate::config::BundleConfig;

/// Mount point of content-hashed build output.
pub const IMMUTABLE_PREFIX: &str = "/_app/immutable";

/// `Cache-Control` for content-hashed assets.
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Build the bundle handler for `config`.
pub fn router(config: &BundleConfig) -> Router {
    let immutable_dir = config.dir.join("_app").join("immutable");
    let fallback = fallback_page(&config.dir.join(&config.fallback), config.precompressed);

    Router::new()
        .nest_service(IMMUTABLE_PREFIX, files(&immutable_dir, config.precompressed))
        .fallback_service(files(&config.dir, config.precompressed).fallback(fallback))
        .layer(middleware::from_fn(cache_immutable_assets))
}

fn files(dir: &Path, precompressed: bool) -> ServeDir {
    let files = ServeDir::new(dir).append_index_html_on_directories(true);
    if precompressed {
        files.precompressed_br().precompressed_gzip()
    } else {
        files
    }
}

fn fallback_page(path: &Path, precompressed: bool) -> ServeFile {
    let page = ServeFile::new(path);
    if precompressed {
        page.precompressed_br().precompressed_gzip()
    } else {
        page
    }
}

async fn cache_immutable_assets(request: Request, next: Next) -> Response {
    let immutable = is_immutable_path(request.uri().path());
    let mut response = next.run(request).await;

    if immutable && response.status().is_success() {
        response.headers_mut().insert(
            CACHE_CONTROL,
            HeaderValue::from_static(IMMUTABLE_CACHE_CONTROL),
        );
    }
    response
}

fn is_immutable_path(path: &str) -> bool {
    path.strip_prefix(IMMUTABLE_PREFIX)
        .is_some_and(|rest| rest.starts_with('/'))
}
