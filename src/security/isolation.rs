//! Cross-origin isolation header policy.
//!
//! Browsers only expose `SharedArrayBuffer` (needed by the WASM image codecs)
//! to pages that are cross-origin isolated. Both hosting paths wrap their
//! handler in [`IsolationLayer`], which stamps the policy onto every response.
//!
//! # Design Decisions
//! - The policy is fixed at compile time; there is no config knob for it
//! - Policy values overwrite whatever the handler set for the same names
//! - The layer never branches on method, path, status or content type

use std::task::{Context, Poll};

use axum::http::{header::HeaderName, HeaderMap, HeaderValue, Request, Response};
use futures_util::future::{MapOk, TryFutureExt};
use tower::{Layer, Service};

/// `Cross-Origin-Embedder-Policy` header name.
pub const CROSS_ORIGIN_EMBEDDER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-embedder-policy");

/// `Cross-Origin-Opener-Policy` header name.
pub const CROSS_ORIGIN_OPENER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-opener-policy");

/// Name under which the isolation stage is registered in the dev pipeline.
pub const PLUGIN_NAME: &str = "configure-response-headers";

const ISOLATION_ENTRIES: &[(&str, &str)] = &[
    ("cross-origin-embedder-policy", "require-corp"),
    ("cross-origin-opener-policy", "same-origin"),
];

/// An ordered set of response headers applied to every outgoing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderPolicy {
    entries: &'static [(&'static str, &'static str)],
}

impl HeaderPolicy {
    /// The cross-origin isolation policy: COEP `require-corp`, COOP `same-origin`.
    pub const fn cross_origin_isolation() -> Self {
        Self {
            entries: ISOLATION_ENTRIES,
        }
    }

    /// Iterate over the (name, value) pairs in application order.
    pub fn entries(&self) -> impl Iterator<Item = (HeaderName, HeaderValue)> + '_ {
        self.entries.iter().map(|&(name, value)| {
            (
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            )
        })
    }

    /// Set every pair on `headers`, replacing existing values for those names.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in self.entries() {
            headers.insert(name, value);
        }
    }

    /// Whether `headers` carries every pair with exactly one matching value.
    pub fn is_satisfied_by(&self, headers: &HeaderMap) -> bool {
        self.violations(headers).is_empty()
    }

    /// Names of the pairs that are missing, wrong or repeated in `headers`.
    pub fn violations(&self, headers: &HeaderMap) -> Vec<HeaderName> {
        self.entries()
            .filter(|(name, expected)| {
                let mut values = headers.get_all(name).iter();
                !matches!((values.next(), values.next()), (Some(v), None) if v == expected)
            })
            .map(|(name, _)| name)
            .collect()
    }
}

impl Default for HeaderPolicy {
    fn default() -> Self {
        Self::cross_origin_isolation()
    }
}

/// Stamp the cross-origin isolation headers onto `response`.
///
/// The body is passed through untouched.
pub fn apply_isolation_headers<B>(mut response: Response<B>) -> Response<B> {
    HeaderPolicy::cross_origin_isolation().apply(response.headers_mut());
    response
}

/// Layer that applies [`apply_isolation_headers`] to every response of the wrapped service.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsolationLayer;

impl<S> Layer<S> for IsolationLayer {
    type Service = IsolationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        IsolationService { inner }
    }
}

/// Service produced by [`IsolationLayer`].
#[derive(Debug, Clone)]
pub struct IsolationService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for IsolationService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = MapOk<S::Future, fn(Response<ResBody>) -> Response<ResBody>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        self.inner
            .call(request)
            .map_ok(apply_isolation_headers as fn(Response<ResBody>) -> Response<ResBody>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[test]
    fn policy_order_and_values() {
        let entries: Vec<_> = HeaderPolicy::cross_origin_isolation().entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, CROSS_ORIGIN_EMBEDDER_POLICY);
        assert_eq!(entries[0].1, "require-corp");
        assert_eq!(entries[1].0, CROSS_ORIGIN_OPENER_POLICY);
        assert_eq!(entries[1].1, "same-origin");
    }

    #[test]
    fn apply_overwrites_conflicting_values() {
        let mut headers = HeaderMap::new();
        headers.insert(CROSS_ORIGIN_OPENER_POLICY, HeaderValue::from_static("unsafe-none"));
        headers.append(CROSS_ORIGIN_OPENER_POLICY, HeaderValue::from_static("same-origin-allow-popups"));

        let policy = HeaderPolicy::cross_origin_isolation();
        assert!(!policy.is_satisfied_by(&headers));

        policy.apply(&mut headers);
        assert!(policy.is_satisfied_by(&headers));
        assert_eq!(headers.get_all(CROSS_ORIGIN_OPENER_POLICY).iter().count(), 1);
    }

    #[test]
    fn apply_is_idempotent() {
        let response = Response::new(());
        let once = apply_isolation_headers(response);
        let first = once.headers().clone();
        let twice = apply_isolation_headers(once);
        assert_eq!(&first, twice.headers());
        assert_eq!(twice.headers().len(), 2);
    }

    #[test]
    fn violations_name_missing_and_wrong_headers() {
        let policy = HeaderPolicy::cross_origin_isolation();
        let mut headers = HeaderMap::new();
        assert_eq!(
            policy.violations(&headers),
            vec![CROSS_ORIGIN_EMBEDDER_POLICY, CROSS_ORIGIN_OPENER_POLICY]
        );

        headers.insert(CROSS_ORIGIN_EMBEDDER_POLICY, HeaderValue::from_static("credentialless"));
        headers.insert(CROSS_ORIGIN_OPENER_POLICY, HeaderValue::from_static("same-origin"));
        assert_eq!(policy.violations(&headers), vec![CROSS_ORIGIN_EMBEDDER_POLICY]);
    }

    #[test]
    fn repeated_value_is_a_violation() {
        let policy = HeaderPolicy::cross_origin_isolation();
        let mut headers = HeaderMap::new();
        policy.apply(&mut headers);
        headers.append(CROSS_ORIGIN_EMBEDDER_POLICY, HeaderValue::from_static("unsafe-none"));

        assert_eq!(policy.violations(&headers), vec![CROSS_ORIGIN_EMBEDDER_POLICY]);
        assert!(!policy.is_satisfied_by(&headers));
    }

    #[tokio::test]
    async fn layer_stamps_any_status_and_calls_inner_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let inner = tower::service_fn(move |_req: Request<Body>| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                let mut response = Response::new(Body::from("missing"));
                *response.status_mut() = StatusCode::NOT_FOUND;
                Ok::<_, Infallible>(response)
            }
        });

        let response = IsolationLayer
            .layer(inner)
            .oneshot(Request::new(Body::empty()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(HeaderPolicy::default().is_satisfied_by(response.headers()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
