//! ETag File Server Service
//!
//! A tower service that resolves the ETag for the request path, delegates to
//! the wrapped static-file service unconditionally, and decorates the
//! response with `ETag` and `Cache-Control` when a tag exists. Entity-tag
//! preconditions are answered here since the delegate never sees the tag.

use std::borrow::Cow;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes, HttpBody};
use axum::http::{header, HeaderValue, Request, Response, StatusCode};
use axum::BoxError;
use tower::Service;
use tower_http::services::ServeDir;
use tracing::warn;

use crate::etag::{ETag, Mode, TagResolver, CACHE_CONTROL};
use crate::fs::DirFileSystem;
use crate::server::conditional::{Outcome, Preconditions};

// == ETag File Server ==
/// Wraps a static-file service and attaches content-hash validators.
#[derive(Clone)]
pub struct EtagFileServer<S = ServeDir> {
    resolver: Arc<dyn TagResolver>,
    inner: S,
}

impl EtagFileServer<ServeDir> {
    /// Serves `root` with `ServeDir`, hashing files from the same directory.
    pub fn serve_dir(root: impl Into<PathBuf>, mode: Mode) -> Self {
        let root = root.into();
        let resolver = mode.resolver(DirFileSystem::new(root.clone()));
        Self::new(resolver, ServeDir::new(root))
    }
}

impl<S> EtagFileServer<S> {
    /// Wraps `inner`, taking tags from `resolver`.
    pub fn new(resolver: Arc<dyn TagResolver>, inner: S) -> Self {
        Self { resolver, inner }
    }

    /// Returns the resolver shared by every clone of this service.
    pub fn resolver(&self) -> &Arc<dyn TagResolver> {
        &self.resolver
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for EtagFileServer<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: HttpBody<Data = Bytes> + Send + 'static,
    ResBody::Error: Into<BoxError>,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        // Take the service that was driven to readiness, leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let resolver = self.resolver.clone();

        Box::pin(async move {
            let path = decode_path(req.uri().path()).into_owned();
            let preconditions = Preconditions::from_request(&req);

            let tag = resolve_tag(resolver, path).await;
            if tag.is_some() {
                preconditions.strip_overridden(req.headers_mut());
            }
            let response = inner.call(req).await?;

            Ok(decorate(response, tag, &preconditions))
        })
    }
}

/// Percent-decodes the path component; the query string is never part of it.
fn decode_path(path: &str) -> Cow<'_, str> {
    urlencoding::decode(path).unwrap_or(Cow::Borrowed(path))
}

/// Runs the blocking lookup off the async workers.
async fn resolve_tag(resolver: Arc<dyn TagResolver>, path: String) -> Option<ETag> {
    match tokio::task::spawn_blocking(move || resolver.resolve(&path)).await {
        Ok(tag) => tag,
        Err(err) => {
            warn!(error = %err, "etag resolution task failed");
            None
        }
    }
}

/// Sets the caching headers and applies the entity-tag preconditions.
///
/// Preconditions only apply when the delegate found the file; errors such as
/// `404` pass through with the tag attached.
fn decorate<B>(
    response: Response<B>,
    tag: Option<ETag>,
    preconditions: &Preconditions,
) -> Response<Body>
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let Some(tag) = tag else {
        return response.map(Body::new);
    };
    let Ok(etag) = HeaderValue::from_str(tag.as_str()) else {
        return response.map(Body::new);
    };
    let cache_control = HeaderValue::from_static(CACHE_CONTROL);

    let status = response.status();
    let outcome = if status.is_success()
        || status == StatusCode::NOT_MODIFIED
        || status == StatusCode::METHOD_NOT_ALLOWED
    {
        preconditions.evaluate(&tag)
    } else {
        Outcome::Proceed
    };

    let mut response = match outcome.status() {
        Some(status) => empty_with_validators(&response, status),
        None => response.map(Body::new),
    };

    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, cache_control);
    headers.insert(header::ETAG, etag);
    response
}

/// Builds an empty `304`/`412` that keeps the delegate's validators.
fn empty_with_validators<B>(response: &Response<B>, status: StatusCode) -> Response<Body> {
    let mut empty = Response::new(Body::empty());
    *empty.status_mut() = status;

    for name in [header::LAST_MODIFIED, header::VARY] {
        if let Some(value) = response.headers().get(&name) {
            empty.headers_mut().insert(name, value.clone());
        }
    }

    empty
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use sha2::{Digest, Sha256};
    use tempfile::TempDir;
    use tower::{service_fn, ServiceExt};

    fn site() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        fs::write(dir.path().join("my file.css"), "body {}").unwrap();
        dir
    }

    fn expected_tag(content: &str) -> String {
        format!("W/\"{}\"", hex::encode(Sha256::digest(content.as_bytes())))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_string(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_existing_file_gets_headers() {
        let dir = site();
        let server = EtagFileServer::serve_dir(dir.path(), Mode::Static);

        let response = server.oneshot(get("/app.js")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ETAG],
            expected_tag("console.log(1)").as_str()
        );
        assert_eq!(response.headers()[header::CACHE_CONTROL], CACHE_CONTROL);
        assert_eq!(body_string(response).await, "console.log(1)");
    }

    #[tokio::test]
    async fn test_missing_file_has_no_headers() {
        let dir = site();
        let server = EtagFileServer::serve_dir(dir.path(), Mode::Static);

        let response = server.oneshot(get("/missing.css")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::ETAG).is_none());
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    }

    #[tokio::test]
    async fn test_query_string_is_ignored() {
        let dir = site();
        let server = EtagFileServer::serve_dir(dir.path(), Mode::Static);

        let first = server.clone().oneshot(get("/app.js?v=1")).await.unwrap();
        let second = server.clone().oneshot(get("/app.js?v=2")).await.unwrap();

        assert_eq!(first.headers()[header::ETAG], second.headers()[header::ETAG]);
        let stats = server.resolver().stats();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.computations, 1);
    }

    #[tokio::test]
    async fn test_percent_encoded_path() {
        let dir = site();
        let server = EtagFileServer::serve_dir(dir.path(), Mode::Static);

        let response = server.oneshot(get("/my%20file.css")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ETAG],
            expected_tag("body {}").as_str()
        );
    }

    #[tokio::test]
    async fn test_matching_if_none_match_is_not_modified() {
        let dir = site();
        let server = EtagFileServer::serve_dir(dir.path(), Mode::Static);
        let tag = expected_tag("console.log(1)");

        let request = Request::builder()
            .uri("/app.js")
            .header(header::IF_NONE_MATCH, tag.as_str())
            .body(Body::empty())
            .unwrap();
        let response = server.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(response.headers()[header::ETAG], tag.as_str());
        assert_eq!(response.headers()[header::CACHE_CONTROL], CACHE_CONTROL);
        assert!(response.headers().get(header::LAST_MODIFIED).is_some());
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn test_stale_if_none_match_gets_full_body() {
        let dir = site();
        let server = EtagFileServer::serve_dir(dir.path(), Mode::Static);

        let request = Request::builder()
            .uri("/app.js")
            .header(header::IF_NONE_MATCH, "W/\"stale\"")
            .body(Body::empty())
            .unwrap();
        let response = server.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "console.log(1)");
    }

    #[tokio::test]
    async fn test_dynamic_mode_follows_rewrites() {
        let dir = site();
        let server = EtagFileServer::serve_dir(dir.path(), Mode::Dynamic);

        let first = server.clone().oneshot(get("/app.js")).await.unwrap();
        fs::write(dir.path().join("app.js"), "console.log(2)").unwrap();
        let second = server.clone().oneshot(get("/app.js")).await.unwrap();

        assert_eq!(
            first.headers()[header::ETAG],
            expected_tag("console.log(1)").as_str()
        );
        assert_eq!(
            second.headers()[header::ETAG],
            expected_tag("console.log(2)").as_str()
        );
    }

    #[tokio::test]
    async fn test_static_mode_ignores_rewrites() {
        let dir = site();
        let server = EtagFileServer::serve_dir(dir.path(), Mode::Static);

        let first = server.clone().oneshot(get("/app.js")).await.unwrap();
        fs::write(dir.path().join("app.js"), "console.log(2)").unwrap();
        let second = server.clone().oneshot(get("/app.js")).await.unwrap();

        assert_eq!(first.headers()[header::ETAG], second.headers()[header::ETAG]);
        assert_eq!(body_string(second).await, "console.log(2)");
    }

    #[tokio::test]
    async fn test_delegate_runs_when_tag_fails() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let delegate = service_fn(move |_req: Request<Body>| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                let mut response = Response::new(Body::from("gone"));
                *response.status_mut() = StatusCode::GONE;
                Ok::<_, Infallible>(response)
            }
        });
        let resolver = Mode::Static.resolver(DirFileSystem::new(dir.path()));
        let server = EtagFileServer::new(resolver, delegate);

        let response = server.oneshot(get("/missing.css")).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.status(), StatusCode::GONE);
        assert!(response.headers().get(header::ETAG).is_none());
        assert_eq!(body_string(response).await, "gone");
    }

    #[tokio::test]
    async fn test_matching_tag_on_partial_content_is_not_modified() {
        let dir = site();
        let delegate = service_fn(|_req: Request<Body>| async {
            let mut response = Response::new(Body::from("partial"));
            *response.status_mut() = StatusCode::PARTIAL_CONTENT;
            Ok::<_, Infallible>(response)
        });
        let resolver = Mode::Static.resolver(DirFileSystem::new(dir.path()));
        let server = EtagFileServer::new(resolver, delegate);

        let request = Request::builder()
            .uri("/app.js")
            .header(header::IF_NONE_MATCH, "*")
            .body(Body::empty())
            .unwrap();
        let response = server.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn test_delegate_error_is_not_revalidated() {
        let dir = site();
        let delegate = service_fn(|_req: Request<Body>| async {
            let mut response = Response::new(Body::from("boom"));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            Ok::<_, Infallible>(response)
        });
        let resolver = Mode::Static.resolver(DirFileSystem::new(dir.path()));
        let server = EtagFileServer::new(resolver, delegate);

        let request = Request::builder()
            .uri("/app.js")
            .header(header::IF_NONE_MATCH, "*")
            .body(Body::empty())
            .unwrap();
        let response = server.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::ETAG).is_some());
        assert_eq!(body_string(response).await, "boom");
    }

    #[tokio::test]
    async fn test_date_validator_hidden_from_delegate_when_tag_given() {
        let dir = site();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let delegate = service_fn(move |req: Request<Body>| {
            if req.headers().contains_key(header::IF_MODIFIED_SINCE) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            async { Ok::<_, Infallible>(Response::new(Body::from("console.log(1)"))) }
        });
        let resolver = Mode::Static.resolver(DirFileSystem::new(dir.path()));
        let server = EtagFileServer::new(resolver, delegate);

        let request = Request::builder()
            .uri("/app.js")
            .header(header::IF_NONE_MATCH, "W/\"stale\"")
            .header(header::IF_MODIFIED_SINCE, "Mon, 19 Oct 2026 10:00:00 GMT")
            .body(Body::empty())
            .unwrap();
        let response = server.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        // Without an entity tag the date validator reaches the delegate.
        let request = Request::builder()
            .uri("/app.js")
            .header(header::IF_MODIFIED_SINCE, "Mon, 19 Oct 2026 10:00:00 GMT")
            .body(Body::empty())
            .unwrap();
        server.oneshot(request).await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_if_match_with_weak_tag_fails() {
        let dir = site();
        let server = EtagFileServer::serve_dir(dir.path(), Mode::Static);
        let tag = expected_tag("console.log(1)");

        let request = Request::builder()
            .uri("/app.js")
            .header(header::IF_MATCH, tag.as_str())
            .body(Body::empty())
            .unwrap();
        let response = server.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
        assert_eq!(response.headers()[header::ETAG], tag.as_str());
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn test_if_match_star_serves_file() {
        let dir = site();
        let server = EtagFileServer::serve_dir(dir.path(), Mode::Static);

        let request = Request::builder()
            .uri("/app.js")
            .header(header::IF_MATCH, "*")
            .body(Body::empty())
            .unwrap();
        let response = server.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "console.log(1)");
    }

    #[tokio::test]
    async fn test_matching_tag_on_unsafe_method_fails() {
        let dir = site();
        let server = EtagFileServer::serve_dir(dir.path(), Mode::Static);

        let request = Request::builder()
            .method("POST")
            .uri("/app.js")
            .header(header::IF_NONE_MATCH, expected_tag("console.log(1)").as_str())
            .body(Body::empty())
            .unwrap();
        let response = server.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/my%20file.css"), "/my file.css");
        assert_eq!(decode_path("/plain.js"), "/plain.js");
        assert_eq!(decode_path("/bad%FF"), "/bad%FF");
    }
}
