use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use axum::body::Body;
use axum::http::header::{ALLOW, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use axum::http::{HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{on, MethodFilter};
use axum::Router;
use futures_util::future::BoxFuture;
use thiserror::Error;
use tracing::debug;

/// A type-erased request handler that any router adapter can mount.
pub type BoxHandler = Arc<dyn Fn(Request<Body>) -> BoxFuture<'static, Response> + Send + Sync>;

/// Boxes an async function into a [`BoxHandler`].
pub fn handler_fn<F, Fut>(f: F) -> BoxHandler
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req| Box::pin(f(req)))
}

/// Wraps `handler` so that any other method than `method` gets a 405.
pub(crate) fn method_guard(method: Method, handler: BoxHandler) -> BoxHandler {
    handler_fn(move |req: Request<Body>| {
        let allowed = method.clone();
        let handler = handler.clone();
        async move {
            if *req.method() != allowed {
                let mut res = error(StatusCode::METHOD_NOT_ALLOWED);
                if let Ok(value) = HeaderValue::from_str(allowed.as_str()) {
                    res.headers_mut().insert(ALLOW, value);
                }
                return res;
            }
            handler(req).await
        }
    })
}

/// Plain-text error response carrying the status' canonical reason.
pub fn error(status: StatusCode) -> Response {
    let text = format!("{}\n", status.canonical_reason().unwrap_or_default());
    (
        status,
        [
            (CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8")),
            (X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        ],
        text,
    )
        .into_response()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("Invalid route path: {0:?}")]
    InvalidPath(String),

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(Method),

    #[error("Route already registered: {method} {path}")]
    Duplicate { method: String, path: String },
}

/// Capability to register a handler for a method and path.
///
/// Handlers register through this trait only, so the same handler can be
/// mounted on any router that has an adapter.
pub trait HandlerFunc {
    fn handler_func(
        &mut self,
        method: Method,
        path: &str,
        handler: BoxHandler,
    ) -> Result<(), RouteError>;
}

/// Adapter over [`axum::Router`].
///
/// Wrong methods on a known path get a 405, unknown paths axum's 404.
/// HEAD is not served by GET handlers.
pub struct AxumRouter {
    router: Router,
    registered: HashSet<(Method, String)>,
}

impl AxumRouter {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            registered: HashSet::new(),
        }
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

impl Default for AxumRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerFunc for AxumRouter {
    fn handler_func(
        &mut self,
        method: Method,
        path: &str,
        handler: BoxHandler,
    ) -> Result<(), RouteError> {
        validate_path(path)?;
        let filter = method_filter(&method)?;

        if !self.registered.insert((method.clone(), path.to_string())) {
            return Err(RouteError::Duplicate {
                method: method.to_string(),
                path: path.to_string(),
            });
        }

        // axum hands HEAD to the GET handler, the guard turns it away
        let handler = method_guard(method.clone(), handler);

        // axum merges method routers registered on the same path
        let router = std::mem::replace(&mut self.router, Router::new());
        self.router = router.route(
            path,
            on(filter, move |req: Request<Body>| async move { handler(req).await }),
        );

        debug!("Registered {} {} on axum router", method, path);
        Ok(())
    }
}

/// Only literal absolute paths are routable: `:` and `*` would start a
/// capture or wildcard in axum's matcher.
pub(crate) fn validate_path(path: &str) -> Result<(), RouteError> {
    if path.starts_with('/') && !path.contains([':', '*']) {
        Ok(())
    } else {
        Err(RouteError::InvalidPath(path.to_string()))
    }
}

fn method_filter(method: &Method) -> Result<MethodFilter, RouteError> {
    let filter = match *method {
        Method::GET => MethodFilter::GET,
        Method::HEAD => MethodFilter::HEAD,
        Method::POST => MethodFilter::POST,
        Method::PUT => MethodFilter::PUT,
        Method::PATCH => MethodFilter::PATCH,
        Method::DELETE => MethodFilter::DELETE,
        Method::OPTIONS => MethodFilter::OPTIONS,
        Method::TRACE => MethodFilter::TRACE,
        _ => return Err(RouteError::UnsupportedMethod(method.clone())),
    };
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    fn status(code: StatusCode) -> BoxHandler {
        handler_fn(move |_req| async move { code.into_response() })
    }

    async fn call(router: Router, method: Method, uri: &str) -> StatusCode {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        router.oneshot(req).await.unwrap().status()
    }

    #[tokio::test]
    async fn several_methods_share_a_path() {
        let mut router = AxumRouter::new();
        router.handler_func(Method::GET, "/items", status(StatusCode::OK)).unwrap();
        router.handler_func(Method::POST, "/items", status(StatusCode::CREATED)).unwrap();
        let router = router.into_router();

        assert_eq!(call(router.clone(), Method::GET, "/items").await, StatusCode::OK);
        assert_eq!(call(router.clone(), Method::POST, "/items").await, StatusCode::CREATED);
        assert_eq!(call(router, Method::DELETE, "/items").await, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut router = AxumRouter::new();
        router.handler_func(Method::GET, "/items", status(StatusCode::OK)).unwrap();

        let err = router
            .handler_func(Method::GET, "/items", status(StatusCode::OK))
            .unwrap_err();
        assert_eq!(err, RouteError::Duplicate {
            method: "GET".to_string(),
            path: "/items".to_string(),
        });
    }

    #[test]
    fn path_must_be_absolute() {
        let mut router = AxumRouter::new();
        let err = router
            .handler_func(Method::GET, "items", status(StatusCode::OK))
            .unwrap_err();
        assert_eq!(err, RouteError::InvalidPath("items".to_string()));

        let err = router
            .handler_func(Method::GET, "", status(StatusCode::OK))
            .unwrap_err();
        assert_eq!(err, RouteError::InvalidPath(String::new()));
    }

    #[test]
    fn captures_and_wildcards_are_rejected() {
        let mut router = AxumRouter::new();
        for path in ["/a/:x", "/a/:y", "/a/*rest/b", "/*all", "/a/b:c"] {
            let err = router
                .handler_func(Method::GET, path, status(StatusCode::OK))
                .unwrap_err();
            assert_eq!(err, RouteError::InvalidPath(path.to_string()));
        }
    }

    #[tokio::test]
    async fn head_is_not_served_by_get() {
        let mut router = AxumRouter::new();
        router.handler_func(Method::GET, "/items", status(StatusCode::OK)).unwrap();

        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/items")
            .body(Body::empty())
            .unwrap();
        let res = router.into_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()[ALLOW], "GET");
    }

    #[test]
    fn connect_is_not_routable() {
        let mut router = AxumRouter::new();
        let err = router
            .handler_func(Method::CONNECT, "/tunnel", status(StatusCode::OK))
            .unwrap_err();
        assert_eq!(err, RouteError::UnsupportedMethod(Method::CONNECT));
    }
}
