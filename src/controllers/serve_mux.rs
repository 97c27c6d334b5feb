//! Path-only request multiplexer.
//!
//! `ServeMux` dispatches on the request path alone; it knows nothing about
//! methods. `WrapServeMux` adapts it to [`HandlerFunc`] by checking the
//! method inside the registered handler.

use std::collections::HashMap;
use std::convert::Infallible;
use std::task::{Context, Poll};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use futures_util::future::BoxFuture;
use tower::Service;
use tracing::debug;

use crate::controllers::router::{error, method_guard, validate_path, BoxHandler, HandlerFunc, RouteError};

#[derive(Clone, Default)]
pub struct ServeMux {
    routes: HashMap<String, BoxHandler>,
}

impl ServeMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `pattern`, whatever the request method.
    ///
    /// A pattern ending in `/` matches the whole subtree below it.
    pub fn handle_func(&mut self, pattern: &str, handler: BoxHandler) -> Result<(), RouteError> {
        validate_path(pattern)?;
        if self.routes.contains_key(pattern) {
            return Err(RouteError::Duplicate {
                method: "*".to_string(),
                path: pattern.to_string(),
            });
        }
        self.routes.insert(pattern.to_string(), handler);
        Ok(())
    }

    /// Finds the handler for `path`: an exact pattern first, then the
    /// longest subtree pattern that prefixes it.
    pub fn handler(&self, path: &str) -> Option<&BoxHandler> {
        if let Some(handler) = self.routes.get(path) {
            return Some(handler);
        }

        self.routes
            .iter()
            .filter(|(pattern, _)| pattern.ends_with('/') && path.starts_with(pattern.as_str()))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(_, handler)| handler)
    }
}

impl Service<Request<Body>> for ServeMux {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        match self.handler(req.uri().path()).cloned() {
            Some(handler) => Box::pin(async move { Ok(handler(req).await) }),
            None => Box::pin(async { Ok(error(StatusCode::NOT_FOUND)) }),
        }
    }
}

/// Makes a [`ServeMux`] satisfy [`HandlerFunc`].
#[derive(Clone, Default)]
pub struct WrapServeMux {
    mux: ServeMux,
}

impl WrapServeMux {
    pub fn new(mux: ServeMux) -> Self {
        Self { mux }
    }

    pub fn into_inner(self) -> ServeMux {
        self.mux
    }
}

impl HandlerFunc for WrapServeMux {
    fn handler_func(
        &mut self,
        method: Method,
        path: &str,
        handler: BoxHandler,
    ) -> Result<(), RouteError> {
        self.mux.handle_func(path, method_guard(method.clone(), handler))?;

        debug!("Registered {} {} on serve mux", method, path);
        Ok(())
    }
}
