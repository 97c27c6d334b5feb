use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{debug, trace};

use crate::controllers::router::{handler_fn, HandlerFunc, RouteError};

pub const HEARTBEAT_URL: &str = "/api/heartbeat";

/// Liveness endpoint. Answers `204 No Content` while the process is up.
#[derive(Debug, Default, Clone, Copy)]
pub struct Handler;

impl Handler {
    pub fn register<R: HandlerFunc + ?Sized>(&self, router: &mut R) -> Result<(), RouteError> {
        router.handler_func(Method::GET, HEARTBEAT_URL, handler_fn(heartbeat))?;
        debug!("Heartbeat available at {}", HEARTBEAT_URL);
        Ok(())
    }
}

async fn heartbeat(_req: Request<Body>) -> Response {
    trace!("Heartbeat");
    StatusCode::NO_CONTENT.into_response()
}
