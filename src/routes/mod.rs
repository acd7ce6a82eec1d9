//! Router assembly.

mod common;
mod device;

pub use common::common_routes;
pub use device::device_routes;

use crate::openapi::openapi_json;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Full application: ambient routes at the root, devices under `/api`, bodies capped
/// at `body_limit` bytes, every request traced.
pub fn app_router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .route(OPENAPI_PATH, get(openapi_json))
        .nest("/api", device_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(body_limit)),
        )
}
