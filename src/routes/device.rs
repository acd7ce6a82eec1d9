//! Device routes. Mounted under `/api` by [`crate::routes::app_router`].

use crate::handlers::device::{create, delete as delete_handler, list, patch, put, read};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn device_routes(state: AppState) -> Router {
    Router::new()
        .route("/devices", get(list).post(create))
        .route(
            "/devices/:id",
            get(read).patch(patch).put(put).delete(delete_handler),
        )
        .with_state(state)
}
