//! OpenAPI document for the device API.

use crate::handlers::device;
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Device API",
        description = "Create, read, update, list and delete device records."
    ),
    paths(
        device::create,
        device::read,
        device::list,
        device::patch,
        device::put,
        device::delete
    ),
    tags((name = "devices", description = "Device records"))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
