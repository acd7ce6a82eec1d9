//! Device CRUD handlers.

use crate::dto::{DeviceCreateRequest, DevicePatchRequest, DevicePutRequest, DeviceResponse};
use crate::error::{AppError, ErrorBody};
use crate::extractors::JsonBody;
use crate::model::DeviceState;
use crate::page::{DeviceFilter, PageRequest, Sort};
use crate::response::{success_one, success_one_ok, success_page, SuccessOne, SuccessPage};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::collections::HashMap;
use uuid::Uuid;

/// A path id that is not a UUID names no device.
fn parse_id(id_str: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id_str).map_err(|_| AppError::not_found(id_str))
}

fn parse_number(params: &HashMap<String, String>, key: &str) -> Result<Option<u32>, AppError> {
    params
        .get(key)
        .map(|v| {
            v.trim()
                .parse::<u32>()
                .map_err(|_| AppError::BadRequest(format!("Invalid request parameter {}", key)))
        })
        .transpose()
}

/// Filter and page from `brand`, `state`, `page`, `size`, `sort`. Unknown keys are ignored.
fn list_params(params: &HashMap<String, String>) -> Result<(DeviceFilter, PageRequest), AppError> {
    let brand = params.get("brand").cloned();
    let state = params
        .get("state")
        .map(|s| {
            s.parse::<DeviceState>().map_err(|_| {
                AppError::BadRequest(format!(
                    "Device state value is incorrect use: {}",
                    DeviceState::values_description()
                ))
            })
        })
        .transpose()?;
    let sort = match params.get("sort") {
        Some(s) => Sort::parse(s).map_err(AppError::BadRequest)?,
        None => Sort::default(),
    };
    let page = PageRequest::new(parse_number(params, "page")?, parse_number(params, "size")?, sort);
    Ok((DeviceFilter { brand, state }, page))
}

#[utoipa::path(
    post,
    path = "/api/devices",
    request_body = DeviceCreateRequest,
    responses(
        (status = 201, description = "Device created", body = SuccessOne<DeviceResponse>),
        (status = 400, description = "Validation failed", body = ErrorBody)
    ),
    tag = "devices"
)]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<DeviceCreateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let device = state.devices.create(body).await?;
    Ok(success_one(DeviceResponse::from(device)))
}

#[utoipa::path(
    get,
    path = "/api/devices/{id}",
    params(("id" = String, Path, description = "Device id (UUID)")),
    responses(
        (status = 200, description = "Device found", body = SuccessOne<DeviceResponse>),
        (status = 404, description = "No device with this id", body = ErrorBody)
    ),
    tag = "devices"
)]
pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let device = state.devices.get(id).await?;
    Ok(success_one_ok(DeviceResponse::from(device)))
}

#[utoipa::path(
    get,
    path = "/api/devices",
    params(
        ("brand" = Option<String>, Query, description = "Exact brand match"),
        ("state" = Option<DeviceState>, Query, description = "Exact state match"),
        ("page" = Option<u32>, Query, description = "Zero-based page index"),
        ("size" = Option<u32>, Query, description = "Page size, default 100, max 1000"),
        ("sort" = Option<String>, Query, description = "field[,asc|desc]; default creation_time,asc")
    ),
    responses(
        (status = 200, description = "One page of devices", body = SuccessPage<DeviceResponse>),
        (status = 400, description = "Invalid query parameter", body = ErrorBody)
    ),
    tag = "devices"
)]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let (filter, page) = list_params(&params)?;
    let devices = state.devices.list(filter, page).await?;
    Ok(success_page(devices.map(DeviceResponse::from)))
}

#[utoipa::path(
    patch,
    path = "/api/devices/{id}",
    params(("id" = String, Path, description = "Device id (UUID)")),
    request_body = DevicePatchRequest,
    responses(
        (status = 200, description = "Device updated", body = SuccessOne<DeviceResponse>),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 404, description = "No device with this id", body = ErrorBody),
        (status = 409, description = "Name or brand change while IN_USE", body = ErrorBody)
    ),
    tag = "devices"
)]
pub async fn patch(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    JsonBody(body): JsonBody<DevicePatchRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let device = state.devices.patch(id, body).await?;
    Ok(success_one_ok(DeviceResponse::from(device)))
}

#[utoipa::path(
    put,
    path = "/api/devices/{id}",
    params(("id" = String, Path, description = "Device id (UUID)")),
    request_body = DevicePutRequest,
    responses(
        (status = 200, description = "Device replaced", body = SuccessOne<DeviceResponse>),
        (status = 201, description = "Device created with the given id", body = SuccessOne<DeviceResponse>),
        (status = 400, description = "Validation failed or creation_time missing", body = ErrorBody),
        (status = 409, description = "creation_time given for an existing device, or locked fields changed", body = ErrorBody)
    ),
    tag = "devices"
)]
pub async fn put(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    JsonBody(body): JsonBody<DevicePutRequest>,
) -> Result<impl IntoResponse, AppError> {
    // PUT may create, so a malformed id is a client error rather than a missing device
    let id = Uuid::parse_str(&id_str)
        .map_err(|_| AppError::BadRequest(format!("invalid device id: {}", id_str)))?;
    let upserted = state.devices.put(id, body).await?;
    let data = DeviceResponse::from(upserted.device);
    Ok(if upserted.created {
        success_one(data)
    } else {
        success_one_ok(data)
    })
}

#[utoipa::path(
    delete,
    path = "/api/devices/{id}",
    params(("id" = String, Path, description = "Device id (UUID)")),
    responses(
        (status = 204, description = "Device deleted"),
        (status = 404, description = "No device with this id", body = ErrorBody),
        (status = 409, description = "Device is IN_USE", body = ErrorBody)
    ),
    tag = "devices"
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    state.devices.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Direction, SortField};

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn list_params_default_to_first_page() {
        let (filter, page) = list_params(&params(&[])).unwrap();
        assert_eq!(filter, DeviceFilter::default());
        assert_eq!(page, PageRequest::default());
    }

    #[test]
    fn list_params_parse_everything() {
        let (filter, page) = list_params(&params(&[
            ("brand", "acme"),
            ("state", "INACTIVE"),
            ("page", "2"),
            ("size", "3"),
            ("sort", "name,desc"),
        ]))
        .unwrap();
        assert_eq!(filter.brand.as_deref(), Some("acme"));
        assert_eq!(filter.state, Some(DeviceState::Inactive));
        assert_eq!(page.page, 2);
        assert_eq!(page.size, 3);
        assert_eq!(page.sort.field, SortField::Name);
        assert_eq!(page.sort.direction, Direction::Desc);
    }

    #[test]
    fn invalid_state_lists_allowed_values() {
        let err = list_params(&params(&[("state", "BROKEN")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Device state value is incorrect use: [ AVAILABLE IN_USE INACTIVE ]"
        );
    }

    #[test]
    fn invalid_numbers_are_bad_requests() {
        let err = list_params(&params(&[("size", "-1")])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid request parameter size");
        assert!(matches!(
            list_params(&params(&[("sort", "secret")])),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn non_uuid_path_id_is_not_found() {
        assert!(matches!(parse_id("9999"), Err(AppError::NotFound(id)) if id == "9999"));
    }
}
