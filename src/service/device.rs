//! Device operations: validation, id and timestamp assignment, repository calls.

use super::validation::RequestValidator;
use crate::clock::Clock;
use crate::dto::{DeviceCreateRequest, DevicePatchRequest, DevicePutRequest};
use crate::error::AppError;
use crate::model::Device;
use crate::page::{DeviceFilter, Page, PageRequest};
use crate::repository::{DeviceRepository, Upserted};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct DeviceService {
    repository: Arc<dyn DeviceRepository>,
    clock: Arc<dyn Clock>,
}

impl DeviceService {
    pub fn new(repository: Arc<dyn DeviceRepository>, clock: Arc<dyn Clock>) -> Self {
        DeviceService { repository, clock }
    }

    #[instrument(skip_all)]
    pub async fn create(&self, req: DeviceCreateRequest) -> Result<Device, AppError> {
        let new = RequestValidator::validate_create(req).map_err(AppError::Validation)?;
        let device = Device::new(Uuid::new_v4(), new, self.clock.now());
        let device = self.repository.insert(device).await?;
        tracing::debug!(id = %device.id, "device created");
        Ok(device)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Device, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(id))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: DeviceFilter, page: PageRequest) -> Result<Page<Device>, AppError> {
        self.repository.list(&filter, &page).await
    }

    #[instrument(skip(self, req))]
    pub async fn patch(&self, id: Uuid, req: DevicePatchRequest) -> Result<Device, AppError> {
        let patch = RequestValidator::validate_patch(req).map_err(AppError::Validation)?;
        let device = self.repository.update(id, &patch, self.clock.now()).await?;
        tracing::debug!(%id, "device patched");
        Ok(device)
    }

    /// Replace the device, or create it under `id` when it does not exist.
    #[instrument(skip(self, req))]
    pub async fn put(&self, id: Uuid, req: DevicePutRequest) -> Result<Upserted, AppError> {
        let replace = RequestValidator::validate_put(req).map_err(AppError::Validation)?;
        let upserted = self
            .repository
            .replace_or_create(id, &replace, self.clock.now())
            .await?;
        tracing::debug!(%id, created = upserted.created, "device replaced");
        Ok(upserted)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.repository.delete(id).await?;
        tracing::debug!(%id, "device deleted");
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }
}
