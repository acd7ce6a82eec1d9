//! Device persistence. The service only sees [`DeviceRepository`]; PostgreSQL backs it in
//! production and [`InMemoryDeviceRepository`] in tests and local runs.

mod memory;
mod postgres;

pub use memory::InMemoryDeviceRepository;
pub use postgres::PgDeviceRepository;

use crate::error::AppError;
use crate::model::{Device, DevicePatch, DeviceReplace};
use crate::page::{DeviceFilter, Page, PageRequest};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

/// Result of a PUT: whether the device was created, and its stored form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upserted {
    pub created: bool,
    pub device: Device,
}

/// Mutations read, check and write one device atomically.
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Fails with `Conflict` when the id is taken.
    async fn insert(&self, device: Device) -> Result<Device, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Device>, AppError>;

    async fn list(&self, filter: &DeviceFilter, page: &PageRequest) -> Result<Page<Device>, AppError>;

    /// `NotFound` when absent; IN_USE rules come from [`Device::apply_patch`].
    async fn update(&self, id: Uuid, patch: &DevicePatch, now: NaiveDateTime) -> Result<Device, AppError>;

    /// Replace an existing device or create one with the given id.
    async fn replace_or_create(
        &self,
        id: Uuid,
        replace: &DeviceReplace,
        now: NaiveDateTime,
    ) -> Result<Upserted, AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Storage reachability, for readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}
