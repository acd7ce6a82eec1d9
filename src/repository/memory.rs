use super::{DeviceRepository, Upserted};
use crate::error::AppError;
use crate::model::{Device, DevicePatch, DeviceReplace};
use crate::page::{DeviceFilter, Page, PageRequest};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Store {
    devices: HashMap<Uuid, Device>,
    /// Ids of deleted devices.
    deleted: HashSet<Uuid>,
}

/// Map-backed repository. A single write lock makes every mutation atomic.
#[derive(Debug, Default)]
pub struct InMemoryDeviceRepository {
    store: RwLock<Store>,
}

impl InMemoryDeviceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.devices.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.devices.is_empty()
    }
}

#[async_trait]
impl DeviceRepository for InMemoryDeviceRepository {
    async fn insert(&self, device: Device) -> Result<Device, AppError> {
        let mut store = self.store.write().await;
        if store.devices.contains_key(&device.id) {
            return Err(AppError::Conflict(format!("device {} already exists", device.id)));
        }
        store.devices.insert(device.id, device.clone());
        Ok(device)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Device>, AppError> {
        Ok(self.store.read().await.devices.get(&id).cloned())
    }

    async fn list(&self, filter: &DeviceFilter, page: &PageRequest) -> Result<Page<Device>, AppError> {
        let store = self.store.read().await;
        let mut matching: Vec<&Device> = store.devices.values().filter(|d| filter.matches(d)).collect();
        matching.sort_by(|a, b| page.sort.compare(a, b));
        let total = matching.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(page.size as usize)
            .cloned()
            .collect();
        Ok(Page::new(items, page, total))
    }

    async fn update(&self, id: Uuid, patch: &DevicePatch, now: NaiveDateTime) -> Result<Device, AppError> {
        let mut store = self.store.write().await;
        let stored = store.devices.get_mut(&id).ok_or_else(|| AppError::not_found(id))?;
        // work on a copy so a rejected patch leaves the stored device untouched
        let mut device = stored.clone();
        device.apply_patch(patch, now)?;
        *stored = device.clone();
        Ok(device)
    }

    async fn replace_or_create(
        &self,
        id: Uuid,
        replace: &DeviceReplace,
        now: NaiveDateTime,
    ) -> Result<Upserted, AppError> {
        let mut store = self.store.write().await;
        if store.deleted.contains(&id) {
            return Err(AppError::deleted_id(id));
        }
        match store.devices.get_mut(&id) {
            Some(stored) => {
                let mut device = stored.clone();
                device.apply_replace(replace, now)?;
                *stored = device.clone();
                Ok(Upserted { created: false, device })
            }
            None => {
                let device = Device::from_replace(id, replace, now)?;
                store.devices.insert(id, device.clone());
                Ok(Upserted { created: true, device })
            }
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut store = self.store.write().await;
        let device = store.devices.get(&id).ok_or_else(|| AppError::not_found(id))?;
        device.ensure_deletable()?;
        store.devices.remove(&id);
        store.deleted.insert(id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
