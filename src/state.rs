//! Shared application state for all routes.

use crate::clock::Clock;
use crate::repository::DeviceRepository;
use crate::service::DeviceService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub devices: Arc<DeviceService>,
}

impl AppState {
    pub fn new(repository: Arc<dyn DeviceRepository>, clock: Arc<dyn Clock>) -> Self {
        AppState {
            devices: Arc::new(DeviceService::new(repository, clock)),
        }
    }
}
