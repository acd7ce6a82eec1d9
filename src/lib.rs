//! Device API: REST service for device records backed by PostgreSQL.

pub mod clock;
pub mod config;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod openapi;
pub mod page;
pub mod repository;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use error::{AppError, ConfigError, MigrationError};
pub use migration::apply_migrations;
pub use model::{Device, DeviceState};
pub use repository::{DeviceRepository, InMemoryDeviceRepository, PgDeviceRepository};
pub use routes::app_router;
pub use service::DeviceService;
pub use state::AppState;
pub use store::{connect_pool, ensure_database_exists};
