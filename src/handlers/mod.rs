//! HTTP handlers for device CRUD.

pub mod device;
pub use device::*;
