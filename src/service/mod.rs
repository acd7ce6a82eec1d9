//! DeviceService and request validation.

mod device;
mod validation;
pub use device::DeviceService;
pub use validation::{RequestValidator, ValidationErrors, MAX_TEXT_LENGTH};
