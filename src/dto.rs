//! Wire payloads. Request fields are optional so that missing values surface as
//! field-level validation errors instead of deserialization failures.

use crate::model::{format_timestamp, Device, DeviceState};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct DeviceCreateRequest {
    #[schema(example = "sensor-1", max_length = 255)]
    pub name: Option<String>,
    #[schema(example = "acme", max_length = 255)]
    pub brand: Option<String>,
}

/// At least one field must be present.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct DevicePatchRequest {
    #[schema(max_length = 255)]
    pub name: Option<String>,
    #[schema(max_length = 255)]
    pub brand: Option<String>,
    #[schema(example = "IN_USE")]
    pub state: Option<String>,
}

/// Full replacement. `creation_time` is required when the id does not exist yet
/// and forbidden when it does.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct DevicePutRequest {
    #[schema(max_length = 255)]
    pub name: Option<String>,
    #[schema(max_length = 255)]
    pub brand: Option<String>,
    #[schema(example = "AVAILABLE")]
    pub state: Option<String>,
    #[schema(example = "2025-03-14T10:00:00")]
    pub creation_time: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeviceResponse {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub state: DeviceState,
    #[schema(example = "2025-03-14T10:00:00")]
    pub creation_time: String,
    #[schema(example = "2025-03-14T10:00:00")]
    pub last_modified: String,
}

impl From<Device> for DeviceResponse {
    fn from(device: Device) -> Self {
        DeviceResponse {
            id: device.id,
            creation_time: format_timestamp(&device.creation_time),
            last_modified: format_timestamp(&device.last_modified),
            name: device.name,
            brand: device.brand,
            state: device.state,
        }
    }
}
