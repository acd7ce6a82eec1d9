//! Device entity and the rules that govern changes to it.

use crate::error::AppError;
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Wire format of timestamps: UTC, no zone suffix, second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Drop sub-second precision so stored and returned timestamps compare equal.
pub fn truncate_to_seconds(t: NaiveDateTime) -> NaiveDateTime {
    t.with_nanosecond(0).unwrap_or(t)
}

/// Parse a wire timestamp. A fractional part is accepted and truncated.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M:%S%.f").map(truncate_to_seconds)
}

pub fn format_timestamp(t: &NaiveDateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceState {
    Available,
    InUse,
    Inactive,
}

#[derive(Debug, Error)]
#[error("unknown device state: {0}")]
pub struct UnknownDeviceState(pub String);

impl DeviceState {
    pub const ALL: [DeviceState; 3] = [DeviceState::Available, DeviceState::InUse, DeviceState::Inactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceState::Available => "AVAILABLE",
            DeviceState::InUse => "IN_USE",
            DeviceState::Inactive => "INACTIVE",
        }
    }

    /// `[ AVAILABLE IN_USE INACTIVE ]`, used in client-facing hints.
    pub fn values_description() -> String {
        let names: Vec<&str> = Self::ALL.iter().map(DeviceState::as_str).collect();
        format!("[ {} ]", names.join(" "))
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceState {
    type Err = UnknownDeviceState;

    /// Exact, case-sensitive match on the wire name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownDeviceState(s.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Device {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub state: DeviceState,
    pub creation_time: NaiveDateTime,
    pub last_modified: NaiveDateTime,
}

/// Validated payload of a create request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewDevice {
    pub name: String,
    pub brand: String,
}

/// Validated partial update; `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DevicePatch {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub state: Option<DeviceState>,
}

/// Validated full replacement. `creation_time` is only meaningful when the device does not exist yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceReplace {
    pub name: String,
    pub brand: String,
    pub state: DeviceState,
    pub creation_time: Option<NaiveDateTime>,
}

impl Device {
    /// New devices always start out available.
    pub fn new(id: Uuid, new: NewDevice, now: NaiveDateTime) -> Self {
        let now = truncate_to_seconds(now);
        Device {
            id,
            name: new.name,
            brand: new.brand,
            state: DeviceState::Available,
            creation_time: now,
            last_modified: now,
        }
    }

    /// Build a device from a replacement targeting an unknown id.
    pub fn from_replace(id: Uuid, replace: &DeviceReplace, now: NaiveDateTime) -> Result<Self, AppError> {
        let creation_time = replace
            .creation_time
            .ok_or_else(|| AppError::BadRequest("A required field 'creation_time' is missing".into()))?;
        Ok(Device {
            id,
            name: replace.name.clone(),
            brand: replace.brand.clone(),
            state: replace.state,
            creation_time: truncate_to_seconds(creation_time),
            last_modified: truncate_to_seconds(now),
        })
    }

    pub fn is_in_use(&self) -> bool {
        self.state == DeviceState::InUse
    }

    /// Any name or brand in the patch is rejected while the device is in use, even an unchanged one.
    pub fn apply_patch(&mut self, patch: &DevicePatch, now: NaiveDateTime) -> Result<(), AppError> {
        if (patch.name.is_some() || patch.brand.is_some()) && self.is_in_use() {
            return Err(AppError::InUseModification(self.id));
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(brand) = &patch.brand {
            self.brand = brand.clone();
        }
        if let Some(state) = patch.state {
            self.state = state;
        }
        self.last_modified = truncate_to_seconds(now);
        Ok(())
    }

    /// Replacing an existing device never touches `creation_time`; name and brand may only
    /// be rewritten to their current values while the device is in use.
    pub fn apply_replace(&mut self, replace: &DeviceReplace, now: NaiveDateTime) -> Result<(), AppError> {
        if replace.creation_time.is_some() {
            return Err(AppError::CreationTimeImmutable(self.id));
        }
        let name_or_brand_changed = replace.name != self.name || replace.brand != self.brand;
        if name_or_brand_changed && self.is_in_use() {
            return Err(AppError::InUseModification(self.id));
        }
        self.name = replace.name.clone();
        self.brand = replace.brand.clone();
        self.state = replace.state;
        self.last_modified = truncate_to_seconds(now);
        Ok(())
    }

    pub fn ensure_deletable(&self) -> Result<(), AppError> {
        if self.is_in_use() {
            return Err(AppError::InUseDeletion(self.id));
        }
        Ok(())
    }
}
