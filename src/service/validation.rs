//! Request validation: wire payloads to validated commands, or field-level violations.

use crate::dto::{DeviceCreateRequest, DevicePatchRequest, DevicePutRequest};
use crate::model::{parse_timestamp, DevicePatch, DeviceReplace, DeviceState, NewDevice};
use std::collections::BTreeMap;
use std::fmt;

pub const MAX_TEXT_LENGTH: usize = 255;

/// Violations found in one payload: per field, plus an optional object-level message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
    message: Option<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Object-level violation not tied to a single field.
    pub fn with_message(message: impl Into<String>) -> Self {
        ValidationErrors {
            fields: BTreeMap::new(),
            message: Some(message.into()),
        }
    }

    /// Record a violation; the first one per field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.message.is_none()
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    fn into_result<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, ValidationErrors> {
        if !self.is_empty() {
            return Err(self);
        }
        value().ok_or(self)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = &self.message {
            return f.write_str(message);
        }
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "request validation failed: {}", parts.join(", "))
    }
}

/// Messages for one text field. A required field that is missing reports `blank`.
struct TextRule {
    field: &'static str,
    blank: &'static str,
    too_long: &'static str,
}

const CREATE_NAME: TextRule = TextRule {
    field: "name",
    blank: "Device name is required",
    too_long: "Device name should not be longer 255 characters",
};

const CREATE_BRAND: TextRule = TextRule {
    field: "brand",
    blank: "Brand name is required",
    too_long: "Brand name should not be longer 255 characters",
};

const PATCH_NAME: TextRule = TextRule {
    field: "name",
    blank: "Device name must not be blank",
    too_long: "Device name should not be longer 255 characters",
};

const PATCH_BRAND: TextRule = TextRule {
    field: "brand",
    blank: "Brand name must not be blank",
    too_long: "Brand name should not be longer 255 characters",
};

const PUT_BRAND: TextRule = TextRule {
    field: "brand",
    blank: "Device brand is required",
    too_long: "Brand name should not be longer 255 characters",
};

const STATE_REQUIRED: &str = "Device state is required";
const STATE_INVALID: &str = "Invalid Device state type";
const AT_LEAST_ONE_FIELD: &str = "At least one field must be provided";

pub struct RequestValidator;

impl RequestValidator {
    /// Name and brand required, non-blank, at most 255 characters.
    pub fn validate_create(req: DeviceCreateRequest) -> Result<NewDevice, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, &CREATE_NAME, req.name);
        let brand = required_text(&mut errors, &CREATE_BRAND, req.brand);
        errors.into_result(|| Some(NewDevice { name: name?, brand: brand? }))
    }

    /// Only the fields present are checked; an empty patch is rejected.
    pub fn validate_patch(req: DevicePatchRequest) -> Result<DevicePatch, ValidationErrors> {
        if req.name.is_none() && req.brand.is_none() && req.state.is_none() {
            return Err(ValidationErrors::with_message(AT_LEAST_ONE_FIELD));
        }
        let mut errors = ValidationErrors::new();
        let name = optional_text(&mut errors, &PATCH_NAME, req.name);
        let brand = optional_text(&mut errors, &PATCH_BRAND, req.brand);
        let state = req.state.and_then(|s| parse_state(&mut errors, &s));
        errors.into_result(|| Some(DevicePatch { name, brand, state }))
    }

    /// Name, brand and state required; `creation_time` optional but must parse when present.
    pub fn validate_put(req: DevicePutRequest) -> Result<DeviceReplace, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, &CREATE_NAME, req.name);
        let brand = required_text(&mut errors, &PUT_BRAND, req.brand);
        let state = match req.state {
            Some(s) if !s.trim().is_empty() => parse_state(&mut errors, &s),
            _ => {
                errors.add("state", STATE_REQUIRED);
                None
            }
        };
        let creation_time = match req.creation_time {
            None => None,
            Some(raw) => match parse_timestamp(&raw) {
                Ok(t) => Some(t),
                Err(_) => {
                    errors.add("creation_time", "creation_time must use the format yyyy-MM-ddTHH:mm:ss");
                    None
                }
            },
        };
        errors.into_result(|| {
            Some(DeviceReplace {
                name: name?,
                brand: brand?,
                state: state?,
                creation_time,
            })
        })
    }
}

fn required_text(errors: &mut ValidationErrors, rule: &TextRule, value: Option<String>) -> Option<String> {
    match value {
        None => {
            errors.add(rule.field, rule.blank);
            None
        }
        Some(v) => checked_text(errors, rule, v),
    }
}

fn optional_text(errors: &mut ValidationErrors, rule: &TextRule, value: Option<String>) -> Option<String> {
    value.and_then(|v| checked_text(errors, rule, v))
}

fn checked_text(errors: &mut ValidationErrors, rule: &TextRule, value: String) -> Option<String> {
    if value.trim().is_empty() {
        errors.add(rule.field, rule.blank);
        return None;
    }
    if value.chars().count() > MAX_TEXT_LENGTH {
        errors.add(rule.field, rule.too_long);
        return None;
    }
    Some(value)
}

fn parse_state(errors: &mut ValidationErrors, value: &str) -> Option<DeviceState> {
    match value.parse::<DeviceState>() {
        Ok(state) => Some(state),
        Err(_) => {
            errors.add("state", STATE_INVALID);
            None
        }
    }
}
