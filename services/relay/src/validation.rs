//! Input validation utilities

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::models::room::RoomToggle;

/// Validate an identifier field (room, user, role, call)
pub fn validate_identifier(field: &str, value: Option<&str>) -> Result<String, String> {
    let value = value.map(str::trim).unwrap_or_default();

    if value.is_empty() {
        return Err(format!("{} is required", field));
    }

    if value.len() > 128 {
        return Err(format!("{} must be at most 128 characters long", field));
    }

    static IDENTIFIER_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = IDENTIFIER_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._@:-]+$").expect("Failed to compile identifier regex")
    });

    if !regex.is_match(value) {
        return Err(format!(
            "{} can only contain letters, numbers, and . _ @ : -",
            field
        ));
    }

    Ok(value.to_string())
}

/// Validate a phone number in E.164 format
pub fn validate_phone_number(field: &str, value: Option<&str>) -> Result<String, String> {
    let value = value.map(str::trim).unwrap_or_default();

    if value.is_empty() {
        return Err(format!("{} is required", field));
    }

    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX
        .get_or_init(|| Regex::new(r"^\+[1-9][0-9]{6,14}$").expect("Failed to compile phone regex"));

    if !regex.is_match(value) {
        return Err(format!("{} must be an E.164 phone number", field));
    }

    Ok(value.to_string())
}

/// Validate a room enable/disable payload
pub fn validate_room_toggle(payload: &Value) -> Result<RoomToggle, String> {
    let room_id = validate_identifier("room_id", payload.get("room_id").and_then(Value::as_str))?;

    let enabled = match payload.get("enabled") {
        Some(Value::Bool(enabled)) => *enabled,
        Some(_) => return Err("enabled must be a boolean".to_string()),
        None => return Err("enabled is required".to_string()),
    };

    Ok(RoomToggle { room_id, enabled })
}
