//! Field Validators
//!
//! Pure functions that check and normalize one value against one rule.
//! They return the normalized value on success and a `ValidationFault`
//! on failure; mapping a fault to a field name happens one level up in
//! the schema check.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::ValidationFault;

/// Accepts only canonical hyphenated UUID text, normalized to lowercase.
pub fn validate_uuid(input: &str) -> Result<String, ValidationFault> {
    let trimmed = input.trim();
    // Uuid::try_parse also accepts simple/braced/urn forms; require the
    // 36-character hyphenated shape the remote service hands out.
    if trimmed.len() != 36 {
        return Err(ValidationFault::InvalidFormat);
    }
    match Uuid::try_parse(trimmed) {
        Ok(parsed) => Ok(parsed.hyphenated().to_string()),
        Err(_) => Err(ValidationFault::InvalidFormat),
    }
}

/// Trims and bounds a string. Empty optional input normalizes to `None`.
pub fn validate_bounded_string(
    input: &str,
    max_len: usize,
    required: bool,
) -> Result<Option<String>, ValidationFault> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return if required {
            Err(ValidationFault::Required)
        } else {
            Ok(None)
        };
    }
    if trimmed.chars().count() > max_len {
        return Err(ValidationFault::TooLong(max_len));
    }
    Ok(Some(trimmed.to_string()))
}

/// Membership check against a closed tag set (after trimming).
pub fn validate_enum(input: &str, allowed: &[&str]) -> Result<String, ValidationFault> {
    let trimmed = input.trim();
    if allowed.contains(&trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationFault::InvalidValue)
    }
}

/// Accepts only JSON integers in `[min, max]`; floats and numeric
/// strings are rejected.
pub fn validate_bounded_integer(
    value: &serde_json::Value,
    min: i64,
    max: i64,
) -> Result<i64, ValidationFault> {
    match value.as_i64() {
        Some(n) if n >= min && n <= max => Ok(n),
        _ => Err(ValidationFault::OutOfRange(min, max)),
    }
}

/// Accepts only JSON booleans.
pub fn validate_bool(value: &serde_json::Value) -> Result<bool, ValidationFault> {
    value.as_bool().ok_or(ValidationFault::InvalidValue)
}

/// Accepts `YYYY-MM-DD` date text, normalized to the same shape.
pub fn validate_date(input: &str) -> Result<String, ValidationFault> {
    let trimmed = input.trim();
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => Ok(date.format("%Y-%m-%d").to_string()),
        Err(_) => Err(ValidationFault::InvalidFormat),
    }
}
