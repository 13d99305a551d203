use crate::utils::error::{PushError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> PushError {
    PushError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Payloads go out over plain HTTP(S) to a named host.
pub fn validate_endpoint(field_name: &str, endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint.trim())
        .map_err(|e| invalid(field_name, endpoint, format!("Not an absolute URL ({})", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field_name,
            endpoint,
            format!("Endpoint must use http or https, not '{}'", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid(field_name, endpoint, "Endpoint has no host"));
    }
    Ok(())
}

/// Data file and folder paths are resolved relative to the working directory.
pub fn validate_data_path(field_name: &str, path: &str) -> Result<()> {
    match path {
        p if p.trim().is_empty() => Err(invalid(field_name, path, "Data path is blank")),
        p if p.contains('\0') => Err(invalid(field_name, path, "Data path contains a NUL byte")),
        _ => Ok(()),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| PushError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field_name, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

pub fn validate_min<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
) -> Result<()> {
    if value < min {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be at least {}", min),
        ));
    }
    Ok(())
}

/// Delimiters must be exactly one ASCII character.
pub fn validate_delimiter(field_name: &str, value: &str) -> Result<u8> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(invalid(
            field_name,
            value,
            "Delimiter must be a single ASCII character",
        )),
    }
}
