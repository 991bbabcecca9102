use crate::utils::error::{CompletenessError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> CompletenessError {
    CompletenessError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(field_name, url_str, format!("Invalid URL format: {}", e))),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// At least one file, and every entry a usable path.
pub fn validate_identifier_files(field_name: &str, files: &[String]) -> Result<()> {
    if files.is_empty() {
        return Err(CompletenessError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    for file in files {
        validate_path(field_name, file)?;
    }
    Ok(())
}

/// Shared bounds for a numbered module scan such as M00001..=M01000.
pub fn validate_module_range(first: u32, last: u32) -> Result<()> {
    validate_range("first_module", first, 1, 99_999)?;
    validate_range("last_module", last, 1, 99_999)?;
    if first > last {
        return Err(CompletenessError::ConfigValidationError {
            field: "first_module".to_string(),
            message: format!("first_module ({}) is after last_module ({})", first, last),
        });
    }
    Ok(())
}
