use crate::utils::error::{FareError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(FareError::invalid_config(
            field_name,
            url_str,
            "URL cannot be empty",
        ));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(FareError::invalid_config(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(FareError::invalid_config(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_positive_number(field_name: &str, value: i64, min_value: i64) -> Result<()> {
    if value < min_value {
        return Err(FareError::invalid_config(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| FareError::MissingConfig {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FareError::invalid_config(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
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
        return Err(FareError::invalid_config(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// IATA airport or metropolitan-area code: exactly three ASCII letters.
pub fn validate_location_code(field_name: &str, code: &str) -> Result<()> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(FareError::invalid_config(
            field_name,
            code,
            "Expected a three-letter IATA code",
        ));
    }
    Ok(())
}

pub fn validate_currency_code(field_name: &str, code: &str) -> Result<()> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(FareError::invalid_config(
            field_name,
            code,
            "Expected an upper-case ISO 4217 currency code",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("provider.endpoint", "https://example.com").is_ok());
        assert!(validate_url("provider.endpoint", "http://example.com").is_ok());
        assert!(validate_url("provider.endpoint", "").is_err());
        assert!(validate_url("provider.endpoint", "invalid-url").is_err());
        assert!(validate_url("provider.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("scan.horizon_weeks", 4, 1).is_ok());
        assert!(validate_positive_number("scan.horizon_weeks", 0, 1).is_err());
        assert!(validate_positive_number("scan.horizon_weeks", -2, 1).is_err());
    }

    #[test]
    fn test_validate_location_code() {
        assert!(validate_location_code("scan.origin", "MAD").is_ok());
        assert!(validate_location_code("scan.origin", "lon").is_ok());
        assert!(validate_location_code("scan.origin", "MADR").is_err());
        assert!(validate_location_code("scan.origin", "M4D").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("filter.outbound_hours.min", 15u32, 0, 23).is_ok());
        assert!(validate_range("filter.outbound_hours.min", 24u32, 0, 23).is_err());
    }
}
