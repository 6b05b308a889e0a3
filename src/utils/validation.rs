use crate::utils::error::{Result, TriageError};
use url::Url;

/// 設定物件在使用前的自我檢查
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 只接受 http / https
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(TriageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    let url = Url::parse(url_str).map_err(|e| TriageError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: url_str.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(()),
        "http" | "https" => Err(TriageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL has no host".to_string(),
        }),
        scheme => Err(TriageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Unsupported URL scheme: {}", scheme),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(TriageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(TriageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(TriageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TriageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
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
        return Err(TriageError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("model.endpoint", "https://example.com").is_ok());
        assert!(validate_url("model.endpoint", "http://example.com").is_ok());
        assert!(validate_url("model.endpoint", "").is_err());
        assert!(validate_url("model.endpoint", "invalid-url").is_err());
        assert!(validate_url("model.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("count", 5, 1).is_ok());
        assert!(validate_positive_number("count", 0, 1).is_err());
    }

    #[test]
    fn test_validate_path_and_strings() {
        assert!(validate_path("corpus.path", "reviews_test.tsv").is_ok());
        assert!(validate_path("corpus.path", "").is_err());
        assert!(validate_path("corpus.path", "bad\0path").is_err());
        assert!(validate_non_empty_string("corpus.text_column", "text").is_ok());
        assert!(validate_non_empty_string("corpus.text_column", "  ").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("model.timeout_seconds", 30u64, 1, 600).is_ok());
        assert!(validate_range("model.timeout_seconds", 0u64, 1, 600).is_err());
        assert!(validate_range("model.timeout_seconds", 601u64, 1, 600).is_err());
    }
}
