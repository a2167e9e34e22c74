//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the upstream base URL is an absolute http(s) URL
//! - Validate value ranges (timeouts > 0, bind address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: format!("not a socket address: {}", config.listener.bind_address),
        });
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError {
            field: "upstream.base_url",
            message: format!("unsupported scheme: {}", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError {
            field: "upstream.base_url",
            message: format!("not a valid URL: {e}"),
        }),
    }

    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "upstream.connect_timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }
    if config.upstream.request_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "upstream.request_timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError {
            field: "timeouts.request_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn test_bad_url_and_zero_timeout_both_reported() {
        let mut config = RelayConfig::default();
        config.upstream.base_url = "not a url".to_string();
        config.upstream.request_timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "upstream.base_url");
        assert_eq!(errors[1].field, "upstream.request_timeout_secs");
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let mut config = RelayConfig::default();
        config.upstream.base_url = "ftp://example.com/v1".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].message.contains("unsupported scheme"));
    }

    #[test]
    fn test_bad_bind_address_rejected() {
        let mut config = RelayConfig::default();
        config.listener.bind_address = "eight-thousand".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "listener.bind_address");
    }
}
