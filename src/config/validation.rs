//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals, thresholds, timeouts > 0)
//! - Check provider endpoints and probe URLs parse
//! - Detect clashing identifier namespaces
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BlogConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use url::Url;

use crate::config::schema::{BlogConfig, ProbeKind, ProviderConfig};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &BlogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.store.path.trim().is_empty() {
        errors.push(ValidationError::new("store.path", "must not be empty"));
    }

    validate_provider("backends.primary", &config.backends.primary, &mut errors);
    validate_provider("backends.fallback", &config.backends.fallback, &mut errors);

    if config.backends.primary.name == config.backends.fallback.name {
        errors.push(ValidationError::new(
            "backends.fallback.name",
            "must differ from the primary provider name",
        ));
    }

    let availability = &config.availability;
    if availability.interval_secs == 0 {
        errors.push(ValidationError::new("availability.interval_secs", "must be greater than 0"));
    }
    if availability.unhealthy_threshold == 0 {
        errors.push(ValidationError::new(
            "availability.unhealthy_threshold",
            "must be greater than 0",
        ));
    }
    if availability.probe.timeout_secs == 0 {
        errors.push(ValidationError::new(
            "availability.probe.timeout_secs",
            "must be greater than 0",
        ));
    }
    if availability.probe.kind == ProbeKind::Http {
        match availability.probe.url.as_deref() {
            None => errors.push(ValidationError::new(
                "availability.probe.url",
                "required when probe kind is http",
            )),
            Some(raw) => {
                if let Err(e) = Url::parse(raw) {
                    errors.push(ValidationError::new("availability.probe.url", e.to_string()));
                }
            }
        }
    }

    if config.content.excerpt_length == 0 {
        errors.push(ValidationError::new("content.excerpt_length", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_provider(prefix: &str, provider: &ProviderConfig, errors: &mut Vec<ValidationError>) {
    if provider.name.trim().is_empty() {
        errors.push(ValidationError::new(format!("{}.name", prefix), "must not be empty"));
    }
    if let Err(e) = Url::parse(&provider.endpoint) {
        errors.push(ValidationError::new(format!("{}.endpoint", prefix), e.to_string()));
    }
    if let Some(path) = &provider.data_path {
        if path.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("{}.data_path", prefix),
                "must not be empty when set",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&BlogConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = BlogConfig::default();
        config.availability.interval_secs = 0;
        config.availability.unhealthy_threshold = 0;
        config.backends.fallback.name = config.backends.primary.name.clone();
        config.backends.primary.endpoint = "not a url".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"availability.interval_secs"));
        assert!(fields.contains(&"availability.unhealthy_threshold"));
        assert!(fields.contains(&"backends.fallback.name"));
        assert!(fields.contains(&"backends.primary.endpoint"));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_http_probe_needs_url() {
        let mut config = BlogConfig::default();
        config.availability.probe.kind = ProbeKind::Http;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "availability.probe.url");

        config.availability.probe.url = Some("http://127.0.0.1:8080/health".to_string());
        assert!(validate_config(&config).is_ok());
    }
}
