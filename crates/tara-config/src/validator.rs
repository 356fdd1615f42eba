//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::{Config, MAX_TEXT_LEN};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_channel(config, &mut result);
        Self::validate_scanner(config, &mut result);
        Self::validate_executor(config, &mut result);
        Self::validate_host(config, &mut result);
        Self::validate_api(config, &mut result);

        result
    }

    fn validate_channel(config: &Config, result: &mut ValidationResult) {
        Self::check_ws_url("channel.ws_url", &config.channel.ws_url, result);

        if config.channel.connect_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "channel.connect_timeout_ms",
                "connect_timeout_ms must be greater than 0",
            ));
        }

        if config.channel.ws_url.starts_with("ws://") {
            result.add_warning(ValidationWarning::new(
                "channel.ws_url",
                "ws_url is not encrypted (ws://), use wss:// outside local development",
            ));
        }
    }

    fn validate_scanner(config: &Config, result: &mut ValidationResult) {
        if config.scanner.max_elements == 0 {
            result.add_error(ValidationError::new(
                "scanner.max_elements",
                "max_elements must be greater than 0",
            ));
        }

        if config.scanner.max_text_len == 0 || config.scanner.max_text_len > MAX_TEXT_LEN {
            result.add_error(ValidationError::new(
                "scanner.max_text_len",
                format!("max_text_len must be between 1 and {}", MAX_TEXT_LEN),
            ));
        }

        if config.scanner.viewport_margin < 0.0 {
            result.add_error(ValidationError::new(
                "scanner.viewport_margin",
                "viewport_margin cannot be negative",
            ));
        }

        if !config.scanner.generate_ids {
            result.add_warning(ValidationWarning::new(
                "scanner.generate_ids",
                "generate_ids is off, elements without id or name are sent with a null id",
            ));
        }
    }

    fn validate_executor(config: &Config, result: &mut ValidationResult) {
        if config.executor.highlight_ms == 0 {
            result.add_error(ValidationError::new(
                "executor.highlight_ms",
                "highlight_ms must be greater than 0",
            ));
        }

        if config.executor.scroll_settle_ms < config.executor.settle_ms {
            result.add_warning(ValidationWarning::new(
                "executor.scroll_settle_ms",
                "scroll_settle_ms is shorter than settle_ms, scroll animations may be cut off",
            ));
        }
    }

    fn validate_host(config: &Config, result: &mut ValidationResult) {
        if let Some(ref url) = config.host.ws_url {
            Self::check_ws_url("host.ws_url", url, result);
        }
    }

    fn validate_api(config: &Config, result: &mut ValidationResult) {
        let url = &config.api.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            result.add_error(ValidationError::new(
                "api.base_url",
                "base_url must start with http:// or https://",
            ));
        }

        if config.api.token.is_none() {
            result.add_warning(ValidationWarning::new(
                "api.token",
                "API token is not set, authenticated endpoints will be rejected",
            ));
        }
    }

    fn check_ws_url(path: &str, url: &str, result: &mut ValidationResult) {
        if !url.starts_with("ws://") && !url.starts_with("wss://") {
            result.add_error(ValidationError::new(
                path,
                "WebSocket URL must start with ws:// or wss://",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
