use thiserror::Error;

#[derive(Error, Debug)]
pub enum FareError {
    #[error("Invalid configuration for '{field}' (value: '{value}'): {reason}")]
    InvalidConfiguration {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration field: {field}")]
    MissingConfig { field: String },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    #[error("Offer normalization failed: {reason}")]
    Normalization { reason: String },

    #[error("Provider rate limit hit for {destination}")]
    RateLimited { destination: String },

    #[error("Provider failure: {reason}")]
    Provider { reason: String },

    #[error("Report delivery failed: {reason}")]
    Delivery { reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Data,
    Provider,
    Delivery,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FareError {
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        FareError::InvalidConfiguration {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn normalization(reason: impl Into<String>) -> Self {
        FareError::Normalization {
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FareError::InvalidConfiguration { .. }
            | FareError::MissingConfig { .. }
            | FareError::ConfigParse { .. } => ErrorCategory::Configuration,
            FareError::Normalization { .. } | FareError::Serialization(_) => ErrorCategory::Data,
            FareError::RateLimited { .. } | FareError::Provider { .. } | FareError::Http(_) => {
                ErrorCategory::Provider
            }
            FareError::Delivery { .. } => ErrorCategory::Delivery,
            FareError::Io(_) => ErrorCategory::System,
        }
    }

    /// Only configuration problems abort a scan cycle; everything else is
    /// isolated to one query, one record or one delivery attempt.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Data => ErrorSeverity::Low,
            ErrorCategory::Provider | ErrorCategory::Delivery => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FareError::InvalidConfiguration { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            FareError::MissingConfig { field } => {
                format!("Setting '{}' is required but was not provided", field)
            }
            FareError::ConfigParse { message } => {
                format!("Could not read the configuration file: {}", message)
            }
            FareError::Normalization { reason } => {
                format!("A provider record could not be understood: {}", reason)
            }
            FareError::RateLimited { destination } => {
                format!("The flight provider is throttling requests ({})", destination)
            }
            FareError::Provider { reason } => format!("The flight provider failed: {}", reason),
            FareError::Delivery { reason } => format!("The report could not be sent: {}", reason),
            FareError::Http(e) => format!("Network problem: {}", e),
            FareError::Io(e) => format!("File system problem: {}", e),
            FareError::Serialization(e) => format!("Unexpected data format: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the configuration file and command-line overrides"
            }
            ErrorCategory::Data => "The record was skipped; no action is needed",
            ErrorCategory::Provider => "Wait a few minutes or lower the scan horizon and retry",
            ErrorCategory::Delivery => "Verify the bot token and chat id",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, FareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_configuration_errors_are_fatal() {
        assert!(FareError::invalid_config("scan.horizon_weeks", 0, "must be positive").is_fatal());
        assert!(!FareError::normalization("bad price").is_fatal());
        assert!(!FareError::RateLimited {
            destination: "LON".to_string()
        }
        .is_fatal());
        assert!(!FareError::Delivery {
            reason: "timeout".to_string()
        }
        .is_fatal());
    }

    #[test]
    fn test_severity_ordering() {
        let config = FareError::MissingConfig {
            field: "scan.origin".to_string(),
        };
        let record = FareError::normalization("missing departure");
        assert!(config.severity() > record.severity());
        assert_eq!(record.severity(), ErrorSeverity::Low);
    }

    #[test]
    fn test_user_friendly_message_names_field() {
        let e = FareError::invalid_config("filter.max_price", -3, "must not be negative");
        assert!(e.user_friendly_message().contains("filter.max_price"));
    }
}
