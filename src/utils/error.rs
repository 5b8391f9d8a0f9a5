use crate::core::extractor::ExtractError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Page request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Menu extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Parsing,
    Storage,
    Configuration,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::Http(_) => ErrorCategory::Network,
            EtlError::Extract(_) => ErrorCategory::Parsing,
            EtlError::Database(_) | EtlError::Io(_) => ErrorCategory::Storage,
            EtlError::Config { .. }
            | EtlError::InvalidConfigValue { .. }
            | EtlError::Validation { .. } => ErrorCategory::Configuration,
            EtlError::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Network hiccups and layout changes are expected on an unattended
    /// weekly job, so they never rank above `Medium`.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Parsing => ErrorSeverity::Medium,
            ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::Http(_) => "Check network access and that the source URL is reachable",
            EtlError::Extract(ExtractError::ContainerNotFound)
            | EtlError::Extract(ExtractError::TableNotFound) => {
                "The cafeteria page layout may have changed; inspect the page markup"
            }
            EtlError::Extract(_) => "Inspect the fetched page markup",
            EtlError::Database(_) => "Check that the database file is writable and not corrupted",
            EtlError::Io(_) => "Check file paths and permissions",
            EtlError::Config { .. }
            | EtlError::InvalidConfigValue { .. }
            | EtlError::Validation { .. } => "Fix the configuration file or command-line flags",
            EtlError::Internal { .. } => "Restart the service and report the failure",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not download the menu page ({self})"),
            ErrorCategory::Parsing => format!("Could not read the menu table ({self})"),
            ErrorCategory::Storage => format!("Could not access the menu database ({self})"),
            ErrorCategory::Configuration => format!("Invalid configuration ({self})"),
            ErrorCategory::Internal => format!("Unexpected failure ({self})"),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_errors_are_recoverable() {
        let err = EtlError::from(ExtractError::ContainerNotFound);
        assert_eq!(err.category(), ErrorCategory::Parsing);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.recovery_suggestion().contains("layout"));
    }

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = EtlError::InvalidConfigValue {
            field: "schedule.hour".to_string(),
            value: "25".to_string(),
            reason: "Value must be between 0 and 23".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("schedule.hour"));
    }
}
