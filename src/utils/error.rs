use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API responded with status {status}: {body}")]
    StatusError { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Record not found: {what}")]
    NotFound { what: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Permission denied: {action}")]
    PermissionDenied { action: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    Input,
    System,
}

impl PortalError {
    pub fn validation(message: impl Into<String>) -> Self {
        PortalError::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PortalError::ApiError(_) | PortalError::StatusError { .. } => ErrorCategory::Network,
            PortalError::SerializationError(_) | PortalError::NotFound { .. } => {
                ErrorCategory::Data
            }
            PortalError::UrlError(_)
            | PortalError::ConfigValidationError { .. }
            | PortalError::InvalidConfigValueError { .. }
            | PortalError::MissingConfigError { .. } => ErrorCategory::Configuration,
            PortalError::ValidationError { .. } | PortalError::PermissionDenied { .. } => {
                ErrorCategory::Input
            }
            PortalError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PortalError::NotFound { .. } => ErrorSeverity::Low,
            PortalError::ApiError(_) => ErrorSeverity::Medium,
            PortalError::StatusError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            PortalError::StatusError { .. }
            | PortalError::SerializationError(_)
            | PortalError::ValidationError { .. }
            | PortalError::PermissionDenied { .. } => ErrorSeverity::High,
            PortalError::UrlError(_)
            | PortalError::ConfigValidationError { .. }
            | PortalError::InvalidConfigValueError { .. }
            | PortalError::MissingConfigError { .. }
            | PortalError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    /// Short message suitable for showing next to a form field or list.
    pub fn user_friendly_message(&self) -> String {
        match self {
            PortalError::ApiError(e) if e.is_timeout() => {
                "The portal server took too long to answer".to_string()
            }
            PortalError::ApiError(_) => "Could not reach the portal server".to_string(),
            PortalError::StatusError { status: 401, .. }
            | PortalError::StatusError { status: 403, .. } => {
                "Your session is not allowed to read this data".to_string()
            }
            PortalError::StatusError { status, .. } => {
                format!("The portal server rejected the request ({})", status)
            }
            PortalError::SerializationError(_) => {
                "The portal server returned data in an unexpected shape".to_string()
            }
            PortalError::NotFound { what } => format!("{} was not found", what),
            PortalError::ValidationError { message } => message.clone(),
            PortalError::PermissionDenied { action } => {
                format!("Your role does not allow you to {}", action)
            }
            PortalError::UrlError(_)
            | PortalError::ConfigValidationError { .. }
            | PortalError::InvalidConfigValueError { .. }
            | PortalError::MissingConfigError { .. } => {
                format!("Configuration problem: {}", self)
            }
            PortalError::IoError(e) => format!("File system error: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the API URL, the anon key and your session token",
            ErrorCategory::Data => "Verify the table exists and the selected columns match",
            ErrorCategory::Configuration => {
                "Review the [api] section of the configuration file or PORTAL_* variables"
            }
            ErrorCategory::Input => "Correct the highlighted value and try again",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
