use thiserror::Error;

#[derive(Error, Debug)]
pub enum PushError {
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

    #[error("Cannot access '{path}': {source}")]
    FileAccessError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse '{path}': {message}")]
    ParseError { path: String, message: String },

    #[error("Invalid payload template: {message}")]
    InvalidTemplateError { message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("{endpoint} responded with HTTP {status}")]
    HttpStatusError { status: u16, endpoint: String },

    #[error("Digest authentication failed: {message}")]
    DigestAuthError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Data,
    Network,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PushError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PushError::ConfigValidationError { .. }
            | PushError::InvalidConfigValueError { .. }
            | PushError::MissingConfigError { .. }
            | PushError::InvalidTemplateError { .. } => ErrorCategory::Configuration,
            PushError::FileAccessError { .. }
            | PushError::ParseError { .. }
            | PushError::SerializationError(_) => ErrorCategory::Data,
            PushError::NetworkError(_)
            | PushError::HttpStatusError { .. }
            | PushError::DigestAuthError { .. } => ErrorCategory::Network,
            PushError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            PushError::ConfigValidationError { field, .. }
            | PushError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' entry in the configuration file", field)
            }
            PushError::MissingConfigError { field } => {
                format!("Add the '{}' entry to the configuration file", field)
            }
            PushError::FileAccessError { path, .. } => {
                format!("Check that '{}' exists and is readable", path)
            }
            PushError::ParseError { path, .. } => {
                format!("Check that '{}' is valid JSON or CSV", path)
            }
            PushError::InvalidTemplateError { .. } => {
                "api.payload must be an object or the \"${data_files}\" placeholder".to_string()
            }
            PushError::NetworkError(_) => {
                "Check network connectivity and api.endpoint, or raise api.timeout_seconds"
                    .to_string()
            }
            PushError::HttpStatusError { status, .. } if *status == 401 || *status == 403 => {
                "Check api.auth credentials".to_string()
            }
            PushError::HttpStatusError { .. } => {
                "Check that the endpoint accepts the configured method and payload".to_string()
            }
            PushError::DigestAuthError { .. } => {
                "Check that the server offers a supported Digest challenge".to_string()
            }
            PushError::IoError(_) => "Check file permissions and free disk space".to_string(),
            PushError::SerializationError(_) => {
                "Check that the loaded data can be represented as JSON".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Data => format!("Could not load data: {}", self),
            ErrorCategory::Network => format!("Delivery failed: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, PushError>;
