use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParcelError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Unknown parcel field: {name}")]
    UnknownFieldError { name: String },
}

pub type Result<T> = std::result::Result<T, ParcelError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Storage,
    Configuration,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ParcelError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ParcelError::ApiError(_) => ErrorCategory::Network,
            ParcelError::CsvError(_)
            | ParcelError::SerializationError(_)
            | ParcelError::ZipError(_) => ErrorCategory::Data,
            ParcelError::IoError(_) => ErrorCategory::Storage,
            ParcelError::ConfigError { .. }
            | ParcelError::ConfigValidationError { .. }
            | ParcelError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ParcelError::ValidationError { .. } | ParcelError::UnknownFieldError { .. } => {
                ErrorCategory::Input
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 查詢失敗只會顯示訊息，不影響結束碼
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration | ErrorCategory::Input => {
                ErrorSeverity::High
            }
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ParcelError::ApiError(_) => {
                "Check your network connection and that the parcel service endpoint is reachable"
            }
            ParcelError::SerializationError(_) => {
                "The service returned an unexpected body; verify the endpoint is an ArcGIS feature query URL"
            }
            ParcelError::CsvError(_) | ParcelError::ZipError(_) => {
                "Try exporting again or switch the export format"
            }
            ParcelError::IoError(_) => "Make sure the output directory exists and is writable",
            ParcelError::ConfigError { .. } | ParcelError::ConfigValidationError { .. } => {
                "Check the configuration file for TOML syntax errors"
            }
            ParcelError::InvalidConfigValueError { .. } => {
                "Correct the highlighted configuration value and run again"
            }
            ParcelError::ValidationError { .. } => "Adjust the query parameters and try again",
            ParcelError::UnknownFieldError { .. } => {
                "Run with --list-fields to see the available parcel fields"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ParcelError::ApiError(e) if e.is_connect() => {
                "Could not connect to the parcel service".to_string()
            }
            ParcelError::ApiError(e) if e.is_timeout() => {
                "The parcel service did not answer in time".to_string()
            }
            ParcelError::ApiError(_) => "The parcel service request failed".to_string(),
            ParcelError::SerializationError(_) => {
                "The parcel service returned a response body that is not a feature query result"
                    .to_string()
            }
            ParcelError::IoError(e) => format!("I/O failure: {}", e),
            ParcelError::UnknownFieldError { name } => {
                format!("'{}' is not a parcel field", name)
            }
            other => other.to_string(),
        }
    }
}
