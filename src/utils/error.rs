use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompletenessError {
    #[error("Unbalanced module definition: {definition}")]
    UnbalancedDefinition { definition: String },

    #[error("Malformed step '{step}': {reason}")]
    MalformedStep { step: String, reason: String },

    #[error("Unknown identifier token '{token}' in step '{step}'")]
    UnknownIdentifierToken { step: String, token: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

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

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Storage,
    Config,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CompletenessError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnbalancedDefinition { .. }
            | Self::MalformedStep { .. }
            | Self::UnknownIdentifierToken { .. } => ErrorCategory::Input,
            Self::ApiError(_) => ErrorCategory::Network,
            Self::CsvError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::Storage
            }
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Config,
            Self::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    /// Input errors are recoverable per step or per module, so they never
    /// abort a run on their own.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Config | ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::UnbalancedDefinition { .. } => {
                "The definition is truncated or has stray parentheses; the module is skipped"
            }
            Self::MalformedStep { .. } | Self::UnknownIdentifierToken { .. } => {
                "The step is scored as unsatisfied; check the module definition upstream"
            }
            Self::ApiError(_) => "Check network connectivity and the catalog URL, then retry",
            Self::CsvError(_) | Self::SerializationError(_) => {
                "Check that the output directory is writable and not held open by another program"
            }
            Self::IoError(_) => "Check that the input files exist and the output path is writable",
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => {
                "Fix the configuration value and run again (see --help)"
            }
            Self::ProcessingError { .. } => "Re-run with --verbose to see which task failed",
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

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Invalid module definition: {}", self),
            ErrorCategory::Network => format!("Could not reach the module catalog: {}", self),
            ErrorCategory::Storage => format!("Could not read or write a file: {}", self),
            ErrorCategory::Config => format!("Configuration problem: {}", self),
            ErrorCategory::Processing => format!("Completeness run failed: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompletenessError>;
