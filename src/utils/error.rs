use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinderError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

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

    #[error("Invalid filter '{field}' = '{value}': {reason}")]
    InvalidCriteriaError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported file format: {format}")]
    UnsupportedFormatError { format: String },

    #[error("Could not parse '{source_name}': {message}")]
    ParseError { source_name: String, message: String },

    #[error("Source returned HTTP {status}: {url}")]
    SourceStatusError { url: String, status: u16 },

    #[error("No uploaded file for this session")]
    SessionNotFound,
}

pub type Result<T> = std::result::Result<T, FinderError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
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

impl FinderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FinderError::CsvError(_)
            | FinderError::SpreadsheetError(_)
            | FinderError::UnsupportedFormatError { .. }
            | FinderError::ParseError { .. }
            | FinderError::InvalidCriteriaError { .. }
            | FinderError::SessionNotFound => ErrorCategory::Input,
            FinderError::ConfigValidationError { .. }
            | FinderError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            FinderError::HttpError(_) | FinderError::SourceStatusError { .. } => {
                ErrorCategory::Network
            }
            FinderError::ZipError(_)
            | FinderError::IoError(_)
            | FinderError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            FinderError::SessionNotFound => ErrorSeverity::Low,
            FinderError::HttpError(_) | FinderError::SourceStatusError { .. } => {
                ErrorSeverity::Medium
            }
            FinderError::IoError(_) | FinderError::ZipError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 給終端使用者看的訊息，不含內部細節
    pub fn user_friendly_message(&self) -> String {
        match self {
            FinderError::CsvError(e) => format!("The file could not be read as a table: {}", e),
            FinderError::SpreadsheetError(e) => {
                format!("The workbook could not be opened: {}", e)
            }
            FinderError::UnsupportedFormatError { format } => format!(
                "Files of type '{}' are not supported. Use .csv, .tsv, .json or .zip.",
                format
            ),
            FinderError::ParseError {
                source_name,
                message,
            } => format!("Could not read '{}': {}", source_name, message),
            FinderError::InvalidCriteriaError { field, reason, .. } => {
                format!("Filter '{}' is not valid: {}", field, reason)
            }
            FinderError::HttpError(_) | FinderError::SourceStatusError { .. } => {
                "The remote file could not be downloaded.".to_string()
            }
            FinderError::IoError(e) => format!("File system error: {}", e),
            FinderError::SessionNotFound => "Upload your file to begin.".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => {
                "Check that the file is a CSV, TSV or Excel sheet with a header row and that filter values are numbers where expected"
            }
            ErrorCategory::Configuration => "Fix the configuration value and run again",
            ErrorCategory::Network => "Check the URL and your network connection, then retry",
            ErrorCategory::System => "Check file paths and permissions",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}
