use std::fmt::{Display, Formatter, Result as FmtResult};

/// Root error type for the entire application
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    Domain(DomainError),
    Application(ApplicationError),
    Infrastructure(InfrastructureError),
}

/// Domain layer specific errors
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    Validation(ValidationError),
}

/// Validation errors raised before data reaches the series buffer
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The four arrays of a history fragment disagree on length.
    FragmentLengthMismatch {
        timestamps: usize,
        hashrate_10m: usize,
        hashrate_1h: usize,
        hashrate_1d: usize,
    },
    /// Persisted or imported labels go backwards.
    NonMonotonicLabels { index: usize, previous: u64, actual: u64 },
    /// Relative offset plus base does not fit into a timestamp.
    TimestampOverflow { base: u64, offset: u64 },
    /// A raw hashrate that is not a finite number once scaled to H/s.
    NonFiniteHashrate { index: usize, raw: f64 },
}

/// Application layer errors
#[derive(Debug, Clone, PartialEq)]
pub enum ApplicationError {
    Configuration(ConfigurationError),
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    InvalidParameter(String),
    MissingConfiguration(String),
}

/// Infrastructure layer errors
#[derive(Debug, Clone, PartialEq)]
pub enum InfrastructureError {
    Network(NetworkError),
    Storage(StorageError),
}

/// Network-related errors
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    HttpRequestFailed(String),
    HttpStatus { status: u16, text: String },
    InvalidResponse(String),
}

/// Durable key-value storage errors
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    Unavailable(String),
    WriteFailed { key: String, reason: String },
    SerializationFailed(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AppError::Domain(e) => write!(f, "Domain Error: {}", e),
            AppError::Application(e) => write!(f, "Application Error: {}", e),
            AppError::Infrastructure(e) => write!(f, "Infrastructure Error: {}", e),
        }
    }
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(e) => write!(f, "Validation: {}", e),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ValidationError::FragmentLengthMismatch { timestamps, hashrate_10m, hashrate_1h, hashrate_1d } => {
                write!(
                    f,
                    "History fragment arrays differ in length (timestamps={}, 10m={}, 1h={}, 1d={})",
                    timestamps, hashrate_10m, hashrate_1h, hashrate_1d
                )
            }
            ValidationError::NonMonotonicLabels { index, previous, actual } => {
                write!(f, "Label {} at index {} is older than previous label {}", actual, index, previous)
            }
            ValidationError::TimestampOverflow { base, offset } => {
                write!(f, "Timestamp base {} plus offset {} overflows", base, offset)
            }
            ValidationError::NonFiniteHashrate { index, raw } => {
                write!(f, "Hashrate {} at index {} is not finite after scaling", raw, index)
            }
        }
    }
}

impl Display for ApplicationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ApplicationError::Configuration(e) => write!(f, "Configuration: {}", e),
        }
    }
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ConfigurationError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            ConfigurationError::MissingConfiguration(msg) => write!(f, "Missing configuration: {}", msg),
        }
    }
}

impl Display for InfrastructureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            InfrastructureError::Network(e) => write!(f, "Network: {}", e),
            InfrastructureError::Storage(e) => write!(f, "Storage: {}", e),
        }
    }
}

impl Display for NetworkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            NetworkError::HttpRequestFailed(msg) => write!(f, "HTTP request failed: {}", msg),
            NetworkError::HttpStatus { status, text } => write!(f, "HTTP error: {} - {}", status, text),
            NetworkError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageError::Unavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            StorageError::WriteFailed { key, reason } => write!(f, "Failed to write '{}': {}", key, reason),
            StorageError::SerializationFailed(msg) => write!(f, "Serialization failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for DomainError {}
impl std::error::Error for ValidationError {}
impl std::error::Error for InfrastructureError {}
impl std::error::Error for ConfigurationError {}

/// Error conversion utilities
impl From<DomainError> for AppError {
    fn from(error: DomainError) -> Self {
        AppError::Domain(error)
    }
}

impl From<ApplicationError> for AppError {
    fn from(error: ApplicationError) -> Self {
        AppError::Application(error)
    }
}

impl From<InfrastructureError> for AppError {
    fn from(error: InfrastructureError) -> Self {
        AppError::Infrastructure(error)
    }
}

impl From<ValidationError> for DomainError {
    fn from(error: ValidationError) -> Self {
        DomainError::Validation(error)
    }
}

impl From<ConfigurationError> for ApplicationError {
    fn from(error: ConfigurationError) -> Self {
        ApplicationError::Configuration(error)
    }
}

impl From<ConfigurationError> for AppError {
    fn from(error: ConfigurationError) -> Self {
        AppError::Application(ApplicationError::Configuration(error))
    }
}

impl From<NetworkError> for InfrastructureError {
    fn from(error: NetworkError) -> Self {
        InfrastructureError::Network(error)
    }
}

impl From<StorageError> for InfrastructureError {
    fn from(error: StorageError) -> Self {
        InfrastructureError::Storage(error)
    }
}

// Simple convenience type aliases
pub type DomainResult<T> = Result<T, DomainError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
pub type AppResult<T> = Result<T, AppError>;
