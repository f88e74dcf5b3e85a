use std::{fmt, io};

/// Crate-wide `Result` type using [`RegsearchError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, RegsearchError>;

/// Top-level error type for regsearch operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum RegsearchError {
    /// Registry API protocol errors.
    Api(ApiError),

    /// Search query construction errors.
    Query(QueryError),

    /// Export pipeline errors.
    Export(ExportError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// HTTP transport errors.
    Http(reqwest::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Registry API protocol errors.
#[derive(Debug)]
pub enum ApiError {
    /// The server answered with a non-success status code.
    Status { code: u16, message: String },

    /// The in-flight request was cancelled, with the cancellation reason.
    Cancelled(String),

    /// The configured endpoint or a page locator is not a valid URL.
    InvalidEndpoint(String),
}

/// Search query construction errors.
#[derive(Debug)]
pub enum QueryError {
    /// The criterion name is reserved for the merged region descriptor.
    ReservedCriterion(String),

    /// A filter argument could not be parsed.
    InvalidFilter(String),

    /// A region descriptor could not be read or parsed.
    InvalidRegion(String),
}

/// Export pipeline errors.
#[derive(Debug)]
pub enum ExportError {
    /// Record flattening failed (nesting exceeded the depth guard).
    Flatten(String),

    /// Serializing accumulated records to the output format failed.
    Encode(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for RegsearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegsearchError::Api(e) => write!(f, "API error: {e}"),
            RegsearchError::Query(e) => write!(f, "Query error: {e}"),
            RegsearchError::Export(e) => write!(f, "Export error: {e}"),
            RegsearchError::Config(e) => write!(f, "Configuration error: {e}"),
            RegsearchError::Io(e) => write!(f, "I/O error: {e}"),
            RegsearchError::Http(e) => write!(f, "HTTP error: {e}"),
            RegsearchError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Status { code, message } => {
                write!(f, "Server returned {code}: {message}")
            }
            ApiError::Cancelled(reason) => write!(f, "Request cancelled: {reason}"),
            ApiError::InvalidEndpoint(url) => write!(f, "Invalid endpoint URL: {url}"),
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::ReservedCriterion(name) => {
                write!(f, "Criterion name '{name}' is reserved for region search")
            }
            QueryError::InvalidFilter(arg) => write!(f, "Invalid filter: {arg}"),
            QueryError::InvalidRegion(msg) => write!(f, "Invalid region descriptor: {msg}"),
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Flatten(msg) => write!(f, "Failed to flatten record: {msg}"),
            ExportError::Encode(msg) => write!(f, "Failed to encode records: {msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for RegsearchError {}
impl std::error::Error for ApiError {}
impl std::error::Error for QueryError {}
impl std::error::Error for ExportError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to RegsearchError ========================= */

impl From<io::Error> for RegsearchError {
    fn from(err: io::Error) -> Self {
        RegsearchError::Io(err)
    }
}

impl From<reqwest::Error> for RegsearchError {
    fn from(err: reqwest::Error) -> Self {
        RegsearchError::Http(err)
    }
}

impl From<ApiError> for RegsearchError {
    fn from(err: ApiError) -> Self {
        RegsearchError::Api(err)
    }
}

impl From<QueryError> for RegsearchError {
    fn from(err: QueryError) -> Self {
        RegsearchError::Query(err)
    }
}

impl From<ExportError> for RegsearchError {
    fn from(err: ExportError) -> Self {
        RegsearchError::Export(err)
    }
}

impl From<ConfigError> for RegsearchError {
    fn from(err: ConfigError) -> Self {
        RegsearchError::Config(err)
    }
}

impl From<String> for RegsearchError {
    fn from(msg: String) -> Self {
        RegsearchError::Generic(msg)
    }
}

impl From<&str> for RegsearchError {
    fn from(msg: &str) -> Self {
        RegsearchError::Generic(msg.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = RegsearchError::Api(ApiError::Status {
            code: 503,
            message: "Service Unavailable".to_string(),
        });
        assert_eq!(err.to_string(), "API error: Server returned 503: Service Unavailable");
    }

    #[test]
    fn test_reserved_criterion_display() {
        let err = QueryError::ReservedCriterion("FeatureCollection".to_string());
        assert!(err.to_string().contains("FeatureCollection"));
    }

    #[test]
    fn test_config_invalid_value_display() {
        let err = ConfigError::InvalidValue {
            field: "format".to_string(),
            value: "xml".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value 'xml' for field 'format'");
    }

    #[test]
    fn test_from_str_conversion() {
        let err: RegsearchError = "something broke".into();
        assert!(matches!(err, RegsearchError::Generic(_)));
    }
}
