use thiserror::Error;

/// Main error type for Sightline
#[derive(Error, Debug)]
pub enum SlError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure of a single data source. Never fatal: the orchestrator logs it and
/// leaves the view model as it was.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("Request to {endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Response from {endpoint} is not valid JSON: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Response from {endpoint} rejected: {source}")]
    Shape {
        endpoint: String,
        #[source]
        source: ShapeError,
    },
}

/// Coarse classification of a [`SourceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Network failure or non-2xx status.
    Transport,
    /// Body is not JSON.
    Decode,
    /// JSON that failed validation.
    Shape,
}

impl SourceError {
    pub fn class(&self) -> FailureClass {
        match self {
            SourceError::Transport { .. } | SourceError::Status { .. } => FailureClass::Transport,
            SourceError::Decode { .. } => FailureClass::Decode,
            SourceError::Shape { .. } => FailureClass::Shape,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            SourceError::Transport { endpoint, .. }
            | SourceError::Status { endpoint, .. }
            | SourceError::Decode { endpoint, .. }
            | SourceError::Shape { endpoint, .. } => endpoint,
        }
    }

    pub fn shape(endpoint: &str, source: ShapeError) -> Self {
        SourceError::Shape {
            endpoint: endpoint.to_string(),
            source,
        }
    }
}

/// Why the normalizer refused a payload, a field or an item.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Expected a mapping at {location}")]
    NotAMapping { location: String },

    #[error("Expected an array at {location}")]
    NotAnArray { location: String },

    #[error("Missing field: {field}")]
    MissingField { field: String },

    #[error("Invalid field {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("No accepted layout matched (tried {tried})")]
    NoMatchingLayout { tried: String },

    #[error("Payload carried no usable values")]
    EmptyUpdate,
}

/// Result type alias for Sightline operations
pub type SlResult<T> = Result<T, SlError>;

/// Macro for creating internal errors
#[macro_export]
macro_rules! internal_error {
    ($($arg:tt)*) => {
        $crate::SlError::Internal(format!($($arg)*))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::SlError::Config(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = SourceError::Status {
            endpoint: "/risks".to_string(),
            status: 503,
        };

        assert!(error.to_string().contains("/risks"));
        assert!(error.to_string().contains("503"));
    }

    #[test]
    fn test_failure_classes() {
        let status = SourceError::Status { endpoint: "/a".into(), status: 404 };
        let transport = SourceError::Transport { endpoint: "/a".into(), message: "refused".into() };
        let decode = SourceError::Decode { endpoint: "/a".into(), message: "eof".into() };
        let shape = SourceError::shape("/a", ShapeError::EmptyUpdate);

        assert_eq!(status.class(), FailureClass::Transport);
        assert_eq!(transport.class(), FailureClass::Transport);
        assert_eq!(decode.class(), FailureClass::Decode);
        assert_eq!(shape.class(), FailureClass::Shape);
        assert_eq!(shape.endpoint(), "/a");
    }

    #[test]
    fn test_error_conversion() {
        let source_error = SourceError::Decode {
            endpoint: "/api/monitoring".to_string(),
            message: "test".to_string(),
        };
        let sl_error: SlError = source_error.into();

        match sl_error {
            SlError::Source(_) => (),
            _ => panic!("Expected Source error"),
        }
    }

    #[test]
    fn test_macros() {
        let internal = internal_error!("Something went wrong");
        let config = config_error!("Missing required field: {}", "base_url");
        assert!(matches!(internal, SlError::Internal(_)));
        assert!(config.to_string().contains("base_url"));
    }
}
