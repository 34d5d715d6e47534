use thiserror::Error;

/// Main error type for the search engine
#[derive(Error, Debug)]
pub enum SearchEngineError {
    /// Record collection is not usable (construction time)
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// Criteria registry is malformed (construction time)
    #[error("Invalid criteria: {0}")]
    InvalidCriteria(String),

    /// Query is empty or does not fit the configured criteria (call time)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Dataset file does not exist
    #[error("Dataset file not found: {0}")]
    DatasetNotFound(String),

    /// Config file does not exist
    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<String> for SearchEngineError {
    fn from(s: String) -> Self {
        SearchEngineError::Other(s)
    }
}

impl From<&str> for SearchEngineError {
    fn from(s: &str) -> Self {
        SearchEngineError::Other(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SearchEngineError>;
