use thiserror::Error;

/// Main error type for Nexu
#[derive(Error, Debug)]
pub enum NexuError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A schema migration script failed; nothing from it was committed
    #[error("Migration {name} failed: {source}")]
    Migration {
        name: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Content lookup failures raised by a content service
    #[error("Content lookup error: {0}")]
    Lookup(String),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using NexuError
pub type Result<T> = std::result::Result<T, NexuError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NexuError::Config("Test error".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("Test error"));
    }

    #[test]
    fn test_lookup_error_display() {
        let err = NexuError::Lookup("content store offline".to_string());
        assert_eq!(err.to_string(), "Content lookup error: content store offline");
    }

    #[test]
    fn test_migration_error_names_script() {
        let err = NexuError::Migration {
            name: "002_content_unique_key".to_string(),
            source: rusqlite::Error::InvalidQuery,
        };
        assert!(err.to_string().starts_with("Migration 002_content_unique_key failed"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_from_rusqlite() {
        let rusqlite_err = rusqlite::Error::InvalidQuery;
        let nexu_err: NexuError = rusqlite_err.into();
        assert!(matches!(nexu_err, NexuError::Database(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let nexu_err: NexuError = json_err.into();
        assert!(matches!(nexu_err, NexuError::Json(_)));
    }
}
