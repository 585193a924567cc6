use thiserror::Error;

/// Top-level error type for the Tugendane engine.
///
/// Subsystem crates define their own error types and convert into
/// `EngineError` at crate boundaries so the `?` operator composes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Classification error: {0}")]
    Nlp(String),

    #[error("Service locator error: {0}")]
    Locator(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");

        let err = EngineError::Locator("backend down".to_string());
        assert_eq!(err.to_string(), "Service locator error: backend down");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: EngineError = io_err.into();
        assert!(matches!(err, EngineError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let bad: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let err: EngineError = bad.unwrap_err().into();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let bad: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let err: EngineError = bad.unwrap_err().into();
        assert!(matches!(err, EngineError::Serialization(_)));
    }

    #[test]
    fn test_result_alias_with_question_mark() {
        fn inner() -> Result<u32> {
            let v: std::result::Result<u32, std::io::Error> = Ok(7);
            Ok(v?)
        }
        assert_eq!(inner().unwrap(), 7);
    }
}
