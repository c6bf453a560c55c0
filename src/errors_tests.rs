//! Unit tests for error handling
//!
//! Tests error types, conversions, and error message formatting.

#[cfg(test)]
mod tests {
    use std::io;

    use crate::errors::FinRagError;

    // ====== Error Type Tests ======

    #[test]
    fn test_dimension_mismatch_message() {
        let error = FinRagError::DimensionMismatch {
            expected: 384,
            actual: 768,
        };
        assert_eq!(
            error.to_string(),
            "Embedding dimension mismatch: expected 384, got 768"
        );
    }

    #[test]
    fn test_unavailable_errors() {
        assert!(FinRagError::EmbeddingUnavailable
            .to_string()
            .contains("unavailable"));
        assert!(FinRagError::StoreUnavailable
            .to_string()
            .contains("unavailable"));
    }

    #[test]
    fn test_config_error() {
        let error = FinRagError::ConfigError("Invalid configuration".to_string());
        assert!(matches!(error, FinRagError::ConfigError(_)));
        assert!(error.to_string().contains("configuration"));
    }

    // ====== Error Conversion Tests ======

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let err: FinRagError = io_err.into();

        assert!(matches!(err, FinRagError::Io(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: FinRagError = json_err.into();

        assert!(matches!(err, FinRagError::Serialization(_)));
    }

    #[test]
    fn test_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("= nope").unwrap_err();
        let err: FinRagError = toml_err.into();

        assert!(matches!(err, FinRagError::TomlParsing(_)));
    }
}
