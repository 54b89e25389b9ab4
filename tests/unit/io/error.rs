//! Tests for error types including source chaining and message formatting

#[cfg(test)]
mod tests {
    use contextile::AlgorithmError;
    use contextile::io::error::{invalid_configuration, invalid_parameter};
    use std::error::Error;

    // Tests error source chaining works correctly
    // Verified by breaking source chain
    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = AlgorithmError::FileSystem {
            path: "/tmp/test.png".into(),
            operation: "read",
            source: io_error,
        };

        assert!(error.source().is_some());
        assert!(error.to_string().contains("/tmp/test.png"));
        assert!(AlgorithmError::EmptyModel.source().is_none());
    }

    // Tests search failures report their counters
    // Verified by omitting the attempt count from the message
    #[test]
    fn test_search_error_messages() {
        let unsatisfiable = AlgorithmError::Unsatisfiable {
            attempts: 17,
            max_depth: 4,
        };
        let message = unsatisfiable.to_string();
        assert!(message.contains("17 attempts"));
        assert!(message.contains("max depth 4"));

        let limited = AlgorithmError::AttemptLimitExceeded { limit: 9 };
        assert!(limited.to_string().contains('9'));

        let cancelled = AlgorithmError::Cancelled { iteration: 3 };
        assert!(cancelled.to_string().contains("iteration 3"));
    }

    // Tests unrecognized modes list the accepted values
    // Verified by dropping the accepted values from the reason
    #[test]
    fn test_invalid_configuration_error() {
        let error = invalid_configuration("entropy", &"lowest", &["scan-a", "scan-b"]);

        assert!(matches!(
            &error,
            AlgorithmError::InvalidConfiguration {
                parameter: "entropy",
                value,
                ..
            } if value == "lowest"
        ));
        let message = error.to_string();
        assert!(message.contains("'entropy'"));
        assert!(message.contains("scan-a, scan-b"));
    }

    // Tests InvalidParameter error contains all fields
    // Verified by omitting value from message
    #[test]
    fn test_invalid_parameter_error() {
        let error = invalid_parameter("width", &0, &"must be positive");
        let message = error.to_string();

        assert!(message.contains("width"));
        assert!(message.contains("'0'"));
        assert!(message.contains("must be positive"));
    }

    // Tests bare I/O errors convert into file system errors
    // Verified by mapping conversions to invalid source data
    #[test]
    fn test_io_error_conversion() {
        let error: AlgorithmError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();

        assert!(matches!(error, AlgorithmError::FileSystem { .. }));
        assert!(error.source().is_some());
    }
}
