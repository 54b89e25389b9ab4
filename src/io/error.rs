//! Error types for model training, solving and the outer I/O layers

use std::fmt;
use std::path::PathBuf;

/// Main error type for all solver and I/O operations
#[derive(Debug)]
pub enum AlgorithmError {
    /// A mode value (weighting, updating, entropy, unit shape) was not recognized
    InvalidConfiguration {
        /// Name of the configuration option
        parameter: &'static str,
        /// Provided value that failed to parse
        value: String,
        /// Explanation listing the accepted values
        reason: String,
    },

    /// The statistical model holds no units to seed initial domains with
    EmptyModel,

    /// Backtracking exhausted every checkpoint without finding a complete grid
    Unsatisfiable {
        /// Number of collapse attempts made before the stack emptied
        attempts: usize,
        /// Deepest checkpoint stack reached during the search
        max_depth: usize,
    },

    /// Backtracking gave up after the configured number of attempts
    AttemptLimitExceeded {
        /// The configured attempt limit
        limit: usize,
    },

    /// Generation was stopped through its cancellation token
    Cancelled {
        /// Outer loop iteration at which cancellation was observed
        iteration: usize,
    },

    /// Failed to load source image from filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Source data doesn't meet extraction requirements
    InvalidSourceData {
        /// Description of what's wrong with the source data
        reason: String,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Failed to save generated image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for AlgorithmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid configuration '{parameter}' = '{value}': {reason}")
            }
            Self::EmptyModel => {
                write!(f, "Statistical model contains no units to generate from")
            }
            Self::Unsatisfiable {
                attempts,
                max_depth,
            } => {
                write!(
                    f,
                    "No contradiction-free grid exists \
                     (gave up after {attempts} attempts, max depth {max_depth})"
                )
            }
            Self::AttemptLimitExceeded { limit } => {
                write!(f, "Backtracking exceeded the attempt limit of {limit}")
            }
            Self::Cancelled { iteration } => {
                write!(f, "Generation cancelled at iteration {iteration}")
            }
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::InvalidSourceData { reason } => {
                write!(f, "Invalid source data: {reason}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for AlgorithmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for algorithm results
pub type Result<T> = std::result::Result<T, AlgorithmError>;

impl From<std::io::Error> for AlgorithmError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> AlgorithmError {
    AlgorithmError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an invalid configuration error for an unrecognized mode value
pub fn invalid_configuration(
    parameter: &'static str,
    value: &impl ToString,
    accepted: &[&str],
) -> AlgorithmError {
    AlgorithmError::InvalidConfiguration {
        parameter,
        value: value.to_string(),
        reason: format!("expected one of: {}", accepted.join(", ")),
    }
}
